//! ヘッダーコンポーネント

use leptos::prelude::*;

#[component]
pub fn Header<F>(on_upload: F) -> impl IntoView
where
    F: Fn() + 'static + Clone + Send + Sync,
{
    view! {
        <header class="header">
            <h1>"Southeast Asian Recipe Gallery"</h1>
            <button class="btn btn-primary" on:click=move |_| on_upload()>
                "Upload Recipe"
            </button>
        </header>
    }
}
