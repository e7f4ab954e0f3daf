//! レシピギャラリーコンポーネント

use leptos::prelude::*;
use recipe_gallery_common::{GalleryState, Recipe};

#[component]
pub fn RecipeGallery<F>(state: RwSignal<GalleryState>, on_select: F) -> impl IntoView
where
    F: Fn(String) + 'static + Clone + Send + Sync,
{
    let is_loading = move || state.with(|s| s.is_loading);
    let error = move || state.with(|s| s.error.clone());
    let columns = move || state.with(|s| s.grid_columns);

    view! {
        <Show
            when=move || !is_loading()
            fallback=|| view! { <div class="loading">"Loading recipes..."</div> }
        >
            {
                let on_select = on_select.clone();
                move || match error() {
                    Some(message) => view! { <p class="error">{message}</p> }.into_any(),
                    None => {
                        let on_select = on_select.clone();
                        view! {
                            <div
                                class="recipe-gallery"
                                style=move || format!("grid-template-columns: repeat({}, 1fr)", columns())
                            >
                                <For
                                    each=move || state.with(|s| s.recipes.clone())
                                    key=|recipe| recipe.id.clone()
                                    children=move |recipe| {
                                        let on_select = on_select.clone();
                                        view! { <RecipeCard recipe=recipe on_select=on_select /> }
                                    }
                                />
                            </div>
                        }
                        .into_any()
                    }
                }
            }
        </Show>
    }
}

#[component]
fn RecipeCard<F>(recipe: Recipe, on_select: F) -> impl IntoView
where
    F: Fn(String) + 'static + Clone + Send + Sync,
{
    let image = recipe.display_image().to_string();
    let meta = [
        recipe.cuisine.map(|c| c.label().to_string()),
        recipe.difficulty.map(|d| d.as_str().to_string()),
        recipe.time_labels().first().map(|(_, time)| time.to_string()),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" · ");

    view! {
        <div
            class="recipe-card"
            on:click={
                let id = recipe.id.clone();
                move |_| on_select(id.clone())
            }
        >
            <img src=image alt=recipe.title.clone() />
            <div class="recipe-info">
                <h4>{recipe.title.clone()}</h4>
                <p class="text-muted">{recipe.description.clone()}</p>
                <span class="recipe-meta">{meta}</span>
            </div>
        </div>
    }
}
