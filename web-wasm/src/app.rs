//! メインアプリケーションコンポーネント

use crate::browser::GlooScheduler;
use crate::components::{
    header::Header,
    recipe_detail::RecipeDetailPage,
    recipe_gallery::RecipeGallery,
    upload_modal::UploadModal,
};
use leptos::prelude::*;
use recipe_gallery_common::{
    GalleryConfig, GalleryState, GalleryViewModel, RecipeStore, Scheduler, StaticDataset,
    TemplateCatalog,
};
use std::rc::Rc;

/// 表示中のページ
#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    Gallery,
    Detail(String),
}

/// アプリ全体で共有するサービス
///
/// 中身は`Rc`なので`StoredValue::new_local`に置き、ハンドルだけを配る。
#[derive(Clone, Copy)]
pub struct Services {
    pub store: StoredValue<RecipeStore, LocalStorage>,
    pub dataset: StoredValue<Rc<StaticDataset>, LocalStorage>,
    pub catalog: StoredValue<Rc<TemplateCatalog>, LocalStorage>,
    pub config: StoredValue<GalleryConfig>,
}

fn load_dataset() -> StaticDataset {
    match StaticDataset::bundled() {
        Ok(dataset) => dataset,
        Err(e) => {
            gloo::console::error!(format!("failed to load bundled recipes: {}", e));
            StaticDataset::default()
        }
    }
}

fn window_width() -> u32 {
    web_sys::window()
        .and_then(|w| w.inner_width().ok())
        .and_then(|v| v.as_f64())
        .map(|w| w as u32)
        .unwrap_or(0)
}

#[component]
pub fn App() -> impl IntoView {
    let config = GalleryConfig::default();
    let store = RecipeStore::new();
    let dataset = Rc::new(load_dataset());

    let services = Services {
        store: StoredValue::new_local(store.clone()),
        dataset: StoredValue::new_local(Rc::clone(&dataset)),
        catalog: StoredValue::new_local(Rc::new(TemplateCatalog::southeast_asian())),
        config: StoredValue::new(config.clone()),
    };

    // ギャラリー状態
    let gallery_state = RwSignal::new(GalleryState::default());
    let gallery = GalleryViewModel::new(dataset, &store, &config, move |state: &GalleryState| {
        gallery_state.set(state.clone());
    });
    gallery_state.set(gallery.state());
    let gallery = StoredValue::new_local(gallery);

    // 擬似的な読み込み待ち
    let load_timer = GlooScheduler.set_timeout(
        config.gallery_load_delay_ms,
        Box::new(move || gallery.with_value(|vm| vm.load())),
    );
    let _load_timer = StoredValue::new_local(load_timer);

    // 幅に応じて列数を変える
    gallery.with_value(|vm| vm.update_layout(window_width()));
    let _resize = window_event_listener(leptos::ev::resize, move |_| {
        gallery.with_value(|vm| vm.update_layout(window_width()));
    });

    let page = RwSignal::new(Page::Gallery);
    let modal_open = RwSignal::new(false);

    let on_select = move |id: String| {
        gallery.with_value(|vm| vm.select_recipe(id.clone()));
        page.set(Page::Detail(id));
    };
    let on_back = move || page.set(Page::Gallery);
    let on_upload = move || modal_open.set(true);

    view! {
        <div class="container">
            <Header on_upload=on_upload />

            {move || match page.get() {
                Page::Gallery => view! {
                    <RecipeGallery state=gallery_state on_select=on_select />
                }.into_any(),
                Page::Detail(id) => view! {
                    <RecipeDetailPage id=id services=services on_back=on_back />
                }.into_any(),
            }}

            <Show when=move || modal_open.get()>
                <UploadModal services=services open=modal_open />
            </Show>
        </div>
    }
}
