//! アップロードモーダル
//!
//! ドロップゾーン/ファイル選択 → 進捗 → プレビュー編集 → 受理 or キャンセル。
//! セッションはモーダルと一緒に破棄され、その時点でタイマーも止まる。

use crate::app::Services;
use crate::browser::{seeded_rng, GlooScheduler, JsClock, ObjectUrls};
use crate::components::progress_bar::ProgressBar;
use leptos::ev::MouseEvent;
use leptos::prelude::*;
use recipe_gallery_common::{
    RecipePatch, SelectedFile, SessionParts, SimulatedSave, UploadPhase, UploadSession,
    UploadState,
};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::{DragEvent, Event, File, HtmlInputElement};

type BrowserSession = UploadSession<GlooScheduler, ObjectUrls>;

#[component]
pub fn UploadModal(services: Services, open: RwSignal<bool>) -> impl IntoView {
    let state = RwSignal::new(UploadState::default());

    let parts = SessionParts {
        scheduler: GlooScheduler,
        store: services.store.get_value(),
        catalog: services.catalog.get_value(),
        clock: Rc::new(JsClock),
        images: ObjectUrls,
        rng: seeded_rng(),
        save: Box::new(SimulatedSave::new()),
        config: services.config.get_value(),
    };
    let session: BrowserSession = UploadSession::new(parts, move |next: &UploadState| {
        state.set(next.clone());
        // 受理したらモーダルを閉じる
        if next.phase == UploadPhase::Accepted {
            open.set(false);
        }
    });
    session.open();
    let session = StoredValue::new_local(session);

    let handle_file = move |file: File| {
        let selected = SelectedFile::new(file.name(), file.type_(), file.size() as u64);
        if let Some(Err(e)) = session.try_with_value(|s| s.select_file(selected, &file)) {
            gloo::console::warn!(e.to_string());
        }
    };

    let on_drop = move |ev: DragEvent| {
        ev.prevent_default();
        session.with_value(|s| s.set_dragging(false));
        let file = ev
            .data_transfer()
            .and_then(|dt| dt.files())
            .and_then(|files| files.get(0));
        if let Some(file) = file {
            handle_file(file);
        }
    };

    let on_dragover = move |ev: DragEvent| {
        ev.prevent_default();
        if !state.with(|s| s.is_dragging) {
            session.with_value(|s| s.set_dragging(true));
        }
    };

    let on_dragleave = move |_: DragEvent| {
        session.with_value(|s| s.set_dragging(false));
    };

    let on_file_change = move |ev: Event| {
        let file = ev
            .target()
            .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
            .and_then(|input| input.files())
            .and_then(|files| files.get(0));
        if let Some(file) = file {
            handle_file(file);
        }
    };

    let apply_edit = move |patch: RecipePatch| {
        if let Some(Err(e)) = session.try_with_value(|s| s.edit(&patch)) {
            gloo::console::warn!(e.to_string());
        }
    };

    let on_title = move |ev: Event| {
        apply_edit(RecipePatch::default().title(event_target_value(&ev)));
    };

    let on_description = move |ev: Event| {
        apply_edit(RecipePatch::default().description(event_target_value(&ev)));
    };

    let on_accept = move |_: MouseEvent| {
        if let Some(Err(e)) = session.try_with_value(|s| s.accept()) {
            gloo::console::warn!(e.to_string());
        }
    };

    let on_cancel = move |_: MouseEvent| {
        session.with_value(|s| s.close());
        open.set(false);
    };

    let phase = move || state.with(|s| s.phase);
    let progress = Signal::derive(move || state.with(|s| s.progress));
    let preview = move || state.with(|s| s.preview.as_ref().map(|p| p.to_string()).unwrap_or_default());
    let generated_title = move || state.with(|s| s.generated.as_ref().map(|r| r.title.clone()).unwrap_or_default());
    let generated_description =
        move || state.with(|s| s.generated.as_ref().map(|r| r.description.clone()).unwrap_or_default());

    view! {
        <div class="modal-backdrop">
            <div class="modal">
                <h2>"Upload a Recipe"</h2>

                {move || state.with(|s| s.error.clone()).map(|message| view! {
                    <p class="error">{message}</p>
                })}

                {move || match phase() {
                    UploadPhase::Idle | UploadPhase::FileSelected => view! {
                        <div
                            class=move || if state.with(|s| s.is_dragging) { "upload-area dragover" } else { "upload-area" }
                            on:drop=on_drop
                            on:dragover=on_dragover
                            on:dragleave=on_dragleave
                        >
                            <div class="upload-icon">"📷"</div>
                            <p>"Drag & drop a photo of your dish, or choose a file"</p>
                            <input type="file" accept="image/*" on:change=on_file_change />
                            <p class="text-muted">"Images only, up to 5 MB"</p>
                        </div>
                    }.into_any(),
                    UploadPhase::Uploading { .. } => view! {
                        <img class="preview-image" src=preview alt="Selected dish" />
                        <ProgressBar progress=progress />
                    }.into_any(),
                    UploadPhase::PreviewReady | UploadPhase::Saving | UploadPhase::Accepted => view! {
                        <div class="preview-card">
                            <img class="preview-image" src=preview alt="Selected dish" />
                            <label for="recipe-title">"Title"</label>
                            <input
                                id="recipe-title"
                                type="text"
                                prop:value=generated_title
                                on:change=on_title
                            />
                            <label for="recipe-description">"Description"</label>
                            <textarea
                                id="recipe-description"
                                prop:value=generated_description
                                on:change=on_description
                            />
                            <button
                                class="btn btn-primary"
                                disabled=move || phase() != UploadPhase::PreviewReady
                                on:click=on_accept
                            >
                                {move || if phase().is_busy() { "Saving..." } else { "Add to Gallery" }}
                            </button>
                        </div>
                    }.into_any(),
                }}

                <button class="btn btn-secondary" on:click=on_cancel>"Cancel"</button>
            </div>
        </div>
    }
}
