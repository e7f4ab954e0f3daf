//! レシピ詳細ページ

use crate::app::Services;
use crate::browser::GlooScheduler;
use leptos::prelude::*;
use recipe_gallery_common::{DetailState, Recipe, RecipeDetail, Scheduler};

#[component]
pub fn RecipeDetailPage<F>(id: String, services: Services, on_back: F) -> impl IntoView
where
    F: Fn() + 'static + Clone + Send + Sync,
{
    let state = RwSignal::new(DetailState::Loading);
    let detail = RecipeDetail::open(
        id,
        services.dataset.get_value(),
        &services.store.get_value(),
        move |next: &DetailState| state.set(next.clone()),
    );
    let detail = StoredValue::new_local(detail);

    // Loadingを一度描画してから解決する
    let resolve_timer = GlooScheduler.set_timeout(
        0,
        Box::new(move || {
            if let Some(Err(e)) = detail.try_with_value(|d| d.resolve()) {
                gloo::console::warn!(e.to_string());
            }
        }),
    );
    let _resolve_timer = StoredValue::new_local(resolve_timer);

    view! {
        <div class="recipe-detail">
            <button class="btn btn-secondary" on:click=move |_| on_back()>
                "← Back to gallery"
            </button>
            {move || match state.get() {
                DetailState::Loading => view! { <div class="loading">"Loading recipe..."</div> }.into_any(),
                DetailState::NotFound(message) => view! { <p class="error">{message}</p> }.into_any(),
                DetailState::Ready(recipe) => view! { <RecipeBody recipe=recipe /> }.into_any(),
            }}
        </div>
    }
}

#[component]
fn RecipeBody(recipe: Recipe) -> impl IntoView {
    let image = recipe.display_image().to_string();
    let times = recipe
        .time_labels()
        .into_iter()
        .map(|(label, time)| format!("{}: {}", label, time))
        .chain(recipe.servings.map(|n| format!("Servings: {}", n)))
        .collect::<Vec<_>>();

    view! {
        <article>
            <img class="detail-image" src=image alt=recipe.title.clone() />
            <h2>{recipe.title.clone()}</h2>
            <p>{recipe.description.clone()}</p>
            <div class="recipe-meta">
                {recipe.cuisine.map(|c| view! { <span class="badge">{c.label()}</span> })}
                {recipe.difficulty.map(|d| view! { <span class="badge">{d.as_str()}</span> })}
                {times.into_iter().map(|t| view! { <span class="badge">{t}</span> }).collect_view()}
            </div>

            <h3>"Ingredients"</h3>
            <ul>
                {recipe.ingredients.iter().map(|i| view! { <li>{i.clone()}</li> }).collect_view()}
            </ul>

            <h3>"Instructions"</h3>
            <ol>
                {recipe.instructions.iter().map(|s| view! { <li>{s.clone()}</li> }).collect_view()}
            </ol>

            <div class="tags">
                {recipe.tags.iter().map(|t| view! { <span class="tag">{format!("#{}", t)}</span> }).collect_view()}
            </div>
        </article>
    }
}
