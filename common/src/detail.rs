//! レシピ詳細の解決
//!
//! ストア → 静的データセットの順にIDで探す。見つからなかった後でも、
//! 同じIDのレシピがストアへ追加されれば再読み込みなしでReadyになる。

use crate::dataset::StaticDataset;
use crate::error::{Error, Result};
use crate::store::{RecipeStore, Subscription};
use crate::types::Recipe;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DetailState {
    #[default]
    Loading,
    Ready(Recipe),
    NotFound(String),
}

type ChangeListener = Rc<dyn Fn(&DetailState)>;

pub struct RecipeDetail {
    id: String,
    state: Rc<RefCell<DetailState>>,
    dataset: Rc<StaticDataset>,
    store: RecipeStore,
    on_change: ChangeListener,
    _subscription: Subscription,
}

impl RecipeDetail {
    /// 詳細ビューを開く（Loading）。解決は`resolve`で行う
    pub fn open(
        id: impl Into<String>,
        dataset: Rc<StaticDataset>,
        store: &RecipeStore,
        on_change: impl Fn(&DetailState) + 'static,
    ) -> Self {
        let id = id.into();
        let state = Rc::new(RefCell::new(DetailState::Loading));
        let on_change: ChangeListener = Rc::new(on_change);

        let subscription = store.subscribe({
            let id = id.clone();
            let weak_state = Rc::downgrade(&state);
            let weak_store = store.downgrade();
            let on_change = Rc::clone(&on_change);
            move || {
                let (Some(state), Some(store)) = (weak_state.upgrade(), weak_store.upgrade()) else {
                    return;
                };
                if matches!(*state.borrow(), DetailState::Ready(_)) {
                    return;
                }
                let Some(recipe) = store.get(&id) else { return };
                tracing::debug!(id = %id, "recipe arrived after lookup");
                let snapshot = DetailState::Ready(recipe);
                *state.borrow_mut() = snapshot.clone();
                on_change(&snapshot);
            }
        });

        Self {
            id,
            state,
            dataset,
            store: store.clone(),
            on_change,
            _subscription: subscription,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// ストア → データセットの順に探し、状態を確定する
    pub fn resolve(&self) -> Result<Recipe> {
        let found = self
            .store
            .get(&self.id)
            .or_else(|| self.dataset.get(&self.id).cloned());

        let (next, result) = match found {
            Some(recipe) => (DetailState::Ready(recipe.clone()), Ok(recipe)),
            None => {
                let err = Error::NotFound(self.id.clone());
                tracing::warn!("{}", err);
                (DetailState::NotFound(err.to_string()), Err(err))
            }
        };
        *self.state.borrow_mut() = next.clone();
        (self.on_change)(&next);
        result
    }

    pub fn state(&self) -> DetailState {
        self.state.borrow().clone()
    }

    pub fn recipe(&self) -> Option<Recipe> {
        match &*self.state.borrow() {
            DetailState::Ready(recipe) => Some(recipe.clone()),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<String> {
        match &*self.state.borrow() {
            DetailState::NotFound(message) => Some(message.clone()),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(*self.state.borrow(), DetailState::Loading)
    }
}
