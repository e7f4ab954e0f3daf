//! アップロード済みレシピのストア
//!
//! 受理されたレシピを追加順に保持し、変更を購読者へ同期的に通知する。
//! グローバル変数は使わず、生成したハンドルを各ビューモデルへ渡す。

use crate::image_ref::ImageRef;
use crate::types::Recipe;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::{Rc, Weak};

type Listener = Rc<dyn Fn()>;

#[derive(Default)]
struct StoreInner {
    recipes: Vec<Recipe>,
    /// 表示中のレシピが使っている一時参照（解放してはいけない）
    retained: HashSet<ImageRef>,
    listeners: Vec<(u64, Listener)>,
    next_listener_id: u64,
}

/// レシピストア（クローンは同じストアを指す）
#[derive(Clone, Default)]
pub struct RecipeStore {
    inner: Rc<RefCell<StoreInner>>,
}

/// 購読者からストアを参照するための弱参照
#[derive(Clone)]
pub struct WeakRecipeStore {
    inner: Weak<RefCell<StoreInner>>,
}

impl WeakRecipeStore {
    pub fn upgrade(&self) -> Option<RecipeStore> {
        self.inner.upgrade().map(|inner| RecipeStore { inner })
    }
}

impl RecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 末尾に追加し、登録順に購読者へ通知する
    pub fn add(&self, recipe: Recipe) {
        let listeners: Vec<Listener> = {
            let mut inner = self.inner.borrow_mut();
            if inner.recipes.iter().any(|r| r.id == recipe.id) {
                tracing::warn!(id = %recipe.id, "recipe id already stored");
            }
            for image in recipe.transient_images() {
                inner.retained.insert(image);
            }
            tracing::debug!(id = %recipe.id, title = %recipe.title, image = %recipe.image, "adding recipe to store");
            inner.recipes.push(recipe);
            inner.listeners.iter().map(|(_, l)| Rc::clone(l)).collect()
        };

        // 通知中に購読者がストアを読めるよう、借用を解放してから呼ぶ
        tracing::debug!(subscribers = listeners.len(), "notifying store subscribers");
        for listener in listeners {
            listener();
        }
    }

    /// IDが一致する最初のレシピ
    pub fn get(&self, id: &str) -> Option<Recipe> {
        self.inner
            .borrow()
            .recipes
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    /// 全件のスナップショット
    pub fn list(&self) -> Vec<Recipe> {
        self.inner.borrow().recipes.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().recipes.is_empty()
    }

    /// 受理済みレシピが使用中の一時参照か
    pub fn is_retained(&self, image: &ImageRef) -> bool {
        self.inner.borrow().retained.contains(image)
    }

    /// 購読を登録する。返り値をdropすると購読解除
    pub fn subscribe(&self, listener: impl Fn() + 'static) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_listener_id;
        inner.next_listener_id += 1;
        inner.listeners.push((id, Rc::new(listener)));
        Subscription {
            id,
            store: Rc::downgrade(&self.inner),
            active: true,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    pub fn downgrade(&self) -> WeakRecipeStore {
        WeakRecipeStore {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

impl fmt::Debug for RecipeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("RecipeStore")
            .field("recipes", &inner.recipes.len())
            .field("retained", &inner.retained.len())
            .field("subscribers", &inner.listeners.len())
            .finish()
    }
}

/// 購読ハンドル
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    store: Weak<RefCell<StoreInner>>,
    active: bool,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(inner) = self.store.upgrade() {
            // 削除したリスナーのdropは借用解放後に行う
            let removed = {
                let mut inner = inner.borrow_mut();
                let pos = inner.listeners.iter().position(|(id, _)| *id == self.id);
                pos.map(|p| inner.listeners.remove(p))
            };
            drop(removed);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.active)
            .finish()
    }
}
