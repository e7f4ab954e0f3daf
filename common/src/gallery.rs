//! ギャラリーのビューモデル
//!
//! 静的データセットとストアの内容を1つのリストにまとめ、
//! コンテナ幅からグリッドの列数を決める。

use crate::config::GalleryConfig;
use crate::dataset::StaticDataset;
use crate::store::{RecipeStore, Subscription};
use crate::types::Recipe;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryState {
    pub is_loading: bool,
    pub error: Option<String>,
    pub recipes: Vec<Recipe>,
    pub selected_recipe_id: Option<String>,
    pub grid_columns: u8,
    pub container_width: u32,
}

impl Default for GalleryState {
    fn default() -> Self {
        Self {
            is_loading: true,
            error: None,
            recipes: Vec::new(),
            selected_recipe_id: None,
            grid_columns: 3,
            container_width: 0,
        }
    }
}

/// 静的レシピ（データセット順）の後にアップロード済み（追加順）を並べる
///
/// IDが既に出ているレシピは読み飛ばす。
pub fn merge_recipes(static_recipes: &[Recipe], uploaded: &[Recipe]) -> Vec<Recipe> {
    let mut seen = HashSet::new();
    let mut merged = Vec::with_capacity(static_recipes.len() + uploaded.len());
    for recipe in static_recipes.iter().chain(uploaded) {
        if seen.insert(recipe.id.as_str()) {
            merged.push(recipe.clone());
        } else {
            tracing::debug!(id = %recipe.id, "skipping duplicate recipe id");
        }
    }
    merged
}

type ChangeListener = Rc<dyn Fn(&GalleryState)>;

struct GalleryInner {
    state: GalleryState,
    config: GalleryConfig,
}

pub struct GalleryViewModel {
    inner: Rc<RefCell<GalleryInner>>,
    dataset: Rc<StaticDataset>,
    store: RecipeStore,
    on_change: ChangeListener,
    _subscription: Subscription,
}

impl GalleryViewModel {
    pub fn new(
        dataset: Rc<StaticDataset>,
        store: &RecipeStore,
        config: &GalleryConfig,
        on_change: impl Fn(&GalleryState) + 'static,
    ) -> Self {
        let state = GalleryState {
            recipes: merge_recipes(dataset.recipes(), &store.list()),
            grid_columns: config.wide_columns,
            ..Default::default()
        };
        let inner = Rc::new(RefCell::new(GalleryInner {
            state,
            config: config.clone(),
        }));
        let on_change: ChangeListener = Rc::new(on_change);

        // ストア変更で再マージ（循環参照を避けるため弱参照で持つ）
        let subscription = store.subscribe({
            let weak_inner = Rc::downgrade(&inner);
            let weak_store = store.downgrade();
            let dataset = Rc::clone(&dataset);
            let on_change = Rc::clone(&on_change);
            move || {
                let (Some(inner), Some(store)) = (weak_inner.upgrade(), weak_store.upgrade()) else {
                    return;
                };
                let snapshot = {
                    let mut inner = inner.borrow_mut();
                    inner.state.recipes = merge_recipes(dataset.recipes(), &store.list());
                    inner.state.clone()
                };
                on_change(&snapshot);
            }
        });

        Self {
            inner,
            dataset,
            store: store.clone(),
            on_change,
            _subscription: subscription,
        }
    }

    pub fn state(&self) -> GalleryState {
        self.inner.borrow().state.clone()
    }

    pub fn recipes(&self) -> Vec<Recipe> {
        self.inner.borrow().state.recipes.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.borrow().state.is_loading
    }

    pub fn grid_columns(&self) -> u8 {
        self.inner.borrow().state.grid_columns
    }

    /// 読み込み完了
    pub fn load(&self) {
        self.update(|state, store, dataset| {
            state.recipes = merge_recipes(dataset.recipes(), &store.list());
            state.is_loading = false;
            state.error = None;
        });
    }

    /// 読み込み失敗
    pub fn fail(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("gallery failed to load: {}", message);
        self.update(|state, _, _| {
            state.is_loading = false;
            state.error = Some(message);
        });
    }

    /// コンテナ幅から列数を更新する。変化が無ければ何もしない
    pub fn update_layout(&self, width: u32) -> bool {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            let columns = inner.config.columns_for(width);
            if inner.state.container_width == width && inner.state.grid_columns == columns {
                false
            } else {
                inner.state.container_width = width;
                inner.state.grid_columns = columns;
                true
            }
        };
        if changed {
            self.notify();
        }
        changed
    }

    pub fn select_recipe(&self, id: impl Into<String>) {
        let id = id.into();
        self.update(|state, _, _| state.selected_recipe_id = Some(id));
    }

    /// ストアへ追加（一覧は購読経由で更新される）
    pub fn add_recipe(&self, recipe: Recipe) {
        self.store.add(recipe);
    }

    fn update(&self, f: impl FnOnce(&mut GalleryState, &RecipeStore, &StaticDataset)) {
        {
            let mut inner = self.inner.borrow_mut();
            f(&mut inner.state, &self.store, self.dataset.as_ref());
        }
        self.notify();
    }

    fn notify(&self) {
        let snapshot = self.state();
        (self.on_change)(&snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn uploaded(id: &str) -> Recipe {
        Recipe {
            id: id.to_string(),
            title: format!("Uploaded {}", id),
            image: "blob:memory/1".to_string(),
            image_path: "blob:memory/1".to_string(),
            created_at: "2025-01-10T09:00:00.000Z".to_string(),
            ..Default::default()
        }
    }

    fn view_model(store: &RecipeStore) -> (GalleryViewModel, Rc<Cell<u32>>) {
        let dataset = Rc::new(StaticDataset::bundled().unwrap());
        let changes = Rc::new(Cell::new(0));
        let vm = GalleryViewModel::new(dataset, store, &GalleryConfig::default(), {
            let changes = changes.clone();
            move |_: &GalleryState| changes.set(changes.get() + 1)
        });
        (vm, changes)
    }

    #[test]
    fn test_initial_state() {
        let store = RecipeStore::new();
        let (vm, _) = view_model(&store);
        let state = vm.state();
        assert!(state.is_loading);
        assert_eq!(state.recipes.len(), 6);
        assert_eq!(state.grid_columns, 3);
        assert_eq!(state.selected_recipe_id, None);
    }

    #[test]
    fn test_load_clears_loading() {
        let store = RecipeStore::new();
        let (vm, changes) = view_model(&store);
        vm.load();
        assert!(!vm.is_loading());
        assert_eq!(changes.get(), 1);
    }

    #[test]
    fn test_fail_sets_error() {
        let store = RecipeStore::new();
        let (vm, _) = view_model(&store);
        vm.fail("network down");
        let state = vm.state();
        assert!(!state.is_loading);
        assert_eq!(state.error.as_deref(), Some("network down"));

        vm.load();
        assert_eq!(vm.state().error, None);
    }

    #[test]
    fn test_store_add_refreshes_list() {
        let store = RecipeStore::new();
        let (vm, changes) = view_model(&store);
        store.add(uploaded("recipe-1"));

        let recipes = vm.recipes();
        assert_eq!(recipes.len(), 7);
        assert_eq!(recipes.last().map(|r| r.id.as_str()), Some("recipe-1"));
        assert_eq!(changes.get(), 1);
    }

    #[test]
    fn test_add_recipe_delegates_to_store() {
        let store = RecipeStore::new();
        let (vm, _) = view_model(&store);
        vm.add_recipe(uploaded("recipe-2"));
        assert_eq!(store.len(), 1);
        assert_eq!(vm.recipes().len(), 7);
    }

    #[test]
    fn test_static_order_before_uploaded() {
        let store = RecipeStore::new();
        store.add(uploaded("recipe-a"));
        let (vm, _) = view_model(&store);
        store.add(uploaded("recipe-b"));

        let ids: Vec<String> = vm.recipes().into_iter().map(|r| r.id).collect();
        assert_eq!(&ids[..6], &["1", "2", "3", "4", "5", "6"]);
        assert_eq!(&ids[6..], &["recipe-a", "recipe-b"]);
    }

    #[test]
    fn test_merge_skips_duplicate_ids() {
        let statics = vec![uploaded("1"), uploaded("2")];
        let extra = vec![uploaded("2"), uploaded("3")];
        let merged = merge_recipes(&statics, &extra);
        let ids: Vec<&str> = merged.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_layout_columns() {
        let store = RecipeStore::new();
        let (vm, _) = view_model(&store);
        assert!(vm.update_layout(500));
        assert_eq!(vm.grid_columns(), 2);
        assert!(vm.update_layout(1024));
        assert_eq!(vm.grid_columns(), 3);
    }

    #[test]
    fn test_layout_unchanged_is_noop() {
        let store = RecipeStore::new();
        let (vm, changes) = view_model(&store);
        assert!(vm.update_layout(1024));
        assert!(!vm.update_layout(1024));
        assert_eq!(changes.get(), 1);

        // 列数が同じでも幅が変われば更新
        assert!(vm.update_layout(1200));
        assert_eq!(vm.state().container_width, 1200);
    }

    #[test]
    fn test_select_recipe() {
        let store = RecipeStore::new();
        let (vm, _) = view_model(&store);
        vm.select_recipe("2");
        assert_eq!(vm.state().selected_recipe_id.as_deref(), Some("2"));

        vm.select_recipe("missing");
        assert_eq!(vm.state().selected_recipe_id.as_deref(), Some("missing"));
    }

    #[test]
    fn test_drop_unsubscribes() {
        let store = RecipeStore::new();
        let (vm, _) = view_model(&store);
        assert_eq!(store.subscriber_count(), 1);
        drop(vm);
        assert_eq!(store.subscriber_count(), 0);
        store.add(uploaded("recipe-3"));
    }
}
