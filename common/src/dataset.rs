//! 静的レシピデータセット
//!
//! 起動時に読み込む読み取り専用のレシピ一覧（`{"recipes": [...]}`形式）。
//! 組み込み版は`data/recipes.json`。

use crate::error::{Error, Result};
use crate::types::Recipe;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const BUNDLED_RECIPES: &str = include_str!("../data/recipes.json");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticDataset {
    recipes: Vec<Recipe>,
}

impl StaticDataset {
    /// IDの重複を検証して構築
    pub fn new(recipes: Vec<Recipe>) -> Result<Self> {
        let mut seen = HashSet::new();
        for recipe in &recipes {
            if !seen.insert(recipe.id.as_str()) {
                return Err(Error::DuplicateId(recipe.id.clone()));
            }
        }
        Ok(Self { recipes })
    }

    /// JSON文字列から読み込み
    pub fn from_json(json: &str) -> Result<Self> {
        let parsed: Self = serde_json::from_str(json)?;
        Self::new(parsed.recipes)
    }

    /// 組み込みデータセット
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_RECIPES)
    }

    /// JSONファイルから読み込み（非WASM環境のみ）
    #[cfg(not(feature = "wasm"))]
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let dataset = Self::from_json(&content)?;
        tracing::debug!(path = %path.display(), count = dataset.len(), "loaded static dataset");
        Ok(dataset)
    }

    pub fn get(&self, id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}
