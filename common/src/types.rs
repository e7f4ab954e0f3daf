//! レシピの型定義
//!
//! 静的データセット(recipes.json)・テンプレート・アップロード結果で共有される型:
//! - Recipe: ギャラリーに表示される1件のレシピ
//! - RecipePatch: プレビュー中のレシピへの部分更新

use crate::image_ref::ImageRef;
use serde::{Deserialize, Serialize};

/// 難易度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// 料理ジャンル（固定ラベル）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cuisine {
    #[serde(rename = "Southeast Asian")]
    SoutheastAsian,
    Malaysian,
    Thai,
    Vietnamese,
    Indonesian,
}

impl Cuisine {
    pub fn label(&self) -> &'static str {
        match self {
            Cuisine::SoutheastAsian => "Southeast Asian",
            Cuisine::Malaysian => "Malaysian",
            Cuisine::Thai => "Thai",
            Cuisine::Vietnamese => "Vietnamese",
            Cuisine::Indonesian => "Indonesian",
        }
    }
}

/// レシピ
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,

    pub title: String,

    #[serde(default)]
    pub description: String,

    /// 表示用画像（静的パス または blob: URL）
    #[serde(default)]
    pub image: String,

    #[serde(default)]
    pub image_path: String,

    #[serde(default)]
    pub ingredients: Vec<String>,

    #[serde(default)]
    pub instructions: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preparation_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cook_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<Cuisine>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// 作成日時（RFC 3339）
    #[serde(default)]
    pub created_at: String,
}

impl Recipe {
    /// カード表示に使う画像。`image`が空なら`imagePath`を使う
    pub fn display_image(&self) -> ImageRef {
        if self.image.is_empty() {
            ImageRef::parse(&self.image_path)
        } else {
            ImageRef::parse(&self.image)
        }
    }

    /// `image`/`imagePath`のうち一時参照（blob:）のもの。重複は除く
    pub fn transient_images(&self) -> Vec<ImageRef> {
        let mut refs: Vec<ImageRef> = Vec::new();
        for raw in [&self.image, &self.image_path] {
            let image = ImageRef::parse(raw);
            if image.is_transient() && !refs.contains(&image) {
                refs.push(image);
            }
        }
        refs
    }

    /// 所要時間の表示ラベルと値（自由記述なので単位は付けない）
    pub fn time_labels(&self) -> Vec<(&'static str, &str)> {
        [
            ("Preparation time", &self.preparation_time),
            ("Prep time", &self.prep_time),
            ("Cook time", &self.cook_time),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.as_deref().map(|v| (label, v)))
        .collect()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// 部分更新を適用
    pub fn apply(&mut self, patch: &RecipePatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
    }
}

/// プレビュー編集で変更できるフィールド
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecipePatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl RecipePatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Recipe {
        Recipe {
            id: "1".to_string(),
            title: "Laksa".to_string(),
            description: "Spicy coconut noodle soup".to_string(),
            image: "/images/recipes/laksa.jpg".to_string(),
            image_path: "/images/recipes/laksa.jpg".to_string(),
            ingredients: vec!["Rice noodles".to_string(), "Coconut milk".to_string()],
            instructions: vec!["Simmer the broth".to_string()],
            servings: Some(2),
            difficulty: Some(Difficulty::Medium),
            cuisine: Some(Cuisine::Malaysian),
            tags: vec!["soup".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_recipe_serialize_camel_case() {
        let json = serde_json::to_string(&sample()).expect("シリアライズ失敗");
        assert!(json.contains("\"imagePath\":\"/images/recipes/laksa.jpg\""));
        assert!(json.contains("\"difficulty\":\"medium\""));
        assert!(json.contains("\"cuisine\":\"Malaysian\""));
        assert!(json.contains("\"createdAt\":\"\""));
        // 未設定のオプション項目は出力しない
        assert!(!json.contains("cookTime"));
    }

    #[test]
    fn test_recipe_deserialize_minimal() {
        let json = r#"{"id": "7", "title": "Satay"}"#;
        let recipe: Recipe = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(recipe.id, "7");
        assert!(recipe.ingredients.is_empty());
        assert_eq!(recipe.difficulty, None);
    }

    #[test]
    fn test_cuisine_southeast_asian_label() {
        let json = r#"{"id": "8", "title": "Mixed", "cuisine": "Southeast Asian"}"#;
        let recipe: Recipe = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(recipe.cuisine, Some(Cuisine::SoutheastAsian));
        assert_eq!(Cuisine::SoutheastAsian.label(), "Southeast Asian");
    }

    #[test]
    fn test_unknown_difficulty_rejected() {
        let json = r#"{"id": "9", "title": "X", "difficulty": "extreme"}"#;
        assert!(serde_json::from_str::<Recipe>(json).is_err());
    }

    #[test]
    fn test_transient_images_dedup() {
        let mut recipe = sample();
        assert!(recipe.transient_images().is_empty());

        recipe.image = "blob:http://localhost/abc".to_string();
        recipe.image_path = "blob:http://localhost/abc".to_string();
        assert_eq!(
            recipe.transient_images(),
            vec![ImageRef::Transient("blob:http://localhost/abc".to_string())]
        );
    }

    #[test]
    fn test_display_image_falls_back_to_path() {
        let mut recipe = sample();
        recipe.image.clear();
        assert_eq!(recipe.display_image().as_str(), "/images/recipes/laksa.jpg");
    }

    #[test]
    fn test_apply_patch() {
        let mut recipe = sample();
        recipe.apply(&RecipePatch::default().title("Curry Laksa"));
        assert_eq!(recipe.title, "Curry Laksa");
        assert_eq!(recipe.description, "Spicy coconut noodle soup");

        recipe.apply(&RecipePatch::default());
        assert_eq!(recipe.title, "Curry Laksa");
    }

    #[test]
    fn test_time_labels_keep_free_text() {
        let mut recipe = sample();
        assert!(recipe.time_labels().is_empty());

        recipe.preparation_time = Some("1.5 hours".to_string());
        recipe.cook_time = Some("20 mins".to_string());
        assert_eq!(
            recipe.time_labels(),
            vec![("Preparation time", "1.5 hours"), ("Cook time", "20 mins")]
        );
    }

    #[test]
    fn test_has_tag_case_insensitive() {
        assert!(sample().has_tag("SOUP"));
        assert!(!sample().has_tag("noodles"));
    }
}
