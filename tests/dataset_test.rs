//! データセット読み込みテスト

use recipe_gallery_common::{Error, Recipe, StaticDataset};
use tempfile::tempdir;

fn recipe(id: &str) -> Recipe {
    Recipe {
        id: id.to_string(),
        title: format!("Recipe {}", id),
        image: format!("/images/recipes/{}.jpg", id),
        created_at: "2025-01-01T00:00:00.000Z".to_string(),
        ..Default::default()
    }
}

/// ファイルへ書き出して読み込み
#[test]
fn test_load_from_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("recipes.json");
    let dataset = StaticDataset::new(vec![recipe("a"), recipe("b")]).unwrap();
    std::fs::write(&path, serde_json::to_string_pretty(&dataset).unwrap()).unwrap();

    let loaded = StaticDataset::load(&path).expect("読み込み失敗");
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded.get("b").map(|r| r.title.as_str()), Some("Recipe b"));
}

/// IDが重複したファイルは拒否
#[test]
fn test_duplicate_ids_rejected() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("recipes.json");
    let json = serde_json::json!({ "recipes": [recipe("a"), recipe("a")] });
    std::fs::write(&path, json.to_string()).unwrap();

    let err = StaticDataset::load(&path).unwrap_err();
    assert!(matches!(err, Error::DuplicateId(ref id) if id == "a"));
}

/// 存在しないファイル
#[test]
fn test_missing_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let err = StaticDataset::load(&dir.path().join("none.json")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

/// 組み込みデータセットのJSON形式（camelCase・省略可能フィールド）
#[test]
fn test_bundled_dataset_shape() {
    let dataset = StaticDataset::bundled().unwrap();
    assert_eq!(dataset.len(), 6);

    let json = serde_json::to_value(&dataset).unwrap();
    let first = &json["recipes"][0];
    assert!(first.get("imagePath").is_some());
    assert!(first.get("createdAt").is_some());
    assert!(first.get("image_path").is_none());
}
