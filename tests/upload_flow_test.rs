//! 擬似アップロードの結合テスト
//!
//! ドライバ（仮想スケジューラ）経由でアップロード〜受理/破棄を検証

use recipe_gallery::driver::{Decision, UploadDriver, UploadRequest};
use recipe_gallery::error::CliError;
use recipe_gallery_common::{
    Error, FixedClock, GalleryConfig, StaticDataset, TemplateCatalog, ValidationError,
};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::{tempdir, TempDir};

fn driver() -> UploadDriver {
    let dataset = Rc::new(StaticDataset::bundled().unwrap());
    UploadDriver::new(GalleryConfig::default(), dataset)
        .with_clock(Rc::new(FixedClock::from_millis(1_736_499_600_000)))
        .with_seed(42)
        .headless()
}

fn image_file(dir: &TempDir, name: &str, size: usize) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, vec![0u8; size]).unwrap();
    path
}

fn request(path: &Path, decision: Decision) -> UploadRequest {
    UploadRequest::new(path, decision)
}

/// 受理するとギャラリーが1件増える
#[tokio::test]
async fn test_accept_adds_to_gallery() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = image_file(&dir, "dish.png", 2048);

    let report = driver().run(&request(&path, Decision::Accept)).await.unwrap();

    let accepted = report.accepted.expect("受理されていない");
    assert_eq!(report.gallery_count, 7);
    assert!(accepted.id.starts_with("recipe-1736499600000-"));
    assert!(accepted.image.starts_with("blob:"));
    assert_eq!(accepted.image, accepted.image_path);
    assert_eq!(accepted.created_at, "2025-01-10T09:00:00.000Z");
    assert!(TemplateCatalog::southeast_asian()
        .titles()
        .contains(&accepted.title.as_str()));
    // 受理した画像は解放しない
    assert_eq!(report.released_images, 0);
    assert_eq!(report.error, None);
}

/// 編集内容が受理されたレシピに反映される
#[tokio::test]
async fn test_edits_are_applied() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = image_file(&dir, "dish.jpg", 2048);

    let req = UploadRequest {
        title: Some("Grandma's Laksa".to_string()),
        description: Some("Extra coconut milk".to_string()),
        ..request(&path, Decision::Accept)
    };
    let report = driver().run(&req).await.unwrap();

    let accepted = report.accepted.unwrap();
    assert_eq!(accepted.title, "Grandma's Laksa");
    assert_eq!(accepted.description, "Extra coconut milk");
}

/// 破棄すると一時参照を1回だけ解放し、ギャラリーは変わらない
#[tokio::test]
async fn test_cancel_releases_once() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = image_file(&dir, "dish.webp", 2048);

    let report = driver().run(&request(&path, Decision::Cancel)).await.unwrap();

    assert!(report.accepted.is_none());
    assert_eq!(report.gallery_count, 6);
    assert_eq!(report.released_images, 1);
}

/// 保存失敗はプレビューに戻りエラーを返す
#[tokio::test]
async fn test_save_failure_leaves_gallery_unchanged() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = image_file(&dir, "dish.png", 2048);

    let req = UploadRequest {
        fail_save: true,
        ..request(&path, Decision::Accept)
    };
    let report = driver().run(&req).await.unwrap();

    assert!(report.accepted.is_none());
    assert_eq!(report.gallery_count, 6);
    assert!(report.error.unwrap().contains("simulated storage failure"));
    // 受理されなかったので閉じた時点で解放される
    assert_eq!(report.released_images, 1);
}

/// 画像以外のMIMEタイプは拒否
#[tokio::test]
async fn test_non_image_rejected() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = image_file(&dir, "notes.txt", 16);

    let err = driver().run(&request(&path, Decision::Accept)).await.unwrap_err();
    assert!(matches!(
        err,
        CliError::Gallery(Error::Validation(ValidationError::UnsupportedType { .. }))
    ));
}

/// MIMEタイプの明示指定は拡張子より優先
#[tokio::test]
async fn test_explicit_mime_overrides_extension() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = image_file(&dir, "photo.bin", 16);

    let req = UploadRequest {
        mime_type: Some("image/heic".to_string()),
        ..request(&path, Decision::Accept)
    };
    let report = driver().run(&req).await.unwrap();
    assert!(report.accepted.is_some());
}

/// 5MiBを超えるファイルは拒否
#[tokio::test]
async fn test_too_large_rejected() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = image_file(&dir, "huge.png", 5 * 1024 * 1024 + 1);

    let err = driver().run(&request(&path, Decision::Accept)).await.unwrap_err();
    assert!(matches!(
        err,
        CliError::Gallery(Error::Validation(ValidationError::TooLarge { .. }))
    ));
}

/// 存在しないファイル
#[tokio::test]
async fn test_missing_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let err = driver()
        .run(&request(&dir.path().join("none.png"), Decision::Accept))
        .await
        .unwrap_err();
    assert!(matches!(err, CliError::FileNotFound(_)));
}

/// 進捗間隔0msの設定はアップロード前に拒否
#[tokio::test]
async fn test_zero_tick_interval_rejected() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = image_file(&dir, "dish.png", 2048);

    let config = GalleryConfig {
        tick_interval_ms: 0,
        ..Default::default()
    };
    let dataset = Rc::new(StaticDataset::bundled().unwrap());
    let err = UploadDriver::new(config, dataset)
        .with_seed(42)
        .headless()
        .run(&request(&path, Decision::Accept))
        .await
        .unwrap_err();
    assert!(matches!(err, CliError::Gallery(Error::Config(_))));
}

/// 同じ種なら同じレシピが生成される
#[tokio::test]
async fn test_deterministic_with_seed() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = image_file(&dir, "dish.png", 2048);

    let a = driver().run(&request(&path, Decision::Cancel)).await.unwrap();
    let b = driver().run(&request(&path, Decision::Cancel)).await.unwrap();
    assert_eq!(a.generated.id, b.generated.id);
    assert_eq!(a.generated.title, b.generated.title);
}
