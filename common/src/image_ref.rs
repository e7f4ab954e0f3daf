//! 画像参照
//!
//! アップロードされた画像は`blob:` URL（一時参照）として扱う。
//! 一時参照は明示的に1回だけ解放する必要がある。

use crate::error::Result;
use std::fmt;

/// 一時参照のスキーム
pub const TRANSIENT_SCHEME: &str = "blob:";

/// レシピ画像の参照
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageRef {
    /// ローカルで選択されたファイルのblob URL
    Transient(String),
    /// 静的アセットのパス
    Static(String),
}

impl ImageRef {
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with(TRANSIENT_SCHEME) {
            ImageRef::Transient(raw.to_string())
        } else {
            ImageRef::Static(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ImageRef::Transient(url) => url,
            ImageRef::Static(path) => path,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, ImageRef::Transient(_))
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一時参照の生成と解放
///
/// ブラウザでは`URL.createObjectURL`/`URL.revokeObjectURL`に対応する。
pub trait ImageRefs {
    /// 参照の元になるファイル（ブラウザでは`web_sys::File`）
    type File: ?Sized;

    fn create(&mut self, file: &Self::File) -> Result<ImageRef>;

    fn release(&mut self, image: &ImageRef);
}

/// メモリ上で一時参照を発行する実装（CLI・テスト用）
///
/// 解放履歴を保持するので、二重解放や解放漏れを検証できる。
#[derive(Debug, Default)]
pub struct MemoryImageRefs {
    next_id: u64,
    live: Vec<ImageRef>,
    released: Vec<ImageRef>,
}

impl MemoryImageRefs {
    pub fn new() -> Self {
        Self::default()
    }

    /// 未解放の参照
    pub fn live(&self) -> &[ImageRef] {
        &self.live
    }

    /// 解放された順の履歴
    pub fn released(&self) -> &[ImageRef] {
        &self.released
    }

    pub fn release_count(&self, image: &ImageRef) -> usize {
        self.released.iter().filter(|r| *r == image).count()
    }
}

impl ImageRefs for MemoryImageRefs {
    type File = str;

    fn create(&mut self, file: &str) -> Result<ImageRef> {
        self.next_id += 1;
        let image = ImageRef::Transient(format!("{}memory/{}", TRANSIENT_SCHEME, self.next_id));
        tracing::debug!(file, image = %image, "created transient image reference");
        self.live.push(image.clone());
        Ok(image)
    }

    fn release(&mut self, image: &ImageRef) {
        tracing::debug!(image = %image, "released transient image reference");
        self.live.retain(|r| r != image);
        self.released.push(image.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transient() {
        let image = ImageRef::parse("blob:http://localhost:8080/1234");
        assert!(image.is_transient());
        assert_eq!(image.as_str(), "blob:http://localhost:8080/1234");
    }

    #[test]
    fn test_parse_static() {
        let image = ImageRef::parse("/images/recipes/pho-bo.jpg");
        assert_eq!(image, ImageRef::Static("/images/recipes/pho-bo.jpg".to_string()));
        assert!(!image.is_transient());
    }

    #[test]
    fn test_memory_refs_create_and_release() {
        let mut refs = MemoryImageRefs::new();
        let a = refs.create("a.png").unwrap();
        let b = refs.create("b.png").unwrap();
        assert_ne!(a, b);
        assert_eq!(refs.live().len(), 2);

        refs.release(&a);
        assert_eq!(refs.live(), &[b.clone()]);
        assert_eq!(refs.release_count(&a), 1);
        assert_eq!(refs.release_count(&b), 0);
    }
}
