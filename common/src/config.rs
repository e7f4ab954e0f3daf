//! ギャラリー設定
//!
//! アップロード制限・シミュレーション間隔・グリッドのブレークポイント。
//! 未指定の項目はデフォルト値を使う。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// 5 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GalleryConfig {
    /// アップロード可能な最大サイズ（バイト）
    pub max_upload_bytes: u64,
    /// 受け付けるMIMEタイプの接頭辞
    pub accepted_mime_prefix: String,
    /// 1ティックあたりの進捗（%）
    pub progress_step: u8,
    pub tick_interval_ms: u32,
    /// 保存シミュレーションの待ち時間
    pub accept_delay_ms: u32,
    /// ギャラリー読み込みシミュレーションの待ち時間
    pub gallery_load_delay_ms: u32,
    /// この幅未満は狭い画面として扱う
    pub narrow_breakpoint_px: u32,
    pub narrow_columns: u8,
    pub wide_columns: u8,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            accepted_mime_prefix: "image/".into(),
            progress_step: 10,
            tick_interval_ms: 200,
            accept_delay_ms: 1000,
            gallery_load_delay_ms: 1000,
            narrow_breakpoint_px: 768,
            narrow_columns: 2,
            wide_columns: 3,
        }
    }
}

impl GalleryConfig {
    /// JSON文字列から読み込み
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.progress_step == 0 || self.progress_step > 100 {
            return Err(Error::Config(format!(
                "progressStep must be between 1 and 100 (got {})",
                self.progress_step
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(Error::Config("tickIntervalMs must be at least 1".into()));
        }
        if self.narrow_columns == 0 || self.wide_columns == 0 {
            return Err(Error::Config("column counts must be at least 1".into()));
        }
        if self.accepted_mime_prefix.is_empty() {
            return Err(Error::Config("acceptedMimePrefix must not be empty".into()));
        }
        Ok(())
    }

    /// コンテナ幅からグリッドの列数を決める
    pub fn columns_for(&self, width: u32) -> u8 {
        if width < self.narrow_breakpoint_px {
            self.narrow_columns
        } else {
            self.wide_columns
        }
    }

    /// 進捗が100%に達するまでのティック数
    pub fn ticks_to_complete(&self) -> u32 {
        let step = u32::from(self.progress_step.max(1));
        100u32.div_ceil(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = GalleryConfig::default();
        assert_eq!(config.max_upload_bytes, 5_242_880);
        assert_eq!(config.progress_step, 10);
        assert_eq!(config.tick_interval_ms, 200);
        assert_eq!(config.ticks_to_complete(), 10);
    }

    #[test]
    fn test_columns_for_width() {
        let config = GalleryConfig::default();
        assert_eq!(config.columns_for(500), 2);
        assert_eq!(config.columns_for(767), 2);
        assert_eq!(config.columns_for(768), 3);
        assert_eq!(config.columns_for(1024), 3);
    }

    #[test]
    fn test_from_json_partial() {
        let config = GalleryConfig::from_json(r#"{"progressStep": 25, "wideColumns": 4}"#)
            .expect("設定の読み込み失敗");
        assert_eq!(config.progress_step, 25);
        assert_eq!(config.wide_columns, 4);
        assert_eq!(config.narrow_columns, 2);
        assert_eq!(config.ticks_to_complete(), 4);
    }

    #[test]
    fn test_from_json_rejects_zero_step() {
        let result = GalleryConfig::from_json(r#"{"progressStep": 0}"#);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_from_json_rejects_zero_tick_interval() {
        let result = GalleryConfig::from_json(r#"{"tickIntervalMs": 0}"#);
        assert!(matches!(result, Err(Error::Config(_))));

        // 保存待ちは0msでも進める
        let config = GalleryConfig::from_json(r#"{"acceptDelayMs": 0}"#).expect("設定の読み込み失敗");
        assert_eq!(config.accept_delay_ms, 0);
    }

    #[test]
    fn test_uneven_step_rounds_up() {
        let config = GalleryConfig {
            progress_step: 30,
            ..Default::default()
        };
        assert_eq!(config.ticks_to_complete(), 4);
    }
}
