//! アップロードフローの状態機械
//!
//! Idle → FileSelected → Uploading(0..100) → PreviewReady → Saving → Accepted
//! どの状態からも`cancel`でIdleへ戻る。
//!
//! タイマーは持たない。進捗は`tick`、保存は`begin_accept`/`finish_accept`で外から駆動する
//! （駆動側は`session::UploadSession`）。

use crate::clock::{timestamp, Clock};
use crate::config::GalleryConfig;
use crate::error::{Error, Result, ValidationError};
use crate::image_ref::{ImageRef, ImageRefs};
use crate::store::RecipeStore;
use crate::templates::TemplateCatalog;
use crate::types::{Recipe, RecipePatch};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// ファイル入力から受け取る情報（検証にはMIMEタイプとサイズのみ使う）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size,
        }
    }
}

/// フロー状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadPhase {
    #[default]
    Idle,
    FileSelected,
    Uploading { progress: u8 },
    PreviewReady,
    Saving,
    Accepted,
}

impl UploadPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadPhase::Idle => "idle",
            UploadPhase::FileSelected => "file-selected",
            UploadPhase::Uploading { .. } => "uploading",
            UploadPhase::PreviewReady => "preview-ready",
            UploadPhase::Saving => "saving",
            UploadPhase::Accepted => "accepted",
        }
    }

    /// スピナー等を表示すべき状態か
    pub fn is_busy(&self) -> bool {
        matches!(self, UploadPhase::Uploading { .. } | UploadPhase::Saving)
    }
}

/// 非同期ステップ（進捗タイマー・保存待ち）が属するセッション世代
///
/// キャンセル後に届いた古いコールバックは世代不一致で無視される。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadTicket {
    generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// 別セッションのティック、またはUploading以外で届いたティック
    Stale,
    Progress(u8),
    PreviewReady,
}

/// モーダル1回分の状態
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadState {
    pub phase: UploadPhase,
    pub file: Option<SelectedFile>,
    /// 選択ファイルの一時参照
    pub preview: Option<ImageRef>,
    pub progress: u8,
    /// 生成済み・未受理のレシピ
    pub generated: Option<Recipe>,
    /// ユーザーに表示するエラー（常に最新の1件のみ）
    pub error: Option<String>,
    pub is_dragging: bool,
}

#[derive(Debug)]
pub struct UploadFlow {
    state: UploadState,
    generation: u64,
    max_upload_bytes: u64,
    accepted_mime_prefix: String,
    progress_step: u8,
}

impl Default for UploadFlow {
    fn default() -> Self {
        Self::new(&GalleryConfig::default())
    }
}

impl UploadFlow {
    pub fn new(config: &GalleryConfig) -> Self {
        Self {
            state: UploadState::default(),
            generation: 0,
            max_upload_bytes: config.max_upload_bytes,
            accepted_mime_prefix: config.accepted_mime_prefix.clone(),
            progress_step: config.progress_step.max(1),
        }
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn phase(&self) -> UploadPhase {
        self.state.phase
    }

    pub fn set_dragging(&mut self, is_dragging: bool) {
        self.state.is_dragging = is_dragging;
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.state.error = error;
    }

    /// MIMEタイプとサイズの検証
    pub fn validate(&self, file: &SelectedFile) -> std::result::Result<(), ValidationError> {
        if !file.mime_type.starts_with(&self.accepted_mime_prefix) {
            return Err(ValidationError::UnsupportedType {
                mime_type: file.mime_type.clone(),
            });
        }
        if file.size > self.max_upload_bytes {
            return Err(ValidationError::TooLarge {
                size: file.size,
                max: self.max_upload_bytes,
            });
        }
        Ok(())
    }

    /// ファイル選択（Idleのみ）
    ///
    /// 検証に失敗した場合はエラーメッセージだけを設定し、状態は変えない。
    /// 成功時のみ一時参照を生成する。
    pub fn select_file<I: ImageRefs + ?Sized>(
        &mut self,
        file: SelectedFile,
        raw: &I::File,
        images: &mut I,
    ) -> Result<()> {
        self.expect_phase("select a file", |p| p == UploadPhase::Idle)?;

        if let Err(e) = self.validate(&file) {
            tracing::warn!(file = %file.name, mime = %file.mime_type, size = file.size, "rejected file: {}", e);
            return Err(self.fail(e.into()));
        }

        let preview = match images.create(raw) {
            Ok(image) => image,
            Err(e) => return Err(self.fail(e)),
        };

        tracing::debug!(file = %file.name, preview = %preview, "file selected");
        self.state.file = Some(file);
        self.state.preview = Some(preview);
        self.state.progress = 0;
        self.state.error = None;
        self.state.phase = UploadPhase::FileSelected;
        Ok(())
    }

    /// 擬似アップロード開始
    pub fn begin_upload(&mut self) -> Result<UploadTicket> {
        self.expect_phase("begin upload", |p| p == UploadPhase::FileSelected)?;
        self.state.progress = 0;
        self.state.phase = UploadPhase::Uploading { progress: 0 };
        Ok(self.ticket())
    }

    /// 進捗を1段階進める。100%でテンプレートからレシピを生成しPreviewReadyへ
    pub fn tick<R: Rng>(
        &mut self,
        ticket: UploadTicket,
        catalog: &TemplateCatalog,
        rng: &mut R,
        clock: &dyn Clock,
    ) -> TickOutcome {
        if ticket != self.ticket() {
            return TickOutcome::Stale;
        }
        let UploadPhase::Uploading { progress } = self.state.phase else {
            return TickOutcome::Stale;
        };

        let next = progress.saturating_add(self.progress_step).min(100);
        self.state.progress = next;
        if next < 100 {
            self.state.phase = UploadPhase::Uploading { progress: next };
            return TickOutcome::Progress(next);
        }

        let recipe = self.synthesize(catalog, rng, clock);
        tracing::debug!(id = %recipe.id, title = %recipe.title, "generated recipe preview");
        self.state.generated = Some(recipe);
        self.state.phase = UploadPhase::PreviewReady;
        TickOutcome::PreviewReady
    }

    fn synthesize<R: Rng>(&self, catalog: &TemplateCatalog, rng: &mut R, clock: &dyn Clock) -> Recipe {
        let now = clock.now();
        let image = self
            .state
            .preview
            .as_ref()
            .map(|p| p.as_str().to_string())
            .unwrap_or_default();

        let mut recipe = catalog.pick(rng).clone();
        recipe.id = format!("recipe-{}-{:08x}", now.timestamp_millis(), rng.random::<u32>());
        recipe.image = image.clone();
        recipe.image_path = image;
        recipe.created_at = timestamp(now);
        recipe
    }

    /// プレビュー中のレシピを部分更新（状態は変えない）
    pub fn edit(&mut self, patch: &RecipePatch) -> Result<()> {
        self.expect_phase("edit", |p| p == UploadPhase::PreviewReady)?;
        if let Some(recipe) = self.state.generated.as_mut() {
            recipe.apply(patch);
        }
        Ok(())
    }

    /// 保存開始。生成済みレシピが無ければエラーを設定するだけで何もしない
    pub fn begin_accept(&mut self) -> Result<UploadTicket> {
        if self.state.generated.is_none() {
            return Err(self.fail(Error::NoGeneratedRecipe));
        }
        self.expect_phase("accept", |p| p == UploadPhase::PreviewReady)?;
        self.state.error = None;
        self.state.phase = UploadPhase::Saving;
        Ok(self.ticket())
    }

    /// 保存結果を反映する
    ///
    /// 成功時は受理したレシピを返す（ストアへの追加は呼び出し側）。
    /// 失敗時はPreviewReadyへ戻りエラーを設定する。
    pub fn finish_accept(&mut self, ticket: UploadTicket, outcome: Result<()>) -> Result<Recipe> {
        if ticket != self.ticket() {
            return Err(Error::StaleSession);
        }
        self.expect_phase("finish accept", |p| p == UploadPhase::Saving)?;

        if let Err(e) = outcome {
            tracing::warn!("save failed: {}", e);
            self.state.phase = UploadPhase::PreviewReady;
            return Err(self.fail(e));
        }

        let recipe = self.state.generated.clone().ok_or(Error::NoGeneratedRecipe)?;
        self.state.phase = UploadPhase::Accepted;
        self.state.error = None;
        tracing::debug!(id = %recipe.id, "recipe accepted");
        Ok(recipe)
    }

    /// セッションを破棄してIdleへ戻る
    ///
    /// 一時参照は、受理済みレシピが使っていない場合に限り1回だけ解放する。
    pub fn cancel<I: ImageRefs + ?Sized>(&mut self, images: &mut I, store: &RecipeStore) {
        if let Some(preview) = self.state.preview.take() {
            if preview.is_transient() && !store.is_retained(&preview) {
                images.release(&preview);
            }
        }
        tracing::debug!(phase = self.state.phase.as_str(), "upload session reset");
        self.generation += 1;
        self.state = UploadState::default();
    }

    fn ticket(&self) -> UploadTicket {
        UploadTicket {
            generation: self.generation,
        }
    }

    fn expect_phase(&self, action: &'static str, allowed: impl Fn(UploadPhase) -> bool) -> Result<()> {
        if allowed(self.state.phase) {
            Ok(())
        } else {
            Err(Error::InvalidTransition {
                action,
                phase: self.state.phase.as_str(),
            })
        }
    }

    fn fail(&mut self, error: Error) -> Error {
        self.state.error = Some(error.to_string());
        error
    }
}
