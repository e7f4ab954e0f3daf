//! 擬似アップロードのドライバ
//!
//! ブラウザと同じ`UploadSession`を`VirtualScheduler`上で動かす。
//! 対話モードでは実時間で待ちながら進捗バーを表示する。

use crate::error::{CliError, Result};
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use recipe_gallery_common::{
    Clock, GalleryConfig, GalleryViewModel, MemoryImageRefs, Recipe, RecipePatch, RecipeStore,
    SaveBackend, SelectedFile, SessionParts, SimulatedSave, StaticDataset, SystemClock,
    TemplateCatalog, UploadPhase, UploadSession, UploadState, VirtualScheduler,
};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

/// プレビュー後の扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Cancel,
    /// 確認プロンプトを出す
    Ask,
}

#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub path: PathBuf,
    pub mime_type: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub decision: Decision,
    pub fail_save: bool,
}

impl UploadRequest {
    pub fn new(path: impl Into<PathBuf>, decision: Decision) -> Self {
        Self {
            path: path.into(),
            mime_type: None,
            title: None,
            description: None,
            decision,
            fail_save: false,
        }
    }

    fn patch(&self) -> RecipePatch {
        let mut patch = RecipePatch::default();
        if let Some(title) = &self.title {
            patch = patch.title(title.clone());
        }
        if let Some(description) = &self.description {
            patch = patch.description(description.clone());
        }
        patch
    }
}

/// アップロード結果
#[derive(Debug, Clone)]
pub struct UploadReport {
    /// プレビューで生成されたレシピ（編集後）
    pub generated: Recipe,
    /// ギャラリーに追加されたレシピ
    pub accepted: Option<Recipe>,
    /// 静的 + アップロード済みの件数
    pub gallery_count: usize,
    /// 解放された一時参照の数
    pub released_images: usize,
    pub error: Option<String>,
}

pub struct UploadDriver {
    config: GalleryConfig,
    dataset: Rc<StaticDataset>,
    clock: Rc<dyn Clock>,
    seed: u64,
    interactive: bool,
}

impl UploadDriver {
    pub fn new(config: GalleryConfig, dataset: Rc<StaticDataset>) -> Self {
        let clock: Rc<dyn Clock> = Rc::new(SystemClock);
        let seed = clock.now().timestamp_millis() as u64;
        Self {
            config,
            dataset,
            clock,
            seed,
            interactive: true,
        }
    }

    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// 待ち時間・進捗バー・出力なしで実行する
    pub fn headless(mut self) -> Self {
        self.interactive = false;
        self
    }

    pub async fn run(&self, request: &UploadRequest) -> Result<UploadReport> {
        self.config.validate()?;
        let selected = self.describe_file(request)?;
        tracing::info!(file = %selected.name, mime = %selected.mime_type, size = selected.size, "starting upload");

        let scheduler = VirtualScheduler::new();
        let store = RecipeStore::new();
        let gallery = GalleryViewModel::new(Rc::clone(&self.dataset), &store, &self.config, |_| {});
        gallery.load();

        let save: Box<dyn SaveBackend> = if request.fail_save {
            Box::new(SimulatedSave::fail_next("simulated storage failure"))
        } else {
            Box::new(SimulatedSave::new())
        };

        let bar = self.progress_bar();
        let session = UploadSession::new(
            SessionParts {
                scheduler: scheduler.clone(),
                store: store.clone(),
                catalog: Rc::new(TemplateCatalog::southeast_asian()),
                clock: Rc::clone(&self.clock),
                images: MemoryImageRefs::new(),
                rng: SmallRng::seed_from_u64(self.seed),
                save,
                config: self.config.clone(),
            },
            {
                let bar = bar.clone();
                move |state: &UploadState| bar.set_position(u64::from(state.progress))
            },
        );

        let raw = request.path.display().to_string();
        session.select_file(selected, raw.as_str())?;

        // 進捗
        let tick = self.config.tick_interval_ms.max(1);
        while matches!(session.phase(), UploadPhase::Uploading { .. }) {
            self.wait(tick).await;
            scheduler.advance(u64::from(tick));
        }
        bar.finish_and_clear();

        let patch = request.patch();
        if !patch.is_empty() {
            session.edit(&patch)?;
        }
        let generated = session
            .state()
            .generated
            .ok_or(recipe_gallery_common::Error::NoGeneratedRecipe)?;
        self.print_preview(&generated);

        let accept = match request.decision {
            Decision::Accept => true,
            Decision::Cancel => false,
            Decision::Ask => Confirm::new()
                .with_prompt(format!("「{}」をギャラリーに追加しますか?", generated.title))
                .default(true)
                .interact()
                .map_err(|e| CliError::Prompt(e.to_string()))?,
        };

        if accept {
            session.accept()?;
            self.wait(self.config.accept_delay_ms).await;
            scheduler.advance(u64::from(self.config.accept_delay_ms));
        }

        let state = session.state();
        let accepted = match state.phase {
            UploadPhase::Accepted => store.get(&generated.id),
            _ => None,
        };
        let error = state.error.clone();

        session.close();
        let released_images = session.with_images(|images| images.released().len());
        tracing::debug!(released = released_images, pending_timers = scheduler.pending(), "session closed");

        Ok(UploadReport {
            generated,
            accepted,
            gallery_count: gallery.recipes().len(),
            released_images,
            error,
        })
    }

    fn describe_file(&self, request: &UploadRequest) -> Result<SelectedFile> {
        let metadata = std::fs::metadata(&request.path)
            .map_err(|_| CliError::FileNotFound(request.path.display().to_string()))?;
        if !metadata.is_file() {
            return Err(CliError::FileNotFound(request.path.display().to_string()));
        }

        let mime_type = match &request.mime_type {
            Some(mime) => mime.clone(),
            None => mime_guess::from_path(&request.path)
                .first_or_octet_stream()
                .essence_str()
                .to_string(),
        };
        let name = request
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| request.path.display().to_string());

        Ok(SelectedFile::new(name, mime_type, metadata.len()))
    }

    async fn wait(&self, ms: u32) {
        if self.interactive {
            tokio::time::sleep(Duration::from_millis(u64::from(ms))).await;
        }
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.interactive {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(100);
        if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} 解析中 [{bar:40.cyan/blue}] {pos}%") {
            bar.set_style(style.progress_chars("█▓▒░ "));
        }
        bar
    }

    fn print_preview(&self, recipe: &Recipe) {
        if !self.interactive {
            return;
        }
        println!("\n🍜 {}", recipe.title);
        if !recipe.description.is_empty() {
            println!("   {}", recipe.description);
        }
        println!("   ID: {}", recipe.id);
        println!("   画像: {}", recipe.image);
        println!("   材料: {}品 / 手順: {}ステップ\n", recipe.ingredients.len(), recipe.instructions.len());
    }
}
