//! アップロードセッション
//!
//! `UploadFlow`をタイマー・ストア・保存処理につなぐ。
//! - ファイル選択後、`tick_interval_ms`ごとに進捗を進める
//! - 受理は`accept_delay_ms`待ってから保存処理の結果を反映する
//! - キャンセル（モーダルを閉じる）・破棄時はタイマーハンドルを全てdropする

use crate::clock::Clock;
use crate::config::GalleryConfig;
use crate::error::{Error, Result};
use crate::image_ref::ImageRefs;
use crate::scheduler::Scheduler;
use crate::store::RecipeStore;
use crate::templates::TemplateCatalog;
use crate::types::{Recipe, RecipePatch};
use crate::upload::{SelectedFile, TickOutcome, UploadFlow, UploadPhase, UploadState, UploadTicket};
use rand::rngs::SmallRng;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// 受理したレシピの保存先
pub trait SaveBackend {
    fn save(&mut self, recipe: &Recipe) -> Result<()>;
}

/// 保存のシミュレーション（実際には何も書かない）
#[derive(Debug, Clone, Default)]
pub struct SimulatedSave {
    fail_next: Option<String>,
}

impl SimulatedSave {
    pub fn new() -> Self {
        Self::default()
    }

    /// 次の1回だけ失敗させる
    pub fn fail_next(message: impl Into<String>) -> Self {
        Self {
            fail_next: Some(message.into()),
        }
    }
}

impl SaveBackend for SimulatedSave {
    fn save(&mut self, recipe: &Recipe) -> Result<()> {
        match self.fail_next.take() {
            Some(message) => Err(Error::SimulatedSaveFailure(message)),
            None => {
                tracing::debug!(id = %recipe.id, "simulated save");
                Ok(())
            }
        }
    }
}

/// セッションの構成要素
pub struct SessionParts<S, I> {
    pub scheduler: S,
    pub store: RecipeStore,
    pub catalog: Rc<TemplateCatalog>,
    pub clock: Rc<dyn Clock>,
    pub images: I,
    pub rng: SmallRng,
    pub save: Box<dyn SaveBackend>,
    pub config: GalleryConfig,
}

struct Shared<S: Scheduler, I> {
    flow: UploadFlow,
    images: I,
    rng: SmallRng,
    save: Box<dyn SaveBackend>,
    catalog: Rc<TemplateCatalog>,
    clock: Rc<dyn Clock>,
    /// 進捗タイマー
    ticker: Option<S::Handle>,
    /// 保存待ちタイマー
    saver: Option<S::Handle>,
}

type ChangeListener = Rc<dyn Fn(&UploadState)>;

pub struct UploadSession<S: Scheduler, I: ImageRefs> {
    shared: Rc<RefCell<Shared<S, I>>>,
    scheduler: S,
    store: RecipeStore,
    on_change: ChangeListener,
    tick_interval_ms: u32,
    accept_delay_ms: u32,
}

impl<S, I> UploadSession<S, I>
where
    S: Scheduler + 'static,
    S::Handle: 'static,
    I: ImageRefs + 'static,
{
    /// `on_change`は状態が変わるたびに（借用を解放した状態で）呼ばれる
    pub fn new(parts: SessionParts<S, I>, on_change: impl Fn(&UploadState) + 'static) -> Self {
        let shared = Shared {
            flow: UploadFlow::new(&parts.config),
            images: parts.images,
            rng: parts.rng,
            save: parts.save,
            catalog: parts.catalog,
            clock: parts.clock,
            ticker: None,
            saver: None,
        };
        Self {
            shared: Rc::new(RefCell::new(shared)),
            scheduler: parts.scheduler,
            store: parts.store,
            on_change: Rc::new(on_change),
            tick_interval_ms: parts.config.tick_interval_ms,
            accept_delay_ms: parts.config.accept_delay_ms,
        }
    }

    pub fn state(&self) -> UploadState {
        self.shared.borrow().flow.state().clone()
    }

    pub fn phase(&self) -> UploadPhase {
        self.shared.borrow().flow.phase()
    }

    pub fn store(&self) -> &RecipeStore {
        &self.store
    }

    /// 進捗・保存待ちのタイマーが残っているか
    pub fn has_active_timers(&self) -> bool {
        let shared = self.shared.borrow();
        shared.ticker.is_some() || shared.saver.is_some()
    }

    pub fn with_images<R>(&self, f: impl FnOnce(&I) -> R) -> R {
        f(&self.shared.borrow().images)
    }

    pub fn set_dragging(&self, is_dragging: bool) {
        self.shared.borrow_mut().flow.set_dragging(is_dragging);
        self.notify();
    }

    /// ファイルを選択し、擬似アップロードを開始する
    pub fn select_file(&self, file: SelectedFile, raw: &I::File) -> Result<()> {
        let started = {
            let mut guard = self.shared.borrow_mut();
            let inner = &mut *guard;
            inner
                .flow
                .select_file(file, raw, &mut inner.images)
                .and_then(|()| inner.flow.begin_upload())
        };
        let ticket = match started {
            Ok(ticket) => ticket,
            Err(e) => {
                self.notify();
                return Err(e);
            }
        };

        let handle = self
            .scheduler
            .set_interval(self.tick_interval_ms, self.tick_callback(ticket));
        self.shared.borrow_mut().ticker = Some(handle);
        self.notify();
        Ok(())
    }

    fn tick_callback(&self, ticket: UploadTicket) -> Box<dyn FnMut()> {
        let weak: Weak<RefCell<Shared<S, I>>> = Rc::downgrade(&self.shared);
        let on_change = Rc::clone(&self.on_change);
        Box::new(move || {
            let Some(shared) = weak.upgrade() else { return };
            let (outcome, finished, snapshot) = {
                let mut guard = shared.borrow_mut();
                let inner = &mut *guard;
                let outcome = inner
                    .flow
                    .tick(ticket, &inner.catalog, &mut inner.rng, inner.clock.as_ref());
                // 完了したら進捗タイマーを止める（古いティックは新しいセッションのタイマーに触れない）
                let finished = if outcome == TickOutcome::PreviewReady {
                    inner.ticker.take()
                } else {
                    None
                };
                (outcome, finished, inner.flow.state().clone())
            };
            drop(finished);
            if outcome != TickOutcome::Stale {
                on_change(&snapshot);
            }
        })
    }

    pub fn edit(&self, patch: &RecipePatch) -> Result<()> {
        let result = self.shared.borrow_mut().flow.edit(patch);
        self.notify();
        result
    }

    /// 生成済みレシピを受理する。保存待ちの後、成功すればストアへ追加
    pub fn accept(&self) -> Result<()> {
        let started = self.shared.borrow_mut().flow.begin_accept();
        let ticket = match started {
            Ok(ticket) => ticket,
            Err(e) => {
                self.notify();
                return Err(e);
            }
        };

        let handle = self
            .scheduler
            .set_timeout(self.accept_delay_ms, self.accept_callback(ticket));
        self.shared.borrow_mut().saver = Some(handle);
        self.notify();
        Ok(())
    }

    fn accept_callback(&self, ticket: UploadTicket) -> Box<dyn FnOnce()> {
        let weak: Weak<RefCell<Shared<S, I>>> = Rc::downgrade(&self.shared);
        let on_change = Rc::clone(&self.on_change);
        let store = self.store.clone();
        Box::new(move || {
            let Some(shared) = weak.upgrade() else { return };
            let (result, saver, snapshot) = {
                let mut guard = shared.borrow_mut();
                let inner = &mut *guard;
                let outcome = match inner.flow.state().generated.as_ref() {
                    Some(recipe) => inner.save.save(recipe),
                    None => Err(Error::NoGeneratedRecipe),
                };
                let result = inner.flow.finish_accept(ticket, outcome);
                let saver = match result {
                    Err(Error::StaleSession) => None,
                    _ => inner.saver.take(),
                };
                (result, saver, inner.flow.state().clone())
            };
            drop(saver);

            match result {
                Ok(recipe) => store.add(recipe),
                Err(Error::StaleSession) => return,
                Err(e) => tracing::warn!("accept failed: {}", e),
            }
            on_change(&snapshot);
        })
    }

    /// モーダルを開く（前回の残りがあれば破棄して新しいセッションにする）
    pub fn open(&self) {
        self.cancel();
    }

    /// モーダルを閉じる。タイマーを止め、未受理の一時参照を解放してIdleへ
    pub fn cancel(&self) {
        let timers = self.reset();
        drop(timers);
        self.notify();
    }

    pub fn close(&self) {
        self.cancel();
    }

    fn reset(&self) -> (Option<S::Handle>, Option<S::Handle>) {
        let mut guard = self.shared.borrow_mut();
        let inner = &mut *guard;
        let timers = (inner.ticker.take(), inner.saver.take());
        inner.flow.cancel(&mut inner.images, &self.store);
        timers
    }

    fn notify(&self) {
        let snapshot = self.state();
        (self.on_change)(&snapshot);
    }
}

impl<S: Scheduler, I: ImageRefs> Drop for UploadSession<S, I> {
    fn drop(&mut self) {
        // アンマウント時: 通知はせず、タイマー解除と一時参照の解放だけ行う
        let timers = match self.shared.try_borrow_mut() {
            Ok(mut guard) => {
                let inner = &mut *guard;
                let timers = (inner.ticker.take(), inner.saver.take());
                inner.flow.cancel(&mut inner.images, &self.store);
                Some(timers)
            }
            Err(_) => None,
        };
        drop(timers);
    }
}
