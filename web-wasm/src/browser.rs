//! ブラウザ実装（タイマー・blob URL・時計・乱数）

use chrono::{DateTime, Utc};
use gloo::timers::callback::{Interval, Timeout};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use recipe_gallery_common::{Clock, Error, ImageRef, ImageRefs, Result, Scheduler};
use web_sys::{File, Url};

/// `gloo::timers`によるスケジューラ
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooScheduler;

enum TimerKind {
    Interval(Interval),
    Timeout(Timeout),
}

/// dropで解除されるタイマー
pub struct BrowserTimer(Option<TimerKind>);

impl Drop for BrowserTimer {
    fn drop(&mut self) {
        if let Some(timer) = self.0.take() {
            // 自身のコールバック内でdropされるとクロージャ実行中に解放してしまうので、
            // 解除は次のマイクロタスクで行う
            wasm_bindgen_futures::spawn_local(async move {
                drop(timer);
            });
        }
    }
}

impl Scheduler for GlooScheduler {
    type Handle = BrowserTimer;

    fn set_interval(&self, period_ms: u32, callback: Box<dyn FnMut()>) -> BrowserTimer {
        let mut callback = callback;
        BrowserTimer(Some(TimerKind::Interval(Interval::new(period_ms, move || callback()))))
    }

    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> BrowserTimer {
        BrowserTimer(Some(TimerKind::Timeout(Timeout::new(delay_ms, callback))))
    }
}

/// `URL.createObjectURL` / `URL.revokeObjectURL`
#[derive(Debug, Default)]
pub struct ObjectUrls;

impl ImageRefs for ObjectUrls {
    type File = File;

    fn create(&mut self, file: &File) -> Result<ImageRef> {
        Url::create_object_url_with_blob(file)
            .map(|url| ImageRef::parse(&url))
            .map_err(|e| Error::ImageRef(format!("{:?}", e)))
    }

    fn release(&mut self, image: &ImageRef) {
        if let ImageRef::Transient(url) = image {
            if let Err(e) = Url::revoke_object_url(url) {
                gloo::console::warn!(format!("revokeObjectURL failed: {:?}", e));
            }
        }
    }
}

/// `Date.now()`による時計
#[derive(Debug, Clone, Copy, Default)]
pub struct JsClock;

impl Clock for JsClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
    }
}

/// `Math.random()`と現在時刻から種を作る
pub fn seeded_rng() -> SmallRng {
    let random = (js_sys::Math::random() * u32::MAX as f64) as u64;
    let now = js_sys::Date::now() as u64;
    SmallRng::seed_from_u64((random << 32) ^ now)
}
