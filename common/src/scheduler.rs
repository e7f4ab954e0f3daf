//! タイマー抽象
//!
//! アップロード進捗・保存待ちは周期/単発タイマーで駆動する。
//! ハンドルをdropするとタイマーは解除される。
//! `VirtualScheduler`は仮想時間で動くので、テストでは`advance`で時間を進める。

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

pub trait Scheduler {
    /// dropで解除されるタイマーハンドル
    type Handle;

    fn set_interval(&self, period_ms: u32, callback: Box<dyn FnMut()>) -> Self::Handle;

    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Self::Handle;
}

enum Task {
    Interval { period: u64, callback: Box<dyn FnMut()> },
    Timeout(Box<dyn FnOnce()>),
}

struct Entry {
    due: u64,
    task: Task,
}

#[derive(Default)]
struct Timeline {
    now: u64,
    next_id: u64,
    entries: BTreeMap<u64, Entry>,
    /// 実行中のタイマーと、その実行中に解除されたか
    running: Option<(u64, bool)>,
}

impl Timeline {
    fn insert(&mut self, due: u64, task: Task) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(id, Entry { due, task });
        id
    }

    /// `until`以前で最も早いタイマーを取り出す（同時刻は登録順）
    fn pop_due(&mut self, until: u64) -> Option<(u64, Entry)> {
        let id = self
            .entries
            .iter()
            .filter(|(_, e)| e.due <= until)
            .min_by_key(|(id, e)| (e.due, **id))
            .map(|(id, _)| *id)?;
        let entry = self.entries.remove(&id)?;
        self.now = entry.due;
        self.running = Some((id, false));
        Some((id, entry))
    }

    /// 実行後の周期タイマーを戻す。実行中に解除されていれば返す
    fn finish(&mut self, id: u64, next: Option<Entry>) -> Option<Entry> {
        let cancelled = matches!(self.running.take(), Some((running, true)) if running == id);
        match next {
            Some(entry) if !cancelled => {
                self.entries.insert(id, entry);
                None
            }
            other => other,
        }
    }

    fn cancel(&mut self, id: u64) -> Option<Entry> {
        if let Some((running, cancelled)) = self.running.as_mut() {
            if *running == id {
                *cancelled = true;
            }
        }
        self.entries.remove(&id)
    }
}

/// 仮想時間スケジューラ（クローンは同じタイムラインを指す）
#[derive(Clone, Default)]
pub struct VirtualScheduler {
    timeline: Rc<RefCell<Timeline>>,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// 現在の仮想時刻（ミリ秒）
    pub fn now(&self) -> u64 {
        self.timeline.borrow().now
    }

    /// 登録中のタイマー数
    pub fn pending(&self) -> usize {
        self.timeline.borrow().entries.len()
    }

    /// 時間を進め、期限の来たタイマーを期限順に実行する。実行回数を返す
    pub fn advance(&self, ms: u64) -> usize {
        let until = self.now() + ms;
        let mut fired = 0;

        loop {
            // コールバック中にタイマー登録・解除できるよう、借用を解放してから実行
            let next = self.timeline.borrow_mut().pop_due(until);
            let Some((id, entry)) = next else { break };
            fired += 1;

            let rescheduled = match entry.task {
                Task::Timeout(callback) => {
                    callback();
                    None
                }
                Task::Interval { period, mut callback } => {
                    callback();
                    Some(Entry {
                        due: entry.due + period,
                        task: Task::Interval { period, callback },
                    })
                }
            };
            let leftover = self.timeline.borrow_mut().finish(id, rescheduled);
            drop(leftover);
        }

        self.timeline.borrow_mut().now = until;
        fired
    }

    /// 全タイマーが無くなるまで進める（周期タイマーが残る場合は`limit_ms`で打ち切り）
    pub fn run_until_idle(&self, limit_ms: u64) -> usize {
        let deadline = self.now() + limit_ms;
        let mut fired = 0;
        while self.pending() > 0 && self.now() < deadline {
            let next_due = self
                .timeline
                .borrow()
                .entries
                .values()
                .map(|e| e.due)
                .min();
            let Some(due) = next_due else { break };
            let step = due.saturating_sub(self.now()).min(deadline - self.now());
            fired += self.advance(step);
        }
        fired
    }

    fn schedule(&self, delay_ms: u32, task: Task) -> VirtualTimer {
        let mut timeline = self.timeline.borrow_mut();
        let due = timeline.now + u64::from(delay_ms);
        let id = timeline.insert(due, task);
        VirtualTimer {
            id,
            timeline: Rc::downgrade(&self.timeline),
        }
    }
}

impl Scheduler for VirtualScheduler {
    type Handle = VirtualTimer;

    fn set_interval(&self, period_ms: u32, callback: Box<dyn FnMut()>) -> VirtualTimer {
        // 周期0は無限ループになるので1msに切り上げ
        let period = period_ms.max(1);
        self.schedule(
            period,
            Task::Interval {
                period: u64::from(period),
                callback,
            },
        )
    }

    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> VirtualTimer {
        self.schedule(delay_ms, Task::Timeout(callback))
    }
}

impl fmt::Debug for VirtualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualScheduler")
            .field("now", &self.now())
            .field("pending", &self.pending())
            .finish()
    }
}

/// `VirtualScheduler`のタイマーハンドル
#[must_use = "dropping a timer handle cancels the timer"]
#[derive(Debug)]
pub struct VirtualTimer {
    id: u64,
    timeline: Weak<RefCell<Timeline>>,
}

impl Drop for VirtualTimer {
    fn drop(&mut self) {
        if let Some(timeline) = self.timeline.upgrade() {
            // コールバックのdropは借用解放後
            let removed = timeline.borrow_mut().cancel(self.id);
            drop(removed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counter() -> (Rc<Cell<u32>>, impl FnMut() + 'static) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        (count, move || c.set(c.get() + 1))
    }

    #[test]
    fn test_timeout_fires_once_at_due_time() {
        let scheduler = VirtualScheduler::new();
        let (count, mut bump) = counter();
        let _timer = scheduler.set_timeout(1000, Box::new(move || bump()));

        assert_eq!(scheduler.advance(999), 0);
        assert_eq!(count.get(), 0);
        assert_eq!(scheduler.advance(1), 1);
        assert_eq!(count.get(), 1);
        assert_eq!(scheduler.advance(5000), 0);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_interval_repeats() {
        let scheduler = VirtualScheduler::new();
        let (count, bump) = counter();
        let _timer = scheduler.set_interval(200, Box::new(bump));

        scheduler.advance(1000);
        assert_eq!(count.get(), 5);
        assert_eq!(scheduler.now(), 1000);
    }

    #[test]
    fn test_drop_handle_cancels() {
        let scheduler = VirtualScheduler::new();
        let (count, bump) = counter();
        let timer = scheduler.set_interval(100, Box::new(bump));

        scheduler.advance(250);
        drop(timer);
        scheduler.advance(1000);
        assert_eq!(count.get(), 2);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_fires_in_due_order() {
        let scheduler = VirtualScheduler::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let push = |label: &'static str| {
            let order = order.clone();
            Box::new(move || order.borrow_mut().push(label)) as Box<dyn FnOnce()>
        };
        let _late = scheduler.set_timeout(300, push("late"));
        let _early = scheduler.set_timeout(100, push("early"));
        let _same = scheduler.set_timeout(100, push("same-time"));

        scheduler.advance(500);
        assert_eq!(*order.borrow(), vec!["early", "same-time", "late"]);
    }

    #[test]
    fn test_interval_cancelled_from_own_callback() {
        let scheduler = VirtualScheduler::new();
        let slot: Rc<RefCell<Option<VirtualTimer>>> = Rc::new(RefCell::new(None));
        let count = Rc::new(Cell::new(0));

        let timer = scheduler.set_interval(100, {
            let slot = slot.clone();
            let count = count.clone();
            Box::new(move || {
                count.set(count.get() + 1);
                if count.get() == 3 {
                    let handle = slot.borrow_mut().take();
                    drop(handle);
                }
            })
        });
        *slot.borrow_mut() = Some(timer);

        scheduler.advance(1000);
        assert_eq!(count.get(), 3);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_callback_can_schedule() {
        let scheduler = VirtualScheduler::new();
        let (count, mut bump) = counter();
        let keep: Rc<RefCell<Vec<VirtualTimer>>> = Rc::new(RefCell::new(Vec::new()));

        let _outer = scheduler.set_timeout(100, {
            let scheduler = scheduler.clone();
            let keep = keep.clone();
            Box::new(move || {
                let inner = scheduler.set_timeout(100, Box::new(move || bump()));
                keep.borrow_mut().push(inner);
            })
        });

        scheduler.advance(150);
        assert_eq!(count.get(), 0);
        scheduler.advance(50);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_run_until_idle() {
        let scheduler = VirtualScheduler::new();
        let (count, mut bump) = counter();
        let _a = scheduler.set_timeout(300, Box::new(move || bump()));

        assert_eq!(scheduler.run_until_idle(10_000), 1);
        assert_eq!(count.get(), 1);
        assert_eq!(scheduler.now(), 300);
    }
}
