//! Wall-clock budget for a stress run.

use std::time::{Duration, Instant};

/// Tracks how much of the run's time budget is left.
///
/// `start(offset)` opens the budget; `offset` is time already spent elsewhere
/// (for example during setup) and is charged against the budget up front.
///
/// 跟踪运行时间预算的剩余量。`start(offset)` 开启预算，`offset` 是已在别处
/// 消耗的时间，会预先从预算中扣除。
#[derive(Debug, Clone)]
pub struct TimeBudget {
    duration: Duration,
    started: Option<Instant>,
    offset: Duration,
    finished: Option<Duration>,
}

impl TimeBudget {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            started: None,
            offset: Duration::ZERO,
            finished: None,
        }
    }

    pub fn start(&mut self, offset: Duration) {
        self.started = Some(Instant::now());
        self.offset = offset;
        self.finished = None;
    }

    /// Time spent since `start`, including the offset.
    pub fn elapsed(&self) -> Duration {
        match (self.finished, self.started) {
            (Some(total), _) => total,
            (None, Some(started)) => started.elapsed() + self.offset,
            (None, None) => Duration::ZERO,
        }
    }

    /// Remaining budget; zero once exhausted or finished.
    /// 剩余预算；耗尽或结束后为零。
    pub fn time_left(&self) -> Duration {
        if self.started.is_none() {
            return self.duration;
        }
        self.duration.saturating_sub(self.elapsed())
    }

    /// `false` before `start`, after `finish`, and once the budget is spent.
    pub fn continue_execution(&self) -> bool {
        self.started.is_some() && self.finished.is_none() && self.time_left() > Duration::ZERO
    }

    /// Closes the budget and returns the total elapsed time.
    pub fn finish(&mut self) -> Duration {
        let total = self.elapsed();
        if self.started.is_some() {
            self.finished = Some(total);
        }
        total
    }
}
