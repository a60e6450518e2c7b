//! # Worker Module / 工作线程模块
//!
//! A worker is one OS thread that keeps drawing a random index into the shared
//! [`TestMatrix`] and running the unit found there, until it is asked to stop
//! or observes its first unignored failure.
//!
//! Each worker owns a private, seeded random stream, so the sequence of indices
//! it visits depends only on its seed. The executed counter is the only field
//! written by the worker and read concurrently by the orchestrator; the failure
//! record is written at most once, before the thread exits.
//!
//! 工作线程是一个操作系统线程，它不断地从共享的 `TestMatrix` 中随机抽取索引并运行
//! 对应的单元，直到被要求停止或遇到第一个未被忽略的失败。
//! 每个工作线程拥有私有的带种子随机流，因此其访问的索引序列只取决于种子。

use once_cell::sync::OnceCell;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::core::error::StressError;
use crate::core::models::{TestUnit, UnitError};
use crate::core::planner::TestMatrix;

/// Deterministic uniform sampler over `[0, len)`.
/// 在 `[0, len)` 上的确定性均匀采样器。
#[derive(Debug, Clone)]
pub struct IndexSampler {
    rng: StdRng,
    len: usize,
}

impl IndexSampler {
    /// Returns `None` for an empty range.
    pub fn new(seed: u64, len: usize) -> Option<Self> {
        (len > 0).then(|| Self {
            rng: StdRng::seed_from_u64(seed),
            len,
        })
    }

    pub fn next_index(&mut self) -> usize {
        self.rng.gen_range(0..self.len)
    }
}

/// The first unignored failure a worker observed.
/// 工作线程观察到的第一个未被忽略的失败。
#[derive(Clone)]
pub struct WorkerFailure {
    /// Position of the failing unit in the matrix.
    pub index: usize,
    pub test: Arc<dyn TestUnit>,
    pub cause: UnitError,
}

impl fmt::Debug for WorkerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerFailure")
            .field("index", &self.index)
            .field("test", &self.test.to_string())
            .field("cause", &self.cause)
            .finish()
    }
}

/// State shared between a worker thread and whoever monitors it.
#[derive(Debug, Default)]
struct WorkerState {
    executed: AtomicU64,
    failure: OnceCell<WorkerFailure>,
}

/// Final, read-only snapshot of a terminated worker.
/// 已终止工作线程的最终只读快照。
#[derive(Debug, Clone)]
pub struct WorkerReport {
    pub name: String,
    pub seed: u64,
    pub executed: u64,
    pub failure: Option<WorkerFailure>,
}

impl WorkerReport {
    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }
}

/// One sampling thread.
/// 一个采样线程。
pub struct Worker {
    name: String,
    seed: u64,
    matrix: Arc<TestMatrix>,
    ignore_failures: bool,
    state: Arc<WorkerState>,
    stop: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    pub fn new(
        name: impl Into<String>,
        seed: u64,
        matrix: Arc<TestMatrix>,
        ignore_failures: bool,
    ) -> Self {
        Self {
            name: name.into(),
            seed,
            matrix,
            ignore_failures,
            state: Arc::new(WorkerState::default()),
            stop: CancellationToken::new(),
            handle: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Spawns the worker thread. Calling it on a running worker does nothing.
    /// 创建工作线程。对已运行的工作线程调用此方法不会有任何效果。
    pub fn start(&mut self) -> Result<(), StressError> {
        if self.handle.is_some() {
            return Ok(());
        }
        let sampler =
            IndexSampler::new(self.seed, self.matrix.len()).ok_or(StressError::EmptyMatrix)?;

        let matrix = Arc::clone(&self.matrix);
        let state = Arc::clone(&self.state);
        let stop = self.stop.clone();
        let ignore_failures = self.ignore_failures;

        let handle = thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || run_loop(sampler, &matrix, &state, &stop, ignore_failures))
            .map_err(|source| StressError::Spawn {
                name: self.name.clone(),
                source,
            })?;
        self.handle = Some(handle);
        Ok(())
    }

    /// Asks the loop to exit before its next iteration. An in-flight unit is
    /// never interrupted.
    ///
    /// 请求循环在下一次迭代前退出。正在运行的单元不会被中断。
    pub fn request_stop(&self) {
        self.stop.cancel();
    }

    pub fn is_alive(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Blocks until the thread has terminated.
    pub fn join(&mut self) -> Result<(), StressError> {
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| StressError::WorkerPanicked(self.name.clone()))?;
        }
        Ok(())
    }

    pub fn executed(&self) -> u64 {
        self.state.executed.load(Ordering::Relaxed)
    }

    pub fn failure(&self) -> Option<&WorkerFailure> {
        self.state.failure.get()
    }

    pub fn is_failed(&self) -> bool {
        self.failure().is_some()
    }

    pub fn report(&self) -> WorkerReport {
        WorkerReport {
            name: self.name.clone(),
            seed: self.seed,
            executed: self.executed(),
            failure: self.failure().cloned(),
        }
    }
}

impl fmt::Debug for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("name", &self.name)
            .field("seed", &self.seed)
            .field("executed", &self.executed())
            .field("alive", &self.is_alive())
            .finish_non_exhaustive()
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.request_stop();
        let _ = self.join();
    }
}

fn run_loop(
    mut sampler: IndexSampler,
    matrix: &TestMatrix,
    state: &WorkerState,
    stop: &CancellationToken,
    ignore_failures: bool,
) {
    while !stop.is_cancelled() {
        let index = sampler.next_index();
        let Some(test) = matrix.get(index) else {
            break;
        };

        if let Err(cause) = execute_unit(test.as_ref(), &state.executed) {
            if ignore_failures {
                continue;
            }
            let _ = state.failure.set(WorkerFailure {
                index,
                test: Arc::clone(test),
                cause,
            });
            break;
        }
    }
}

/// Runs `test` once. Panics count as thrown failures; a unit that reports
/// itself failed after a normal return is treated the same way.
fn execute_unit(test: &dyn TestUnit, executed: &AtomicU64) -> Result<(), UnitError> {
    match panic::catch_unwind(AssertUnwindSafe(|| test.run())) {
        Ok(Ok(())) => {
            executed.fetch_add(1, Ordering::Relaxed);
            if test.is_failed() {
                Err(UnitError::Reported(test.to_string()))
            } else {
                Ok(())
            }
        }
        Ok(Err(e)) => Err(e),
        Err(payload) => Err(UnitError::Panic(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
