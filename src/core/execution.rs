//! # Stress Execution Module / 压力执行模块
//!
//! The orchestrator drives a whole run: it builds the matrix, performs the
//! sequential warm-up pass, derives one seed per worker from the master seed,
//! starts the workers, monitors them against the time budget and finally
//! stops, joins and aggregates them into a [`RunVerdict`].
//!
//! Shutdown is cooperative. Stopping a worker only takes effect at the top of
//! its next iteration, so shutdown latency is bounded by the slowest unit that
//! is running at that moment.
//!
//! 编排器驱动整个运行：构建矩阵、执行顺序预热、从主种子派生每个工作线程的种子、
//! 启动工作线程、根据时间预算监控它们，最后停止、等待并汇总为 `RunVerdict`。
//! 关闭是协作式的：停止请求仅在下一次迭代开始时生效，
//! 因此关闭延迟受当时正在运行的最慢单元限制。

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::core::budget::TimeBudget;
use crate::core::config::StressConfig;
use crate::core::error::StressError;
use crate::core::models::{ExecutionMode, UnitConfig};
use crate::core::planner::build_matrix;
use crate::core::registry::Registry;
use crate::core::worker::{Worker, WorkerReport};
use crate::infra::entropy;
use crate::reporting::console;

/// Aggregate outcome of a run, computed once every worker has terminated.
/// 运行的汇总结果，在所有工作线程终止后计算一次。
#[derive(Debug, Clone)]
pub struct RunVerdict {
    /// Master seed the worker seeds were derived from.
    pub seed: u64,
    pub matrix_size: usize,
    pub workers: Vec<WorkerReport>,
    pub elapsed: Duration,
}

impl RunVerdict {
    pub fn is_failed(&self) -> bool {
        self.workers.iter().any(WorkerReport::is_failed)
    }

    pub fn failed_count(&self) -> usize {
        self.workers.iter().filter(|w| w.is_failed()).count()
    }

    pub fn total_executed(&self) -> u64 {
        self.workers.iter().map(|w| w.executed).sum()
    }

    /// Turns a failed verdict into `StressError::WorkersFailed`.
    /// 将失败的结论转换为 `StressError::WorkersFailed`。
    pub fn into_result(self) -> Result<Self, StressError> {
        if self.is_failed() {
            Err(StressError::WorkersFailed {
                failed: self.failed_count(),
                total: self.workers.len(),
            })
        } else {
            Ok(self)
        }
    }
}

/// Draws `count` worker seeds, in worker order, from one RNG seeded with `master`.
/// The whole run is reproducible from the master seed plus the worker count.
///
/// 从以 `master` 为种子的单个随机数生成器中按工作线程顺序抽取 `count` 个种子。
pub fn derive_worker_seeds(master: u64, count: usize) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(master);
    (0..count).map(|_| rng.r#gen::<u64>()).collect()
}

/// Modes every kind is run in during warm-up: one direct and one reflective
/// instance, so both invocation paths have initialized their shared state.
pub const WARMUP_MODES: [ExecutionMode; 2] = [ExecutionMode::Direct, ExecutionMode::Reflection];

/// Runs fresh instances of every kind once per [`WARMUP_MODES`] entry,
/// sequentially and silently, with failures and panics ignored. Only a failure
/// to instantiate a kind is an error.
///
/// This primes lazily initialized shared state before any concurrency begins.
///
/// 按 `WARMUP_MODES` 中的每种模式顺序且静默地运行每个类型的新实例，忽略失败和 panic。
/// 只有无法实例化才是错误。
pub fn warm_up(registry: &Registry) -> Result<usize, StressError> {
    for kind in registry.kinds() {
        for mode in WARMUP_MODES {
            let unit = kind.instantiate(UnitConfig {
                mode,
                ..UnitConfig::warmup()
            })?;
            let _ = panic::catch_unwind(AssertUnwindSafe(|| unit.run()));
        }
    }
    Ok(registry.len())
}

/// Top-level driver of a stress run.
/// 压力运行的顶层驱动器。
#[derive(Debug)]
pub struct Orchestrator {
    config: StressConfig,
    registry: Registry,
    shutdown: CancellationToken,
}

impl Orchestrator {
    pub fn new(config: StressConfig, registry: Registry) -> Self {
        Self {
            config,
            registry,
            shutdown: CancellationToken::new(),
        }
    }

    /// Uses `token` as an external shutdown signal (e.g. Ctrl-C). Cancelling
    /// it ends the monitoring loop early.
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn config(&self) -> &StressConfig {
        &self.config
    }

    /// Runs the harness and fails if any worker recorded a failure.
    /// 运行测试框架；如有任何工作线程记录了失败，则返回错误。
    pub fn run(&self) -> Result<RunVerdict, StressError> {
        let verdict = self.execute()?;
        if verdict.is_failed() {
            console::print_run_failed(
                verdict.failed_count(),
                verdict.workers.len(),
                &self.config.language,
            );
        } else {
            console::print_run_passed(&self.config.language);
        }
        verdict.into_result()
    }

    /// Runs the harness and returns the verdict whether or not it failed.
    /// Only setup problems are returned as errors.
    ///
    /// 运行测试框架并返回结论，无论是否失败。只有设置问题才会作为错误返回。
    pub fn execute(&self) -> Result<RunVerdict, StressError> {
        let config = &self.config;
        let locale = config.language.as_str();
        config.validate()?;

        console::print_run_banner(locale);

        let matrix = Arc::new(build_matrix(&self.registry, &config.matrix_options())?);
        if matrix.is_empty() {
            return Err(StressError::EmptyMatrix);
        }
        console::print_testlist_size(matrix.len(), locale);

        if config.warmup {
            let kinds = warm_up(&self.registry)?;
            console::print_warmup(kinds, locale);
        } else {
            console::print_warmup_skipped(locale);
        }

        let count = config.worker_count();
        let seed = entropy::resolve_seed(config.seed);
        console::print_seed(seed, locale);
        console::print_spawning(count, locale);

        let mut workers: Vec<Worker> = derive_worker_seeds(seed, count)
            .into_iter()
            .enumerate()
            .map(|(i, worker_seed)| {
                Worker::new(
                    format!("Worker #{}/{}", i + 1, count),
                    worker_seed,
                    Arc::clone(&matrix),
                    config.ignore_test_failures,
                )
            })
            .collect();

        // Dropping `workers` on an early return stops and joins the ones already running.
        for worker in &mut workers {
            worker.start()?;
        }

        let mut budget = TimeBudget::new(config.stress_time());
        budget.start(Duration::ZERO);
        while self.should_monitor(&budget, &workers) {
            thread::sleep(config.poll_interval());
            let counts: Vec<u64> = workers.iter().map(Worker::executed).collect();
            console::print_progress(budget.time_left(), &counts, locale);
        }
        if self.shutdown.is_cancelled() {
            console::print_shutdown_requested(locale);
        }

        for worker in &workers {
            worker.request_stop();
        }
        let mut join_error = None;
        for worker in &mut workers {
            if let Err(e) = worker.join() {
                join_error.get_or_insert(e);
            }
        }
        let elapsed = budget.finish();
        if let Some(e) = join_error {
            return Err(e);
        }

        let reports: Vec<WorkerReport> = workers.iter().map(Worker::report).collect();
        console::print_worker_verdicts(&reports, config.print_stack_trace, locale);

        Ok(RunVerdict {
            seed,
            matrix_size: matrix.len(),
            workers: reports,
            elapsed,
        })
    }

    fn should_monitor(&self, budget: &TimeBudget, workers: &[Worker]) -> bool {
        if !budget.continue_execution() || self.shutdown.is_cancelled() {
            return false;
        }
        if !workers.iter().any(Worker::is_alive) {
            return false;
        }
        self.config.keep_going || !workers.iter().any(Worker::is_failed)
    }
}
