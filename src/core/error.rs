//! # Error Module / 错误模块
//!
//! Harness-level errors. Failures of individual test units are modelled by
//! [`UnitError`](crate::core::models::UnitError) and only surface here once they
//! have been aggregated across workers.
//!
//! 测试框架级别的错误。单个测试单元的失败由 `UnitError` 表示，
//! 只有在跨工作线程汇总后才会在此处体现。

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort or fail a whole stress run.
/// 中止或使整个压力运行失败的错误。
#[derive(Debug, Error)]
pub enum StressError {
    /// A test kind could not be instantiated for some configuration tuple.
    /// This is fatal during both matrix building and warm-up.
    /// 某个测试类型无法针对某个配置元组实例化。在矩阵构建和预热阶段均为致命错误。
    #[error("failed to instantiate test kind '{kind}': {reason}")]
    Setup { kind: String, reason: String },

    /// A configuration value is outside of its accepted range.
    /// 配置值超出了允许的范围。
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration file could not be read or parsed.
    /// 无法读取或解析配置文件。
    #[error("failed to load configuration from {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    /// Every combination was excluded, leaving nothing to sample from.
    /// 所有组合都被排除，没有可供采样的测试。
    #[error("the test matrix is empty")]
    EmptyMatrix,

    /// The OS refused to spawn a worker thread.
    /// 操作系统拒绝创建工作线程。
    #[error("failed to spawn worker '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },

    /// A worker thread panicked outside of a test unit's `run`.
    /// 工作线程在测试单元的 `run` 之外发生了 panic。
    #[error("worker '{0}' panicked outside of a test unit")]
    WorkerPanicked(String),

    /// One or more workers recorded an unignored test failure.
    /// 一个或多个工作线程记录了未被忽略的测试失败。
    #[error("some of the worker threads failed ({failed} of {total})")]
    WorkersFailed { failed: usize, total: usize },
}

impl StressError {
    pub fn setup(kind: impl Into<String>, reason: impl ToString) -> Self {
        StressError::Setup {
            kind: kind.into(),
            reason: reason.to_string(),
        }
    }
}
