//! # Configuration Module / 配置模块
//!
//! Run configuration, loaded from an optional TOML file and overridden from the
//! command line. Every field has a default so an empty file is a valid config.
//!
//! 运行配置，从可选的 TOML 文件加载并可由命令行覆盖。
//! 每个字段都有默认值，因此空文件也是有效配置。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::core::error::StressError;
use crate::core::models::{ExecutionMode, MAX_CLASS_VERSION, MIN_CLASS_VERSION};
use crate::core::planner::{DEFAULT_MIN_VERSION, MatrixOptions};

/// Worker count used when the threads factor is exactly 1.
pub const DEFAULT_WORKER_FANOUT: usize = 5;

/// The entire stress run configuration.
/// 整个压力运行的配置。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StressConfig {
    /// The language for the runner's output messages (e.g., "en", "zh-CN").
    /// 运行器输出消息的语言（例如 "en", "zh-CN"）。
    pub language: String,

    /// Master seed. `0` means "take the default entropy source".
    /// 主种子。`0` 表示使用默认熵源。
    pub seed: u64,

    /// Include scenarios with class redefinition.
    /// 包含类重定义场景。
    pub redefine: bool,

    /// Minimum class file version used in the tests.
    /// 测试中使用的最低类文件版本。
    pub min_version: u16,

    /// Keep going when a test fails instead of stopping the worker.
    /// 测试失败时继续运行，而不是停止工作线程。
    pub ignore_test_failures: bool,

    pub threads_factor: usize,

    /// Wall-clock budget for the whole run, in seconds.
    /// 整个运行的时间预算（秒）。
    pub stress_time_secs: u64,

    /// Interval between progress lines, in milliseconds.
    pub poll_interval_ms: u64,

    /// Run every test kind once, sequentially, before the workers start.
    /// 在工作线程启动之前，顺序运行每个测试类型一次。
    pub warmup: bool,

    /// Print the full failure cause of each failed worker.
    pub print_stack_trace: bool,

    /// Keep monitoring while other workers are alive after one has failed.
    /// 某个工作线程失败后，只要仍有其他工作线程存活就继续监控。
    pub keep_going: bool,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            seed: 0,
            redefine: false,
            min_version: DEFAULT_MIN_VERSION,
            ignore_test_failures: false,
            threads_factor: 1,
            stress_time_secs: 60,
            poll_interval_ms: 1000,
            warmup: true,
            print_stack_trace: false,
            keep_going: false,
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

impl StressConfig {
    /// Reads and validates a TOML configuration file.
    /// 读取并验证 TOML 配置文件。
    pub fn load(path: &Path) -> Result<Self, StressError> {
        let content = fs::read_to_string(path).map_err(|e| StressError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config: StressConfig = toml::from_str(&content).map_err(|e| StressError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), StressError> {
        if self.threads_factor == 0 {
            return Err(StressError::InvalidConfig(
                "threads factor must be at least 1".to_string(),
            ));
        }
        if !(MIN_CLASS_VERSION..=MAX_CLASS_VERSION).contains(&self.min_version) {
            return Err(StressError::InvalidConfig(format!(
                "minimum class file version {} must be within {}..={}",
                self.min_version, MIN_CLASS_VERSION, MAX_CLASS_VERSION
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(StressError::InvalidConfig(
                "poll interval must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of workers to spawn. A factor of exactly 1 keeps the historical
    /// default fan-out of five workers.
    ///
    /// 要创建的工作线程数。因子恰好为 1 时保留历史默认值：五个工作线程。
    pub fn worker_count(&self) -> usize {
        if self.threads_factor == 1 {
            DEFAULT_WORKER_FANOUT
        } else {
            self.threads_factor
        }
    }

    pub fn stress_time(&self) -> Duration {
        Duration::from_secs(self.stress_time_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn matrix_options(&self) -> MatrixOptions {
        MatrixOptions {
            min_version: self.min_version,
            redefine: self.redefine,
            modes: ExecutionMode::ALL.to_vec(),
        }
    }
}
