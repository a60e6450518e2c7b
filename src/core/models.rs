//! # Data Models Module / 数据模型模块
//!
//! This module defines the core data structures shared by the matrix builder,
//! the workers and the orchestrator: execution modes, flag bits, the per-unit
//! configuration and the [`TestUnit`] capability every test configuration exposes.
//!
//! 此模块定义了矩阵构建器、工作线程和编排器共享的核心数据结构：
//! 执行模式、标志位、单元配置以及每个测试配置都需要提供的 `TestUnit` 能力。

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Strict floating-point access flag (`ACC_STRICT`).
pub const ACC_STRICT: u16 = 0x0800;
/// Synchronized method access flag (`ACC_SYNCHRONIZED`).
pub const ACC_SYNCHRONIZED: u16 = 0x0020;

/// Lowest class-file major version a unit may be configured with.
/// 单元可配置的最低类文件主版本号。
pub const MIN_CLASS_VERSION: u16 = 45;
/// Highest class-file major version; upper bound of the version dimension.
/// 最高类文件主版本号；版本维度的上界。
pub const MAX_CLASS_VERSION: u16 = 52;

/// How a test unit invokes the methods under test.
///
/// `Redefinition` is declared for completeness but no generator supports it,
/// so the matrix builder never uses it.
///
/// 测试单元调用被测方法的方式。
/// `Redefinition` 仅为完整性而声明，没有生成器支持它，因此矩阵构建器从不使用它。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionMode {
    Direct,
    Reflection,
    InvokeExact,
    InvokeGeneric,
    InvokeWithArgs,
    Indy,
    Redefinition,
}

impl ExecutionMode {
    /// Every declared mode, in declaration order.
    pub const ALL: [ExecutionMode; 7] = [
        ExecutionMode::Direct,
        ExecutionMode::Reflection,
        ExecutionMode::InvokeExact,
        ExecutionMode::InvokeGeneric,
        ExecutionMode::InvokeWithArgs,
        ExecutionMode::Indy,
        ExecutionMode::Redefinition,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Direct => "DIRECT",
            ExecutionMode::Reflection => "REFLECTION",
            ExecutionMode::InvokeExact => "INVOKE_EXACT",
            ExecutionMode::InvokeGeneric => "INVOKE_GENERIC",
            ExecutionMode::InvokeWithArgs => "INVOKE_WITH_ARGS",
            ExecutionMode::Indy => "INDY",
            ExecutionMode::Redefinition => "REDEFINITION",
        }
    }

    /// Returns `true` for modes that go through reflective lookup and invocation.
    /// 对于通过反射查找和调用的模式返回 `true`。
    pub fn is_reflection_based(&self) -> bool {
        matches!(self, ExecutionMode::Reflection | ExecutionMode::InvokeWithArgs)
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// The complete, validated configuration of one test unit.
/// Replaces free-form named options with exactly the recognized fields.
///
/// 单个测试单元完整且经过验证的配置。
/// 用明确的字段代替自由格式的命名选项。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitConfig {
    pub mode: ExecutionMode,
    pub version: u16,
    pub flags: u16,
    pub redefine: bool,
    /// Ignore environment/setup failures unrelated to the unit's own assertions.
    /// 忽略与单元自身断言无关的环境或设置失败。
    pub ignore_crashes: bool,
    /// Skip configurations the test kind declares as known failures.
    /// 跳过测试类型声明为已知失败的配置。
    pub ignore_known_failures: bool,
    pub silent: bool,
    /// Stop at the first assertion violation instead of recording it and continuing.
    /// 在第一次断言失败时停止，而不是记录后继续。
    pub fail_fast: bool,
}

impl UnitConfig {
    /// Configuration used for matrix entries: the tuple values plus the fixed
    /// stress policy (ignore crashes and known failures, silent, fail fast).
    ///
    /// 矩阵条目使用的配置：元组值加上固定的压力策略。
    pub fn for_matrix(mode: ExecutionMode, version: u16, flags: u16, redefine: bool) -> Self {
        Self {
            mode,
            version,
            flags,
            redefine,
            ignore_crashes: true,
            ignore_known_failures: true,
            silent: true,
            fail_fast: true,
        }
    }

    /// Configuration used by the sequential warm-up pass.
    /// 顺序预热阶段使用的配置。
    pub fn warmup() -> Self {
        Self {
            silent: true,
            ignore_known_failures: true,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(MIN_CLASS_VERSION..=MAX_CLASS_VERSION).contains(&self.version) {
            return Err(format!(
                "class file version {} is outside of {}..={}",
                self.version, MIN_CLASS_VERSION, MAX_CLASS_VERSION
            ));
        }
        if self.flags & !(ACC_STRICT | ACC_SYNCHRONIZED) != 0 {
            return Err(format!("unsupported flag bits {:#06x}", self.flags));
        }
        if self.mode == ExecutionMode::Redefinition {
            return Err("execution mode REDEFINITION is not supported".to_string());
        }
        Ok(())
    }
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Direct,
            version: MAX_CLASS_VERSION,
            flags: 0,
            redefine: false,
            ignore_crashes: false,
            ignore_known_failures: false,
            silent: false,
            fail_fast: false,
        }
    }
}

impl fmt::Display for UnitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mode={} ver={} flags={:#06x} redefine={}",
            self.mode, self.version, self.flags, self.redefine
        )
    }
}

/// Ways a single execution of a test unit can fail.
/// 测试单元单次执行可能失败的方式。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    /// The unit's own check did not hold.
    #[error("assertion failed: {0}")]
    Assertion(String),
    /// Setup or environment trouble unrelated to the assertion itself.
    #[error("environment failure: {0}")]
    Environment(String),
    /// A configuration the test kind declares as known to fail.
    #[error("known failure: {0}")]
    KnownFailure(String),
    /// The unit panicked while running.
    #[error("panicked: {0}")]
    Panic(String),
    /// `run` returned normally but the unit reports itself as failed.
    #[error("test reported failure: {0}")]
    Reported(String),
}

/// One runnable, stateful test configuration.
///
/// Units are shared by every worker for the whole run, so `run` must be safe
/// to call concurrently; the harness adds no locking of its own.
///
/// 一个可运行的、有状态的测试配置。
/// 单元在整个运行期间由所有工作线程共享，因此 `run` 必须可以并发调用；框架本身不加锁。
pub trait TestUnit: Send + Sync + fmt::Display {
    /// Name of the test kind this unit was instantiated from.
    fn kind(&self) -> &'static str;

    fn config(&self) -> &UnitConfig;

    /// Executes the configuration once.
    fn run(&self) -> Result<(), UnitError>;

    /// Post-hoc failure query; may report `true` after a nominally successful `run`.
    fn is_failed(&self) -> bool;
}
