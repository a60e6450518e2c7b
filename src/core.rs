//! # Core Module / 核心模块
//!
//! This module contains the core functionality of Matrix Stress:
//! the unit model, the kind registry, matrix planning, the time budget,
//! the workers and the orchestrator that ties them together.
//!
//! 此模块包含 Matrix Stress 的核心功能：
//! 单元模型、类型注册表、矩阵规划、时间预算、工作线程以及将它们组合起来的编排器。

pub mod budget;
pub mod config;
pub mod error;
pub mod execution;
pub mod models;
pub mod planner;
pub mod registry;
pub mod worker;

// Re-exports
pub use config::StressConfig;
pub use error::StressError;
pub use execution::{Orchestrator, RunVerdict};
pub use models::{ExecutionMode, TestUnit, UnitConfig, UnitError};
pub use planner::{MatrixOptions, TestMatrix, build_matrix};
pub use registry::{Registry, TestKind};
