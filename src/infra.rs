//! # Infrastructure Module / 基础设施模块
//!
//! This module provides infrastructure services for Matrix Stress,
//! such as the default seed entropy source and i18n support.
//!
//! 此模块为 Matrix Stress 提供基础设施服务，
//! 例如默认种子熵源和国际化支持。

pub mod entropy;

// Re-export i18n functions for easier access
pub use rust_i18n::t;
