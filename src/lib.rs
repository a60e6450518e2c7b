//! # Matrix Stress Library / Matrix Stress 库
//!
//! This library provides the core functionality for Matrix Stress, a
//! concurrent stress harness that repeatedly runs randomly sampled test units
//! from a combinatorial test matrix on several worker threads for a fixed
//! wall-clock budget.
//!
//! 此库为 Matrix Stress 提供核心功能，
//! 这是一个并发压力测试框架：在固定的时间预算内，由多个工作线程
//! 反复运行从组合测试矩阵中随机抽取的测试单元。
//!
//! ## Modules / 模块
//!
//! - `core` - Unit model, matrix planning, workers and the orchestrator
//! - `kinds` - The built-in test kinds
//! - `infra` - Infrastructure services like seed entropy and i18n
//! - `reporting` - Console output
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 单元模型、矩阵规划、工作线程和编排器
//! - `kinds` - 内置测试类型
//! - `infra` - 基础设施服务，如种子熵源和国际化
//! - `reporting` - 控制台输出
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod core;
pub mod infra;
pub mod kinds;
pub mod reporting;

// Re-export commonly used items
pub use crate::core::config;
pub use crate::core::execution;
pub use crate::core::models;
pub use infra::t;

/// Picks the UI language from the system locale.
///
/// It attempts to match the full locale (e.g., "zh-CN"), then just the
/// language code (e.g., "en"), and finally falls back to "en".
pub fn detect_language() -> String {
    let locale = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
    let available_locales = rust_i18n::available_locales!();

    if available_locales.contains(&locale.as_str()) {
        return locale;
    }
    locale
        .split('-')
        .next()
        .filter(|lang_code| available_locales.contains(lang_code))
        .unwrap_or("en")
        .to_string()
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
