//! # Reporting Module / 报告模块
//!
//! This module handles everything a stress run prints to the console:
//! progress lines, per-worker verdicts and the matrix listing, with
//! internationalization support.
//!
//! 此模块处理压力运行打印到控制台的所有内容：
//! 进度行、每个工作线程的结论以及矩阵列表，支持国际化。

pub mod console;

pub use console::{print_matrix_listing, print_worker_verdicts};
