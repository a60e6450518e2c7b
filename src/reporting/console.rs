//! # Console Reporting Module / 控制台报告模块
//!
//! This module prints everything a stress run reports on stdout: the matrix
//! size, the seed, the spawn count, periodic progress lines and the final
//! per-worker verdicts. Messages are localized and colored.
//!
//! 此模块在标准输出上打印压力运行报告的所有内容：矩阵大小、种子、工作线程数量、
//! 周期性进度行以及每个工作线程的最终结论。消息支持国际化和彩色显示。

use colored::*;
use std::time::Duration;

use crate::core::planner::Combination;
use crate::core::worker::WorkerReport;
use crate::infra::t;

/// Prints the banner shown when a run starts.
/// 打印运行开始时显示的横幅。
pub fn print_run_banner(locale: &str) {
    let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    println!(
        "{}",
        t!("run_banner", locale = locale, time = now).bold()
    );
}

pub fn print_testlist_size(size: usize, locale: &str) {
    println!("{}", t!("testlist_size", locale = locale, size = size));
}

pub fn print_seed(seed: u64, locale: &str) {
    println!("{}", t!("seed", locale = locale, seed = seed).cyan());
}

pub fn print_warmup(kinds: usize, locale: &str) {
    println!("{}", t!("warmup_done", locale = locale, count = kinds).dimmed());
}

pub fn print_warmup_skipped(locale: &str) {
    println!("{}", t!("warmup_skipped", locale = locale).yellow());
}

pub fn print_spawning(count: usize, locale: &str) {
    println!("{}", t!("spawning_workers", locale = locale, count = count));
}

/// Prints one progress line: the seconds left and every worker's executed count.
///
/// ```text
/// 42s left: [1200, 1185, 1233, 1190, 1201]
/// ```
pub fn print_progress(time_left: Duration, counts: &[u64], locale: &str) {
    println!(
        "{}",
        t!(
            "progress",
            locale = locale,
            secs = time_left.as_secs(),
            counts = format_counts(counts)
        )
    );
}

pub fn format_counts(counts: &[u64]) -> String {
    let joined = counts
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{joined}]")
}

pub fn print_shutdown_requested(locale: &str) {
    println!("\n{}", t!("shutdown_signal", locale = locale).yellow());
}

/// Prints the final verdict line for every worker, and the failure cause of
/// failed workers when `details` is set.
///
/// 为每个工作线程打印最终结论；当 `details` 为真时，还会打印失败原因。
///
/// ```text
/// Worker #1/5: PASSED (executed: 5120)
/// Worker #2/5: FAILED: SuperCall[mode=DIRECT ver=52 flags=0x0000 redefine=false] (executed: 311)
/// ```
pub fn print_worker_verdicts(reports: &[WorkerReport], details: bool, locale: &str) {
    println!("\n{}", t!("summary_banner", locale = locale).bold());

    for report in reports {
        match &report.failure {
            None => println!(
                "{}",
                t!(
                    "worker_passed",
                    locale = locale,
                    name = report.name,
                    executed = report.executed
                )
                .green()
            ),
            Some(failure) => {
                println!(
                    "{}",
                    t!(
                        "worker_failed",
                        locale = locale,
                        name = report.name,
                        test = failure.test,
                        executed = report.executed
                    )
                    .red()
                );
                if details {
                    println!("{}", "-".repeat(80));
                    println!(
                        "{}",
                        t!(
                            "failure_detail",
                            locale = locale,
                            index = failure.index,
                            seed = report.seed
                        )
                        .yellow()
                    );
                    println!("{}", failure.cause);
                    println!("{}", "-".repeat(80));
                }
            }
        }
    }
}

pub fn print_run_passed(locale: &str) {
    println!("\n{}", t!("all_workers_passed", locale = locale).green().bold());
}

pub fn print_run_failed(failed: usize, total: usize, locale: &str) {
    println!(
        "\n{}",
        t!("some_workers_failed", locale = locale, failed = failed, total = total)
            .red()
            .bold()
    );
}

/// Prints the matrix listing produced by the `list` command.
/// 打印 `list` 命令生成的矩阵列表。
pub fn print_matrix_listing(combinations: &[Combination<'_>], upper_bound: usize, locale: &str) {
    for (index, c) in combinations.iter().enumerate() {
        println!(
            "{:>6}  {:<20} {:<17} ver={} flags={:#06x} redefine={}",
            index,
            c.kind.name.cyan(),
            c.mode,
            c.version,
            c.flags,
            c.redefine
        );
    }
    println!(
        "\n{}",
        t!(
            "listing_summary",
            locale = locale,
            size = combinations.len(),
            excluded = upper_bound - combinations.len()
        )
        .bold()
    );
}
