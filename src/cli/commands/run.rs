//! # Run Command Module / 运行命令模块
//!
//! This module implements the `run` command of the Matrix Stress CLI, which
//! builds the test matrix and drives the workers for the configured time budget.
//!
//! 此模块实现了 Matrix Stress CLI 的 `run` 命令，
//! 它构建测试矩阵并在配置的时间预算内驱动工作线程。

use anyhow::{Context, Result};
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::{
    cli::RunArgs,
    core::{config::StressConfig, execution::Orchestrator},
    infra::t,
    kinds,
};

/// Executes the run command with the provided arguments.
///
/// # Arguments
/// * `args` - Command line overrides
/// * `language` - Language used when neither `--lang` nor the config file names one
///
/// # Returns
/// An error if setup fails or any worker recorded a failure
pub async fn execute(args: RunArgs, language: &str) -> Result<()> {
    let config = resolve_config(&args, language)?;
    rust_i18n::set_locale(&config.language);

    let stop_token = setup_signal_handler();
    let orchestrator = Orchestrator::new(config, kinds::registry()).with_shutdown(stop_token);

    // Workers are plain threads and the monitor sleeps, so keep it off the async executor.
    tokio::task::spawn_blocking(move || orchestrator.run())
        .await
        .context("stress orchestrator task panicked")??;
    Ok(())
}

/// Loads the optional config file, then applies every command line override on top.
/// 加载可选的配置文件，然后在其上应用所有命令行覆盖项。
pub fn resolve_config(args: &RunArgs, language: &str) -> Result<StressConfig> {
    let mut config = match &args.config {
        Some(path) => {
            println!(
                "{}",
                t!("loading_config", locale = language, path = path.display())
            );
            StressConfig::load(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?
        }
        None => StressConfig {
            language: language.to_string(),
            ..StressConfig::default()
        },
    };

    apply_overrides(&mut config, args);
    config.validate().context("invalid run configuration")?;
    Ok(config)
}

pub fn apply_overrides(config: &mut StressConfig, args: &RunArgs) {
    if let Some(language) = &args.language {
        config.language = language.clone();
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(min_version) = args.min_version {
        config.min_version = min_version;
    }
    if let Some(factor) = args.threads_factor {
        config.threads_factor = factor;
    }
    if let Some(secs) = args.stress_time_secs {
        config.stress_time_secs = secs;
    }
    if let Some(ms) = args.poll_interval_ms {
        config.poll_interval_ms = ms;
    }
    config.redefine |= args.redefine;
    config.ignore_test_failures |= args.ignore_test_failures;
    config.print_stack_trace |= args.print_stack_trace;
    config.keep_going |= args.keep_going;
    if args.no_warmup {
        config.warmup = false;
    }
}

/// Sets up a handler for Ctrl+C that cancels the returned token.
/// The orchestrator reports the shutdown once its monitor loop notices it.
fn setup_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            token_clone.cancel();
        }
    });

    token
}
