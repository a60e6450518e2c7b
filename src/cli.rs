// src/cli.rs
use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::{env, path::PathBuf};

use crate::infra::entropy::parse_seed;
use crate::t;

pub mod commands;

/// Pre-parses the command line arguments to find the language setting.
/// This allows i18n to be initialized before the full CLI is built.
/// It looks for a `--lang <VALUE>` argument.
fn pre_parse_language() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    if let Some(pos) = args.iter().position(|arg| arg == "--lang") {
        if let Some(lang) = args.get(pos + 1) {
            return Some(lang.clone());
        }
    }
    args.iter()
        .find_map(|arg| arg.strip_prefix("--lang="))
        .map(str::to_string)
}

/// Accepts the same unsigned or signed forms as `MATRIX_STRESS_SEED`.
fn seed_value(raw: &str) -> Result<u64, String> {
    parse_seed(raw).ok_or_else(|| format!("'{raw}' is not a 64-bit integer"))
}

fn version_arg(locale: &str) -> Arg {
    Arg::new("ver")
        .long("ver")
        .help(t!("arg_ver", locale = locale).to_string())
        .value_name("VERSION")
        .value_parser(clap::value_parser!(u16))
        .action(ArgAction::Set)
}

fn redefine_arg(locale: &str) -> Arg {
    Arg::new("redefine")
        .long("redefine")
        .help(t!("arg_redefine", locale = locale).to_string())
        .action(ArgAction::SetTrue)
}

pub fn build_cli(locale: &str) -> Command {
    Command::new("matrix-stress")
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli_about", locale = locale).to_string())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli_lang", locale = locale).to_string())
                .value_name("LANGUAGE")
                .global(true)
                .action(ArgAction::Set),
        )
        .subcommand(
            Command::new("run")
                .about(t!("cmd_run_about", locale = locale).to_string())
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .help(t!("arg_config", locale = locale).to_string())
                        .value_name("CONFIG")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .help(t!("arg_seed", locale = locale).to_string())
                        .value_name("SEED")
                        .allow_negative_numbers(true)
                        .value_parser(seed_value)
                        .action(ArgAction::Set),
                )
                .arg(redefine_arg(locale))
                .arg(version_arg(locale))
                .arg(
                    Arg::new("ignore-test-failures")
                        .long("ignore-test-failures")
                        .help(t!("arg_ignore_test_failures", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("threads-factor")
                        .short('t')
                        .long("threads-factor")
                        .help(t!("arg_threads_factor", locale = locale).to_string())
                        .value_name("FACTOR")
                        .value_parser(clap::value_parser!(usize))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("time")
                        .long("time")
                        .help(t!("arg_time", locale = locale).to_string())
                        .value_name("SECONDS")
                        .value_parser(clap::value_parser!(u64))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("poll-interval-ms")
                        .long("poll-interval-ms")
                        .help(t!("arg_poll_interval", locale = locale).to_string())
                        .value_name("MILLIS")
                        .value_parser(clap::value_parser!(u64))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("no-warmup")
                        .long("no-warmup")
                        .help(t!("arg_no_warmup", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("print-stack-trace")
                        .long("print-stack-trace")
                        .help(t!("arg_print_stack_trace", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("keep-going")
                        .long("keep-going")
                        .help(t!("arg_keep_going", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("list")
                .about(t!("cmd_list_about", locale = locale).to_string())
                .arg(redefine_arg(locale))
                .arg(version_arg(locale))
                .arg(
                    Arg::new("kind")
                        .long("kind")
                        .help(t!("arg_kind", locale = locale).to_string())
                        .value_name("NAME")
                        .action(ArgAction::Set),
                ),
        )
}

/// Command line overrides for `run`. Unset options leave the configuration untouched.
/// `run` 的命令行覆盖项。未设置的选项不改变配置。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunArgs {
    pub config: Option<PathBuf>,
    pub language: Option<String>,
    pub seed: Option<u64>,
    pub redefine: bool,
    pub min_version: Option<u16>,
    pub ignore_test_failures: bool,
    pub threads_factor: Option<usize>,
    pub stress_time_secs: Option<u64>,
    pub poll_interval_ms: Option<u64>,
    pub no_warmup: bool,
    pub print_stack_trace: bool,
    pub keep_going: bool,
}

impl RunArgs {
    fn from_matches(matches: &ArgMatches, language: Option<String>) -> Self {
        Self {
            config: matches.get_one::<PathBuf>("config").cloned(),
            language,
            seed: matches.get_one::<u64>("seed").copied(),
            redefine: matches.get_flag("redefine"),
            min_version: matches.get_one::<u16>("ver").copied(),
            ignore_test_failures: matches.get_flag("ignore-test-failures"),
            threads_factor: matches.get_one::<usize>("threads-factor").copied(),
            stress_time_secs: matches.get_one::<u64>("time").copied(),
            poll_interval_ms: matches.get_one::<u64>("poll-interval-ms").copied(),
            no_warmup: matches.get_flag("no-warmup"),
            print_stack_trace: matches.get_flag("print-stack-trace"),
            keep_going: matches.get_flag("keep-going"),
        }
    }
}

pub async fn run() -> Result<()> {
    // Pre-parse language and initialize i18n first.
    let explicit_language = pre_parse_language();
    let language = explicit_language
        .clone()
        .unwrap_or_else(crate::detect_language);
    rust_i18n::set_locale(&language);

    let matches = build_cli(&language).get_matches();

    match matches.subcommand() {
        Some(("run", run_matches)) => {
            let args = RunArgs::from_matches(run_matches, explicit_language);
            commands::run::execute(args, &language).await?;
        }
        Some(("list", list_matches)) => {
            let min_version = list_matches.get_one::<u16>("ver").copied();
            let redefine = list_matches.get_flag("redefine");
            let kind = list_matches.get_one::<String>("kind").map(String::as_str);
            commands::list::execute(min_version, redefine, kind, &language)?;
        }
        _ => {
            // `subcommand_required` makes clap print help and exit first.
        }
    }
    Ok(())
}
