// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod demo;
mod runtime;

use anyhow::{Context, Result, anyhow, bail};
use config::Config;
use runtime::DbRuntime;
use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tally_app::{AppState, validate_account};
use tally_db::Store;
use tally_tui::UiOptions;
use time::OffsetDateTime;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `tally --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let db_path = if options.demo {
        PathBuf::from(":memory:")
    } else {
        config.db_path()?
    };
    if options.print_db_path {
        println!("{}", db_path.display());
        return Ok(());
    }

    init_logging(&config)?;

    let store = Store::open(&db_path).with_context(|| {
        format!(
            "open database {} -- if this path is wrong, set [storage].db_path or TALLY_DB_PATH",
            db_path.display()
        )
    })?;
    store.bootstrap()?;
    store.prune_logs(OffsetDateTime::now_utc())?;

    let mut operator = config.operator().map(str::to_owned);
    if options.demo {
        let ledger = demo::seed_demo_data(&store)?;
        operator = Some(ledger.operator);
    }

    let target = options
        .target
        .clone()
        .or_else(|| config.target_account().map(str::to_owned));
    check_accounts(&store, target.as_deref(), operator.as_deref())?;

    let ui_options = UiOptions {
        query_debounce: config.query_debounce()?,
        display_offset: config.display_offset()?,
    };
    if options.check_only {
        return Ok(());
    }

    info!(
        db = %db_path.display(),
        target = target.as_deref().unwrap_or("all"),
        operator = operator.as_deref().unwrap_or("none"),
        "starting tally"
    );
    let mut state = AppState::with_view(config.default_view()?);
    let mut runtime = DbRuntime::new(&store)
        .with_target(target)
        .with_operator(operator);
    tally_tui::run_app(&mut state, &mut runtime, ui_options)
}

/// Record changes are an admin action, so the operator must hold admin.
fn check_accounts(store: &Store, target: Option<&str>, operator: Option<&str>) -> Result<()> {
    if let Some(account) = target
        && !store.user_exists(account)?
    {
        bail!("target account {account} is not registered; fix --target or [ui].target_account");
    }
    if let Some(account) = operator {
        if !store.user_exists(account)? {
            bail!(
                "operator account {account} is not registered; set [ui].operator to a registered account"
            );
        }
        if !store.is_admin(account)? {
            bail!(
                "operator account {account} is not an admin; set [ui].operator to an admin account"
            );
        }
    }
    Ok(())
}

/// Logs go to a file since the TUI owns the terminal. `RUST_LOG` overrides
/// `[log].level`.
fn init_logging(config: &Config) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().ok();
    if env_filter.is_none() && !config.logging_enabled() {
        return Ok(());
    }
    let filter = match env_filter {
        Some(filter) => filter,
        None => EnvFilter::try_new(config.log_level())
            .with_context(|| format!("invalid [log].level {:?}", config.log_level()))?,
    };

    let path = config.log_file()?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| {
            format!(
                "open log file {}; set [log].file to a writable path",
                path.display()
            )
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_db_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
    target: Option<String>,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_db_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
        target: None,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--target" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--target requires an account"))?;
                let account = value.as_ref().trim();
                validate_account(account)
                    .map_err(|error| anyhow!("--target account {error}, got {account:?}"))?;
                options.target = Some(account.to_owned());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_db_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("tally");
    println!("  --config <path>          Use a specific config path");
    println!("  --target <account>       Show only this account's entries");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved database path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Launch with seeded demo data (in-memory)");
    println!("  --check                  Validate config + DB + accounts, then exit");
    println!("  --help                   Show this help");
}
