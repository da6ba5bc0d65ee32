//! Canonical vocabulary curation console.

use clap::{ColorChoice, Parser};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;
use vocab_cli::commands::{
    Session, SessionOptions, parse_modifications, run_accept, run_batch, run_convert, run_create,
    run_defer, run_reject, run_report, run_review, run_search, run_variables,
};
use vocab_cli::logging::{LogConfig, LogFormat, init_logging};
use vocab_curate::ReviewFilter;
use vocab_model::CanonicalVariable;

mod cli;
mod summary;

use crate::cli::{Cli, Command, CreateArgs, LogFormatArg, LogLevelArg};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    if let Command::Convert(args) = &cli.command {
        summary::print_conversion(&run_convert(args.value, &args.from, &args.to)?);
        return Ok(0);
    }
    let session = Session::open(&SessionOptions {
        config_path: cli.config,
        registry_dir: cli.registry,
        curator: cli.curator,
    })?;
    match cli.command {
        Command::Review(args) => {
            let filter = ReviewFilter {
                limit: args.limit.or(Some(session.config.curation.review_limit)),
                min_confidence: args.min_confidence,
                domain: args.domain,
            };
            let items = run_review(&session, &filter);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                summary::print_review(&items);
            }
        }
        Command::Accept(args) => {
            let modifications = parse_modifications(&args.modifications)?;
            let action = run_accept(
                &session,
                &args.dataset,
                &args.native_id,
                args.canonical.as_deref(),
                modifications,
            )?;
            summary::print_action(&action);
        }
        Command::Reject(args) => {
            let action = run_reject(&session, &args.dataset, &args.native_id, &args.reason)?;
            summary::print_action(&action);
        }
        Command::Defer(args) => {
            let action = run_defer(&session, &args.dataset, &args.native_id, &args.reason)?;
            summary::print_action(&action);
        }
        Command::Create(args) => {
            let id = args.id.clone();
            run_create(&session, variable_from_args(args))?;
            println!("Created canonical variable {id}.");
        }
        Command::Batch(args) => {
            let outcome = run_batch(&session, args.threshold, args.dry_run)?;
            summary::print_batch(&outcome);
            if outcome.errors > 0 {
                return Ok(1);
            }
        }
        Command::Report(args) => {
            let report = run_report(&session);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                summary::print_report(&report);
            }
        }
        Command::Variables(args) => match args.like {
            Some(query) => summary::print_similar(&query, &run_search(&session, &query, args.limit)),
            None => summary::print_variables(&run_variables(&session, args.domain.as_deref())),
        },
        Command::Convert(_) => {}
    }
    Ok(0)
}

fn variable_from_args(args: CreateArgs) -> CanonicalVariable {
    CanonicalVariable {
        id: args.id,
        label: args.label,
        preferred_unit: args.unit,
        observed_property_uri: args.property_uri,
        unit_uri: args.unit_uri,
        domain: args.domain,
        description: args.description,
        ..CanonicalVariable::default()
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
