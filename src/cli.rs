//! CLI definition and dispatch.

use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use crate::adapters::csv_store::{CsvCacheAdapter, CsvResultAdapter};
use crate::adapters::eastmoney::EastmoneyAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::error::ScreenError;
use crate::domain::fetcher::FetchConfig;
use crate::domain::filter;
use crate::domain::pipeline::{self, ScreenConfig};
use crate::domain::table::{Table, Value};
use crate::domain::universe::{self, UniverseConfig};
use crate::ports::config_port::ConfigPort;

#[derive(Parser, Debug)]
#[command(name = "fundscreen", about = "Fundamentals-based equity screener")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the full screen and persist the result
    Screen {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Result file path (overrides [output] result_path)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Ignore a same-day cache and fetch fresh
        #[arg(long)]
        refresh: bool,
        /// Keep only the top K scored instruments
        #[arg(long)]
        top: Option<usize>,
        /// Validate configuration and show the predicate set without fetching
        #[arg(long)]
        dry_run: bool,
    },
    /// Fetch (or read cached) universe and print a preview
    Universe {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        refresh: bool,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Screen {
            config,
            output,
            refresh,
            top,
            dry_run,
        } => run_screen(config.as_ref(), output, refresh, top, dry_run),
        Command::Universe { config, refresh } => run_universe(config.as_ref(), refresh),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, ExitCode> {
    match path {
        Some(p) => {
            eprintln!("Loading config from {}", p.display());
            FileConfigAdapter::from_file(p).map_err(|e| {
                let err = ScreenError::ConfigParse {
                    file: p.display().to_string(),
                    reason: e.to_string(),
                };
                eprintln!("error: {err}");
                ExitCode::from(&err)
            })
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

pub fn build_screen_config(
    adapter: &dyn ConfigPort,
    output_override: Option<PathBuf>,
    top_override: Option<usize>,
    refresh: bool,
) -> ScreenConfig {
    let mut exclude_patterns = adapter.get_list("universe", "exclude_patterns");
    if exclude_patterns.is_empty() {
        exclude_patterns = UniverseConfig::default().exclude_patterns;
    }

    let universe = UniverseConfig {
        exclude_patterns,
        cache_path: adapter
            .get_string("universe", "cache_path")
            .map(PathBuf::from)
            .unwrap_or(UniverseConfig::default().cache_path),
    };

    let fetch = FetchConfig {
        batch_size: adapter.get_int("fetch", "batch_size", 50).max(1) as usize,
        delay: Duration::from_millis(adapter.get_int("fetch", "delay_ms", 300).max(0) as u64),
        start_year: adapter.get_int("fetch", "start_year", 2025) as i32,
    };

    let predicates = filter::standard_predicates(
        adapter.get_double("filter", "market_cap_floor", 1e9),
        adapter.get_bool("filter", "require_dividend", false),
    );

    let top_k = top_override.or_else(|| {
        let k = adapter.get_int("output", "top_k", 0);
        (k > 0).then_some(k as usize)
    });

    let result_path = output_override.unwrap_or_else(|| {
        adapter
            .get_string("output", "result_path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("screen_results.csv"))
    });

    ScreenConfig {
        universe,
        fetch,
        predicates,
        top_k,
        result_path,
        refresh,
    }
}

fn run_screen(
    config_path: Option<&PathBuf>,
    output: Option<PathBuf>,
    refresh: bool,
    top: Option<usize>,
    dry_run: bool,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let config = build_screen_config(&adapter, output, top, refresh);

    if dry_run {
        eprintln!("Universe cache: {}", config.universe.cache_path.display());
        eprintln!(
            "Exclusion patterns: {}",
            config.universe.exclude_patterns.join(", ")
        );
        eprintln!(
            "Fetch: batch_size={} delay={}ms start_year={}",
            config.fetch.batch_size,
            config.fetch.delay.as_millis(),
            config.fetch.start_year
        );
        eprintln!("Predicates:");
        for p in &config.predicates {
            let min = p
                .min
                .map(|b| format!("{}{}", if b.inclusive { ">=" } else { ">" }, b.value))
                .unwrap_or_default();
            let max = p
                .max
                .map(|b| format!("{}{}", if b.inclusive { "<=" } else { "<" }, b.value))
                .unwrap_or_default();
            eprintln!("  {}: {} {} {}", p.name, p.field, min, max);
        }
        eprintln!("Result path: {}", config.result_path.display());
        eprintln!("\nDry run complete: configuration is valid");
        return ExitCode::SUCCESS;
    }

    let market = match EastmoneyAdapter::new() {
        Ok(m) => m,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    let today = Local::now().date_naive();
    match pipeline::run_screen(&market, &CsvCacheAdapter, &CsvResultAdapter, &config, today) {
        Ok(summary) => {
            eprintln!(
                "\nScreened {} instruments ({}), {} survived",
                summary.universe_count,
                if summary.enriched {
                    "enriched"
                } else {
                    "basic fields only"
                },
                summary.survivor_count
            );
            print_preview(&summary.result, 10);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

fn run_universe(config_path: Option<&PathBuf>, refresh: bool) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let config = build_screen_config(&adapter, None, None, refresh);

    let market = match EastmoneyAdapter::new() {
        Ok(m) => m,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    let today = Local::now().date_naive();
    match universe::load_universe(&market, &CsvCacheAdapter, &config.universe, today, refresh) {
        Ok(table) => {
            eprintln!("{} instruments in universe", table.len());
            print_preview(&table, 20);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

fn print_preview(table: &Table, limit: usize) {
    if table.is_empty() {
        return;
    }
    println!("{}", table.columns().join(","));
    for row in table.rows().iter().take(limit) {
        let line: Vec<String> = row
            .iter()
            .map(|v| match v {
                Value::Text(s) => s.clone(),
                Value::Number(n) => format!("{n:.2}"),
                Value::Missing => String::new(),
            })
            .collect();
        println!("{}", line.join(","));
    }
    if table.len() > limit {
        println!("... {} more rows", table.len() - limit);
    }
}
