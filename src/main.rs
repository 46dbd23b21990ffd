use chrono::Local;
use std::panic::{self, AssertUnwindSafe};

use usage_statusline::cache::{
    FileStore, PercentCache, PercentageCache, SystemClock, default_cache_path,
};
use usage_statusline::cli::Args;
use usage_statusline::config::Config;
use usage_statusline::display::{color_enabled, dimmed};
use usage_statusline::error::{Recovery, StatuslineError};
use usage_statusline::input::read_payload;
use usage_statusline::status::{StatusContext, StatusReport, build_status};
use usage_statusline::utils::{claude_paths, terminal_width};

fn run(args: &Args) -> Result<StatusReport, StatuslineError> {
    let stdin = read_payload(std::io::stdin().lock())?;

    let mut startup_notes = Vec::new();
    let mut config = match Config::load(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            let err = StatuslineError::environment("config", format!("{e:#}"));
            startup_notes.push(err.to_string());
            Config::default()
        }
    };
    config.apply_args(args);

    let cache = if args.no_cache || config.cache_ttl_secs <= 0 {
        None
    } else {
        config
            .cache_path
            .clone()
            .or_else(default_cache_path)
            .map(|p| PercentCache::new(SystemClock, FileStore::new(p), config.cache_ttl_secs))
    };

    let width = args
        .width
        .filter(|w| *w > 0)
        .unwrap_or_else(|| terminal_width(config.bar.fallback_width));
    let ctx = StatusContext {
        claude_dirs: claude_paths(args.claude_config_dir.as_deref()),
        terminal_width: width,
        color: color_enabled(args.no_color),
        config,
    };

    let mut report = build_status(
        &stdin,
        &ctx,
        Local::now(),
        cache.as_ref().map(|c| c as &dyn PercentageCache),
    );
    startup_notes.append(&mut report.recovered);
    report.recovered = startup_notes;
    Ok(report)
}

fn print_debug(report: &StatusReport) {
    eprintln!();
    eprintln!("{}", dimmed("=== Debug Information ==="));
    eprintln!("Source: {}", report.source);
    eprintln!(
        "Tokens: input={} output={} cache_create={} cache_read={} (counted={})",
        report.snapshot.input_tokens,
        report.snapshot.output_tokens,
        report.snapshot.cache_creation_tokens,
        report.snapshot.cache_read_tokens,
        report.snapshot.total()
    );
    eprintln!("Limit: {} tokens, plan: {}", report.limit, report.plan);
    eprintln!("Percentage: {:?}", report.percentage);
    eprintln!(
        "Reset: {}",
        report
            .reset
            .map(|r| r.format("%Y-%m-%d %H:%M %Z").to_string())
            .unwrap_or_else(|| "unknown".to_string())
    );
    if let Some(ref p) = report.log_path {
        eprintln!("Log: {}", p.display());
    }
    for note in &report.recovered {
        eprintln!("Recovered: {note}");
    }
    eprintln!("{}", dimmed("========================="));
}

fn main() {
    let args = Args::parse_lenient();
    if !args.debug {
        // keep panics off the terminal; they still become a status line below
        panic::set_hook(Box::new(|_| {}));
    }

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| run(&args)))
        .unwrap_or_else(|payload| Err(StatuslineError::from_panic(payload)));

    match outcome {
        Ok(report) => {
            if !report.line.is_empty() {
                println!("{}", report.line);
            }
            if args.debug {
                print_debug(&report);
            }
        }
        Err(err) => {
            if args.debug {
                eprintln!("{} {err}", dimmed("error:"));
            }
            if let Recovery::StatusLine(line) = err.recovery() {
                println!("{line}");
            }
        }
    }
}
