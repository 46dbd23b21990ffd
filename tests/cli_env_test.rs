use clap::Parser;
use serial_test::serial;

use usage_statusline::cli::{Args, LayoutArg, ResetModeArg};
use usage_statusline::config::{Config, ResetMode};
use usage_statusline::display::color_enabled;
use usage_statusline::models::ModelInfo;

fn sonnet_45() -> ModelInfo {
    ModelInfo {
        id: "claude-sonnet-4-5".into(),
        display_name: "Sonnet 4.5".into(),
    }
}

#[test]
#[serial]
fn context_limit_env_overrides_the_model_table() {
    unsafe { std::env::set_var("CLAUDE_CONTEXT_LIMIT", "400000") };
    let args = Args::try_parse_from(["usage-statusline"]).unwrap();
    unsafe { std::env::remove_var("CLAUDE_CONTEXT_LIMIT") };

    assert_eq!(args.context_limit, Some(400_000));
    let mut config = Config::default();
    config.apply_args(&args);
    assert_eq!(config.limit_for(Some(&sonnet_45())), 400_000);
    assert_eq!(config.limit_for(None), 400_000);
}

#[test]
#[serial]
fn flag_beats_env() {
    unsafe { std::env::set_var("CLAUDE_CONTEXT_LIMIT", "400000") };
    let args =
        Args::try_parse_from(["usage-statusline", "--context-limit", "150000"]).unwrap();
    unsafe { std::env::remove_var("CLAUDE_CONTEXT_LIMIT") };
    assert_eq!(args.context_limit, Some(150_000));
}

#[test]
#[serial]
fn bad_context_limit_is_rejected_by_the_parser() {
    unsafe { std::env::set_var("CLAUDE_CONTEXT_LIMIT", "lots") };
    let result = Args::try_parse_from(["usage-statusline"]);
    unsafe { std::env::remove_var("CLAUDE_CONTEXT_LIMIT") };
    assert!(result.is_err());
}

#[test]
#[serial]
fn value_enums_reach_the_config() {
    let args = Args::try_parse_from([
        "usage-statusline",
        "--reset-mode",
        "weekly",
        "--layout",
        "percent-first",
        "--no-cache",
    ])
    .unwrap();
    assert_eq!(args.reset_mode, Some(ResetModeArg::Weekly));
    assert_eq!(args.layout, Some(LayoutArg::PercentFirst));
    assert!(args.no_cache);

    let mut config = Config::default();
    config.apply_args(&args);
    assert_eq!(config.reset.mode, ResetMode::Weekly);
}

#[test]
#[serial]
fn no_color_env_disables_colors() {
    unsafe { std::env::set_var("NO_COLOR", "1") };
    assert!(!color_enabled(false));
    unsafe { std::env::remove_var("NO_COLOR") };

    assert!(!color_enabled(true));
    assert_eq!(color_enabled(false), cfg!(feature = "colors"));
}
