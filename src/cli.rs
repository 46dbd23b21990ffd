use std::path::PathBuf;

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetModeArg {
    /// Fixed daily boundaries (00:00, 05:00, 10:00, 15:00, 20:00 by default)
    Buckets,
    /// First session activity plus five hours
    Session,
    /// Once a week at a fixed day and hour
    Weekly,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetStyleArg {
    /// Wall-clock label: "Today 15:00"
    Clock,
    /// Time remaining: "2h 13m"
    Countdown,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutArg {
    /// [bar] 75% Reset: Today 15:00
    BarFirst,
    /// 75% [bar] Next: Sat 00:00
    PercentFirst,
}

#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Context usage bar for the Claude Code statusline")]
pub struct Args {
    /// Config file path. Defaults to ~/.claude/usage-statusline.json
    #[arg(long, env = "CLAUDE_USAGE_STATUSLINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Force Claude data path(s), comma-separated. Defaults to ~/.claude and ~/.config/claude
    #[arg(long, env = "CLAUDE_CONFIG_DIR")]
    pub claude_config_dir: Option<String>,

    /// Context limit in tokens for every model (overrides the model table)
    #[arg(long, env = "CLAUDE_CONTEXT_LIMIT")]
    pub context_limit: Option<u64>,

    /// Reset schedule: buckets|session|weekly
    #[arg(long, value_enum)]
    pub reset_mode: Option<ResetModeArg>,

    /// Reset label: clock|countdown
    #[arg(long, value_enum)]
    pub reset_style: Option<ResetStyleArg>,

    /// Field order: bar-first|percent-first
    #[arg(long, value_enum)]
    pub layout: Option<LayoutArg>,

    /// Terminal width in columns (detected when omitted)
    #[arg(long, env = "CLAUDE_STATUSLINE_WIDTH")]
    pub width: Option<usize>,

    /// Smallest bar width on narrow terminals
    #[arg(long)]
    pub min_bar_width: Option<usize>,

    /// Disable ANSI colors (NO_COLOR is honored as well)
    #[arg(long)]
    pub no_color: bool,

    /// Skip the short-lived percentage cache
    #[arg(long)]
    pub no_cache: bool,

    /// Debug mode: print calculation details to stderr
    #[arg(long, env = "CLAUDE_DEBUG")]
    pub debug: bool,
}

impl Args {
    /// Like `clap::Parser::parse`, but bad arguments fall back to defaults instead of
    /// exiting non-zero. `--help` and `--version` still print and exit.
    pub fn parse_lenient() -> Self {
        match <Args as clap::Parser>::try_parse() {
            Ok(args) => args,
            Err(e) if !e.use_stderr() => e.exit(),
            Err(_) => Self::default(),
        }
    }
}
