//! # Display Module
//!
//! Progress bar rendering, usage tiers and final line layout.
//!
//! Layout math counts visible characters only; ANSI color codes are added
//! after the bar width has been negotiated.

#[cfg(feature = "colors")]
use owo_colors::OwoColorize;
use serde::Deserialize;

pub const FILLED_GLYPH: char = '█';
pub const EMPTY_GLYPH: char = '░';
pub const DEFAULT_MIN_BAR_WIDTH: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageTier {
    Low,
    Medium,
    High,
}

impl UsageTier {
    /// [0,50) low, [50,80) medium, [80,100] high
    pub fn from_percentage(pct: u32) -> Self {
        if pct >= 80 {
            Self::High
        } else if pct >= 50 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// `[bar] 75% Reset: Today 15:00`
    #[default]
    BarFirst,
    /// `75% [bar] Next: Sat 00:00`
    PercentFirst,
}

pub fn render_bar(percentage: u32, width: usize) -> String {
    let filled = percentage.min(100) as usize * width / 100;
    let mut bar = String::with_capacity(width * FILLED_GLYPH.len_utf8());
    bar.extend(std::iter::repeat_n(FILLED_GLYPH, filled));
    bar.extend(std::iter::repeat_n(EMPTY_GLYPH, width - filled));
    bar
}

/// Width left for the bar once the other fields are laid out, never below
/// `min_width`.
pub fn bar_width(terminal_width: usize, fixed_text_len: usize, min_width: usize) -> usize {
    terminal_width.saturating_sub(fixed_text_len).max(min_width)
}

pub fn color_enabled(no_color_flag: bool) -> bool {
    if no_color_flag || std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    cfg!(feature = "colors")
}

#[cfg(feature = "colors")]
pub fn paint(text: &str, tier: UsageTier, color: bool) -> String {
    if !color {
        return text.to_string();
    }
    match tier {
        UsageTier::Low => text.green().to_string(),
        UsageTier::Medium => text.yellow().to_string(),
        UsageTier::High => text.red().bold().to_string(),
    }
}

#[cfg(not(feature = "colors"))]
pub fn paint(text: &str, _tier: UsageTier, _color: bool) -> String {
    text.to_string()
}

/// Muted styling for diagnostics on stderr
#[cfg(feature = "colors")]
pub fn dimmed(text: &str) -> String {
    text.bright_black().to_string()
}

#[cfg(not(feature = "colors"))]
pub fn dimmed(text: &str) -> String {
    text.to_string()
}

/// Settings for one composed line
#[derive(Debug, Clone, Copy)]
pub struct LineStyle {
    pub terminal_width: usize,
    pub min_bar_width: usize,
    pub layout: Layout,
    pub color: bool,
}

/// Compose the status line, giving the bar whatever width remains.
pub fn compose_line(percentage: u32, reset_label: &str, style: &LineStyle) -> String {
    let pct = percentage.min(100);
    let pct_str = format!("{pct}%");
    let (prefix_len, suffix_len) = match style.layout {
        Layout::BarFirst => (1, format!("] {pct_str} Reset: {reset_label}").chars().count()),
        Layout::PercentFirst => (
            format!("{pct_str} [").chars().count(),
            format!("] Next: {reset_label}").chars().count(),
        ),
    };
    let width = bar_width(
        style.terminal_width,
        prefix_len + suffix_len,
        style.min_bar_width,
    );
    let tier = UsageTier::from_percentage(pct);
    let bar = paint(&render_bar(pct, width), tier, style.color);
    let pct_painted = paint(&pct_str, tier, style.color);
    match style.layout {
        Layout::BarFirst => format!("[{bar}] {pct_painted} Reset: {reset_label}"),
        Layout::PercentFirst => format!("{pct_painted} [{bar}] Next: {reset_label}"),
    }
}

/// Degraded line when no usage data is available
pub fn plan_line(plan: &str) -> String {
    format!("Claude Code ({plan})")
}
