//! # Usage Statusline
//!
//! A one-line context usage bar for the Claude Code statusline.
//!
//! ## Overview
//!
//! Reads the statusline JSON payload from stdin (and, when the payload has no
//! token counters, the session's JSONL log) and prints a single line:
//!
//! ```text
//! [██████████████████░░░░░░] 75% Reset: Today 15:00
//! ```
//!
//! - Usage percentage against a per-model context limit
//! - Next reset from fixed 5-hour buckets, the session start, or a weekly slot
//! - Bar sized to the terminal and colored by usage tier
//!
//! ## Features
//!
//! - `colors` (default): Enables terminal color output via owo-colors

/// Single-slot percentage cache with injectable clock and storage
pub mod cache;

/// Command-line argument parsing
pub mod cli;

/// Config file and layered settings
pub mod config;

/// Bar rendering and line layout
pub mod display;

/// Failure taxonomy and recovery policy
pub mod error;

/// Payload parsing and session log reading
pub mod input;

/// Data models for the payload, log records and counters
pub mod models;

/// Reset boundary computation and labels
pub mod reset;

/// The rendering pipeline
pub mod status;

/// Usage percentage and model tables
pub mod usage;

/// Utility functions for paths, terminal width and timestamps
pub mod utils;
