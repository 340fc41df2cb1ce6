//! Command-line arguments.

pub mod commands;

use crate::constants::{APP_DESCRIPTION, APP_NAME, DATE_FORMAT_COMPACT, DEFAULT_PER_PAGE};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::str::FromStr;
use uuid::Uuid;

/// A daily journal with moods, tags and writing streaks
#[derive(Parser, Debug)]
#[command(name = APP_NAME, about = APP_DESCRIPTION, author, version, long_about = None)]
pub struct CliArgs {
    /// Path to the database file (overrides ENTRYIT_DB)
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Username or email to act as
    #[arg(short = 'u', long, global = true)]
    pub user: Option<String>,

    /// Log output format: text or json (overrides ENTRYIT_LOG_FORMAT)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Print verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create an account (passwords are prompted or read from the environment)
    Signup {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
    },
    /// Create or update today's entry
    Write(WriteArgs),
    /// Show today's entry, or the entry with --id
    Show {
        #[arg(long)]
        id: Option<Uuid>,
    },
    /// Delete today's entry, or today's entry by --id without touching the streak
    Delete {
        #[arg(long)]
        id: Option<Uuid>,
    },
    /// Search and page through entries
    List(ListArgs),
    /// Check an entry's unlock password
    Unlock {
        #[arg(long)]
        id: Uuid,
    },
    /// List the mood catalog
    Moods,
    /// List the tag catalog
    Tags,
    /// Add a custom tag
    AddTag { name: String },
    /// Mood counts over a date range
    MoodStats(RangeArgs),
    /// Word counts per entry over a date range
    WordStats(RangeArgs),
    /// Days with an entry in a month of the current year
    Calendar {
        /// Month number, 1-12 (defaults to the current month)
        #[arg(long)]
        month: Option<u32>,
    },
    /// Export one entry, or every unlocked entry in a range
    Export(ExportArgs),
    /// Show the current and longest streak
    Streak,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct WriteArgs {
    #[arg(long)]
    pub title: String,

    /// Entry text; read from stdin when omitted
    #[arg(long)]
    pub content: Option<String>,

    /// Primary mood name
    #[arg(long)]
    pub mood: String,

    /// Secondary mood name (up to two)
    #[arg(long = "also", num_args = 1)]
    pub secondary_moods: Vec<String>,

    /// Tag name (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Lock the entry with the account's default lock password
    #[arg(long)]
    pub lock: bool,

    /// Lock the entry with a custom password (from ENTRYIT_LOCK_PASSWORD or a prompt)
    #[arg(long, conflicts_with = "lock")]
    pub lock_custom: bool,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ListArgs {
    /// Case-insensitive text to look for
    #[arg(short = 's', long)]
    pub search: Option<String>,

    #[arg(long, value_parser = parse_date)]
    pub from: Option<NaiveDate>,

    /// Upper bound (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub to: Option<NaiveDate>,

    #[arg(long = "mood")]
    pub moods: Vec<String>,

    #[arg(long = "tag")]
    pub tags: Vec<String>,

    #[arg(long, default_value_t = 1)]
    pub page: u32,

    #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
    pub per_page: u32,
}

#[derive(Args, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeArgs {
    #[arg(long, value_parser = parse_date)]
    pub from: Option<NaiveDate>,

    /// Upper bound (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExportFormat {
    #[default]
    Markdown,
    Json,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ExportArgs {
    /// Export a single entry instead of a range
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub id: Option<Uuid>,

    #[command(flatten)]
    pub range: RangeArgs,

    #[arg(long, value_enum, default_value_t = ExportFormat::Markdown)]
    pub format: ExportFormat,

    /// Write to this file instead of stdout
    #[arg(short = 'o', long)]
    pub output: Option<String>,
}

/// Parses a date in YYYY-MM-DD or YYYYMMDD format.
pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::from_str(value)
        .or_else(|_| NaiveDate::parse_from_str(value, DATE_FORMAT_COMPACT))
        .map_err(|_| format!("invalid date '{}', expected YYYY-MM-DD or YYYYMMDD", value))
}
