//! text2time CLI - resolve scheduling phrases from the command line
//!
//! ```text
//! text2time next tuesday
//! text2time --now 2023-05-15T12:00 parse every 3 months day 5 at 4:04
//! text2time --no-seconds every friday at 9:30
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use text2time::{ParseResult, ParserOptions, Text2Time};
use tracing_subscriber::EnvFilter;

/// Output format for resolved dates.
const DATE_FORMAT: &str = "%Y-%m-%d %A %H:%M";

#[derive(Parser)]
#[command(name = "text2time", version, about = "Natural-language scheduling phrases to dates and recurrences")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Anchor time to resolve against (default: now), e.g. 2023-05-15T12:00
    #[arg(long, global = true, value_parser = parse_anchor)]
    now: Option<NaiveDateTime>,

    /// Number of upcoming occurrences to list for recurring phrases
    #[arg(long, global = true)]
    count: Option<usize>,

    /// Emit five-field recurrence expressions (no seconds field)
    #[arg(long, global = true)]
    no_seconds: bool,

    /// JSON file with parser options (anchor, occurrence_count, include_seconds)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a phrase; a leading "next" may be omitted
    Next {
        #[arg(required = true, num_args = 1.., allow_negative_numbers = true)]
        phrase: Vec<String>,
    },
    /// Resolve a phrase that starts with next, add, now or every
    Parse {
        #[arg(required = true, num_args = 1.., allow_negative_numbers = true)]
        phrase: Vec<String>,
    },
    /// Compile a recurring phrase into its recurrence expression
    Every {
        #[arg(required = true, num_args = 1.., allow_negative_numbers = true)]
        phrase: Vec<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let parser = Text2Time::new(load_options(&cli)?);

    match &cli.command {
        Commands::Next { phrase } => {
            let phrase = phrase.join(" ");
            let result = parser
                .next(&phrase)
                .with_context(|| format!("failed to resolve '{phrase}'"))?;
            print_result(&result, cli.json)?;
        }
        Commands::Parse { phrase } => {
            let phrase = phrase.join(" ");
            let result = parser
                .parse(&phrase)
                .with_context(|| format!("failed to parse '{phrase}'"))?;
            print_result(&result, cli.json)?;
        }
        Commands::Every { phrase } => {
            let phrase = phrase.join(" ");
            let expression = parser
                .every(&phrase)
                .with_context(|| format!("failed to compile '{phrase}'"))?;
            if cli.json {
                let value = serde_json::json!({ "expression": expression });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("{expression}");
            }
        }
    }

    Ok(())
}

/// Options from `--config` (or defaults), overridden by individual flags.
fn load_options(cli: &Cli) -> Result<ParserOptions> {
    let mut options = match &cli.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_json::from_str::<ParserOptions>(&raw)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => ParserOptions::default(),
    };

    if let Some(anchor) = cli.now {
        options.anchor = anchor;
    }
    if let Some(count) = cli.count {
        options.occurrence_count = count;
    }
    if cli.no_seconds {
        options.include_seconds = false;
    }
    Ok(options)
}

fn parse_anchor(s: &str) -> Result<NaiveDateTime, String> {
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .ok_or_else(|| format!("expected YYYY-MM-DDTHH:MM[:SS], got '{s}'"))
}

fn print_result(result: &ParseResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    println!("{}", result.date.format(DATE_FORMAT));
    if let Some(ends) = result.ends {
        println!("ends: {}", ends.format(DATE_FORMAT));
    }
    if !result.next.is_empty() {
        println!("\nNext occurrences:");
        for date in &result.next {
            println!("{}", date.format(DATE_FORMAT));
        }
    }
    Ok(())
}
