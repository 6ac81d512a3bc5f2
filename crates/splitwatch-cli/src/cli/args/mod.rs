use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[cfg(test)]
mod tests;

#[derive(Parser)]
#[command(
    name = "splitwatch",
    version,
    about = "Reverse-split watcher: scrape upcoming splits, classify fractional-share handling, alert"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// One discovery pass: fetch, classify, write CSV, notify
    Run(RunArgs),
    /// Classify a JSON list of candidates and print the verdicts
    Classify(ClassifyArgs),
    /// Parse a saved model response offline
    Parse(ParseArgs),
    Version,
}

#[derive(clap::Args, Debug, Clone)]
pub struct RunArgs {
    /// YAML config (default: ./splitwatch.yaml when present)
    #[arg(long, env = "SPLITWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Read rows from a JSON file instead of fetching the page
    #[arg(long)]
    pub rows_file: Option<PathBuf>,

    /// Skip webhook notifications for this run
    #[arg(long)]
    pub no_notify: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ClassifyArgs {
    /// JSON array of {ticker, ratio, ex_date}
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long, env = "SPLITWATCH_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ParseArgs {
    /// File holding the raw response text
    #[arg(long)]
    pub response: PathBuf,

    /// Tickers that were requested, comma separated
    #[arg(long, value_delimiter = ',', required = true)]
    pub tickers: Vec<String>,

    /// Config whose phrase set should be used (defaults otherwise)
    #[arg(long)]
    pub config: Option<PathBuf>,
}
