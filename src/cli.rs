use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::metrics::{EvalOptions, PrecisionDenominator, TieBreak};

#[derive(Parser, Debug)]
#[command(
    name = "trec-leaderboard",
    version,
    about = "Score team submissions against TREC qrels and build a leaderboard"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract submissions, score every run and print the leaderboard.
    Evaluate(EvaluateArgs),
    /// Classify submission archives without extracting them.
    Inventory(InventoryArgs),
    /// Score a single run file.
    Score(ScoreArgs),
}

#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    /// Directory holding one zip archive per team.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Empty directory for extracted submissions and exports. A temporary
    /// directory is created when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(short, long)]
    pub qrels: PathBuf,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[command(flatten)]
    pub scoring: ScoringArgs,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct InventoryArgs {
    #[arg(short, long)]
    pub input: PathBuf,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    #[arg(short, long)]
    pub qrels: PathBuf,

    #[arg(short, long)]
    pub run: PathBuf,

    #[arg(long, default_value_t = false)]
    pub per_query: bool,

    #[command(flatten)]
    pub scoring: ScoringArgs,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone, Copy)]
pub struct ScoringArgs {
    #[arg(long, value_enum, default_value_t = TieBreakMode::DocId)]
    pub tie_break: TieBreakMode,

    #[arg(long, value_enum, default_value_t = PrecisionMode::Cutoff)]
    pub precision_denominator: PrecisionMode,
}

impl ScoringArgs {
    pub fn eval_options(self) -> EvalOptions {
        EvalOptions {
            tie_break: match self.tie_break {
                TieBreakMode::DocId => TieBreak::DocIdDescending,
                TieBreakMode::FileOrder => TieBreak::FileOrder,
            },
            precision_denominator: match self.precision_denominator {
                PrecisionMode::Cutoff => PrecisionDenominator::Cutoff,
                PrecisionMode::Retrieved => PrecisionDenominator::Retrieved,
            },
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum TieBreakMode {
    DocId,
    FileOrder,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum PrecisionMode {
    Cutoff,
    Retrieved,
}
