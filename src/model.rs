use serde::{Deserialize, Serialize};

use crate::leaderboard::EvaluationRecord;

/// Outcome of inspecting one entry of the submissions directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveReport {
    pub file_name: String,
    pub team: Option<String>,
    pub sha256: Option<String>,
    pub status: String,
    pub reason: Option<String>,
    pub run_files: Vec<String>,
}

impl ArchiveReport {
    pub fn is_accepted(&self) -> bool {
        self.status == "accepted"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionInventoryManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source_directory: String,
    pub archive_count: usize,
    pub accepted_count: usize,
    pub rejected_count: usize,
    pub archives: Vec<ArchiveReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationPaths {
    pub input_dir: String,
    pub output_dir: String,
    pub qrels_path: String,
    pub temporary_output: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoringSettings {
    pub tie_break: String,
    pub precision_denominator: String,
    pub precision_cutoff: usize,
    pub required_submissions: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct QrelsSummary {
    pub sha256: String,
    pub query_count: usize,
    pub judgment_count: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EvaluationCounts {
    pub archive_count: usize,
    pub accepted_archives: usize,
    pub rejected_archives: usize,
    pub runs_evaluated: usize,
    pub runs_failed: usize,
    pub ranked_teams: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunFailure {
    pub team: String,
    pub run_file: String,
    pub line: Option<usize>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub completed_at: String,
    pub command: String,
    pub tool_version: String,
    pub paths: EvaluationPaths,
    pub scoring: ScoringSettings,
    pub qrels: QrelsSummary,
    pub counts: EvaluationCounts,
    pub archives: Vec<ArchiveReport>,
    pub failures: Vec<RunFailure>,
    pub records: Vec<EvaluationRecord>,
    pub ranking: Vec<EvaluationRecord>,
}
