use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::archive::{ExtractionSummary, REQUIRED_SUBMISSIONS, SubmissionInspector, extract_archives};
use crate::cli::EvaluateArgs;
use crate::error::ConfigError;
use crate::leaderboard::{EvaluationRecord, Leaderboard};
use crate::metrics::{EvalOptions, PRECISION_CUTOFF, evaluate_run};
use crate::model::{
    EvaluationCounts, EvaluationPaths, EvaluationRunManifest, QrelsSummary, RunFailure,
    ScoringSettings,
};
use crate::progress::{ProgressSink, Stage, TracingProgress};
use crate::qrels::{RelevanceJudgments, load_qrels};
use crate::report::{render_table, write_csv};
use crate::run_file::{assign_run_names, load_run};
use crate::util::{
    ensure_directory, is_empty_directory, now_utc_string, sha256_file, utc_compact_string,
    write_json_pretty,
};


const RESULTS_CSV: &str = "results.csv";
const SORTED_RESULTS_CSV: &str = "sorted_results.csv";
const MANIFEST_FILE: &str = "evaluation_manifest.json";

#[derive(Debug, Clone)]
pub struct EvaluationConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub qrels_path: PathBuf,
    pub temporary_output: bool,
    pub options: EvalOptions,
}

#[derive(Debug)]
pub struct EvaluationOutcome {
    pub extraction: ExtractionSummary,
    pub leaderboard: Leaderboard,
    pub failures: Vec<RunFailure>,
    pub qrels: QrelsSummary,
    pub runs_evaluated: usize,
}

#[derive(Debug, Serialize)]
struct LeaderboardOutput<'a> {
    run_id: &'a str,
    records: &'a [EvaluationRecord],
    ranking: Vec<EvaluationRecord>,
}

pub fn run(args: EvaluateArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("eval-{}", utc_compact_string(started_ts));

    info!(run_id = %run_id, input = %args.input.display(), "starting evaluation");

    let config = resolve_config(&args, &run_id)?;
    let outcome = evaluate_submissions(&config, &TracingProgress)?;
    if outcome.leaderboard.is_empty() {
        warn!(input = %config.input_dir.display(), "no runs were scored; the leaderboard is empty");
    }

    if args.json {
        write_json_output(&run_id, &outcome.leaderboard)?;
    } else {
        write_text_output(&outcome.leaderboard)?;
    }

    if config.temporary_output {
        info!(
            path = %config.output_dir.display(),
            "temporary output directory holds the extracted submissions; exports skipped"
        );
    } else {
        export_results(&config.output_dir, &outcome.leaderboard)?;
    }

    let manifest_path = match (&args.manifest_path, config.temporary_output) {
        (Some(path), _) => Some(path.clone()),
        (None, false) => Some(config.output_dir.join(MANIFEST_FILE)),
        (None, true) => None,
    };
    if let Some(manifest_path) = manifest_path {
        let manifest = build_manifest(&run_id, &started_at, &config, &outcome);
        write_json_pretty(&manifest_path, &manifest)?;
        info!(path = %manifest_path.display(), "wrote evaluation manifest");
    }

    info!(
        run_id = %run_id,
        runs_evaluated = outcome.runs_evaluated,
        runs_failed = outcome.failures.len(),
        ranked_teams = outcome.leaderboard.ranking().len(),
        "evaluation completed"
    );
    Ok(())
}

/// Validates every path before anything is written. Only after all checks
/// pass is a temporary output directory created, when none was supplied.
pub fn resolve_config(args: &EvaluateArgs, run_id: &str) -> Result<EvaluationConfig> {
    check_inputs(&args.input, &args.qrels)?;

    let (output_dir, temporary_output) = match &args.output {
        Some(path) => {
            check_output_dir(path)?;
            (path.clone(), false)
        }
        None => {
            let path = std::env::temp_dir()
                .join(format!("trec-leaderboard-{}-{}", run_id, std::process::id()));
            ensure_directory(&path)?;
            check_output_dir(&path)?;
            info!(path = %path.display(), "created temporary output directory");
            (path, true)
        }
    };

    Ok(EvaluationConfig {
        input_dir: args.input.clone(),
        output_dir,
        qrels_path: args.qrels.clone(),
        temporary_output,
        options: args.scoring.eval_options(),
    })
}

pub fn check_inputs(input_dir: &Path, qrels_path: &Path) -> Result<(), ConfigError> {
    if !qrels_path.exists() {
        return Err(ConfigError::QrelsMissing(qrels_path.to_path_buf()));
    }
    if !qrels_path.is_file() {
        return Err(ConfigError::QrelsNotAFile(qrels_path.to_path_buf()));
    }
    if !input_dir.exists() {
        return Err(ConfigError::InputMissing(input_dir.to_path_buf()));
    }
    if !input_dir.is_dir() {
        return Err(ConfigError::InputNotADirectory(input_dir.to_path_buf()));
    }
    Ok(())
}

pub fn check_output_dir(output_dir: &Path) -> Result<()> {
    if !output_dir.exists() {
        return Err(ConfigError::OutputMissing(output_dir.to_path_buf()).into());
    }
    if !output_dir.is_dir() {
        return Err(ConfigError::OutputNotADirectory(output_dir.to_path_buf()).into());
    }
    if !is_empty_directory(output_dir)? {
        return Err(ConfigError::OutputNotEmpty(output_dir.to_path_buf()).into());
    }
    Ok(())
}

/// Loads the qrels, extracts submissions and scores every extracted run.
pub fn evaluate_submissions(
    config: &EvaluationConfig,
    progress: &dyn ProgressSink,
) -> Result<EvaluationOutcome> {
    let judgments = load_qrels(&config.qrels_path)
        .with_context(|| format!("failed to load qrels {}", config.qrels_path.display()))?;
    let qrels = QrelsSummary {
        sha256: sha256_file(&config.qrels_path)?,
        query_count: judgments.query_count(),
        judgment_count: judgments.judgment_count(),
    };
    info!(
        path = %config.qrels_path.display(),
        queries = qrels.query_count,
        judgments = qrels.judgment_count,
        "loaded qrels"
    );

    let inspector = SubmissionInspector::new()?;
    let extraction = extract_archives(&inspector, &config.input_dir, &config.output_dir, progress)?;

    let runs = collect_runs(&config.output_dir, &extraction.extracted_teams)?;
    let (records, failures) = score_runs(&judgments, &runs, config.options, progress);
    let runs_evaluated = records.len();

    Ok(EvaluationOutcome {
        extraction,
        leaderboard: Leaderboard::from_records(records),
        failures,
        qrels,
        runs_evaluated,
    })
}

/// An extracted run file and the name it is reported under.
#[derive(Debug, Clone)]
struct TeamRun {
    team: String,
    name: String,
    path: PathBuf,
}

fn collect_runs(output_dir: &Path, teams: &[String]) -> Result<Vec<TeamRun>> {
    let mut teams = teams.to_vec();
    teams.sort();

    let mut runs = Vec::new();
    for team in teams {
        let team_dir = output_dir.join(&team);
        let entries = fs::read_dir(&team_dir)
            .with_context(|| format!("failed to read {}", team_dir.display()))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry =
                entry.with_context(|| format!("failed to read entry in {}", team_dir.display()))?;
            let path = entry.path();
            if path.is_file() {
                files.push(path);
            } else {
                warn!(team = %team, path = %path.display(), "unexpected entry in team directory");
            }
        }
        files.sort();

        let file_names = files
            .iter()
            .map(|path| {
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default()
            })
            .collect::<Vec<String>>();
        let names = assign_run_names(&file_names);
        runs.extend(
            files
                .into_iter()
                .zip(names)
                .map(|(path, name)| TeamRun {
                    team: team.clone(),
                    name,
                    path,
                }),
        );
    }
    Ok(runs)
}

/// Each run is scored independently; a run that fails to parse is reported
/// and left out of the records.
fn score_runs(
    judgments: &RelevanceJudgments,
    runs: &[TeamRun],
    options: EvalOptions,
    progress: &dyn ProgressSink,
) -> (Vec<EvaluationRecord>, Vec<RunFailure>) {
    let total = runs.len();
    let mut records = Vec::with_capacity(total);
    let mut failures = Vec::new();

    for (position, TeamRun { team, name, path }) in runs.iter().enumerate() {
        match load_run(path, name) {
            Ok(run) => {
                let scores = evaluate_run(judgments, &run, options);
                info!(
                    team = %team,
                    run = %run.name,
                    queries = scores.per_query.len(),
                    map = scores.map,
                    p_at_5 = scores.p_at_5,
                    "scored run"
                );
                records.push(EvaluationRecord {
                    team: team.clone(),
                    run: run.name,
                    map: scores.map,
                    p_at_5: scores.p_at_5,
                });
            }
            Err(err) => {
                match err.line() {
                    Some(line) => warn!(
                        team = %team,
                        run_file = %path.display(),
                        line,
                        error = %err,
                        "run evaluation failed"
                    ),
                    None => warn!(
                        team = %team,
                        run_file = %path.display(),
                        error = %err,
                        "run evaluation failed"
                    ),
                }
                failures.push(RunFailure {
                    team: team.clone(),
                    run_file: path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    line: err.line(),
                    reason: err.to_string(),
                });
            }
        }
        progress.advance(Stage::Evaluate, position + 1, total);
    }

    (records, failures)
}

fn export_results(output_dir: &Path, leaderboard: &Leaderboard) -> Result<()> {
    let results_path = output_dir.join(RESULTS_CSV);
    write_csv(&results_path, leaderboard.records())?;
    let sorted_path = output_dir.join(SORTED_RESULTS_CSV);
    write_csv(&sorted_path, &leaderboard.ranking())?;

    info!(
        results = %results_path.display(),
        sorted_results = %sorted_path.display(),
        "wrote result exports"
    );
    Ok(())
}

fn write_text_output(leaderboard: &Leaderboard) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    render_table(&mut output, "All runs", leaderboard.records())?;
    writeln!(output)?;
    render_table(&mut output, "Leaderboard", &leaderboard.ranking())?;
    output.flush()?;
    Ok(())
}

fn write_json_output(run_id: &str, leaderboard: &Leaderboard) -> Result<()> {
    let response = LeaderboardOutput {
        run_id,
        records: leaderboard.records(),
        ranking: leaderboard.ranking(),
    };

    let mut output = io::BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut output, &response)
        .context("failed to serialize leaderboard json output")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

fn build_manifest(
    run_id: &str,
    started_at: &str,
    config: &EvaluationConfig,
    outcome: &EvaluationOutcome,
) -> EvaluationRunManifest {
    let ranking = outcome.leaderboard.ranking();
    EvaluationRunManifest {
        manifest_version: 1,
        run_id: run_id.to_string(),
        status: "completed".to_string(),
        started_at: started_at.to_string(),
        completed_at: now_utc_string(),
        command: std::env::args().collect::<Vec<String>>().join(" "),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        paths: EvaluationPaths {
            input_dir: config.input_dir.display().to_string(),
            output_dir: config.output_dir.display().to_string(),
            qrels_path: config.qrels_path.display().to_string(),
            temporary_output: config.temporary_output,
        },
        scoring: ScoringSettings {
            tie_break: config.options.tie_break.as_str().to_string(),
            precision_denominator: config.options.precision_denominator.as_str().to_string(),
            precision_cutoff: PRECISION_CUTOFF,
            required_submissions: REQUIRED_SUBMISSIONS,
        },
        qrels: outcome.qrels.clone(),
        counts: EvaluationCounts {
            archive_count: outcome.extraction.reports.len(),
            accepted_archives: outcome.extraction.extracted_teams.len(),
            rejected_archives: outcome.extraction.rejected_count(),
            runs_evaluated: outcome.runs_evaluated,
            runs_failed: outcome.failures.len(),
            ranked_teams: ranking.len(),
        },
        archives: outcome.extraction.reports.clone(),
        failures: outcome.failures.clone(),
        records: outcome.leaderboard.records().to_vec(),
        ranking,
    }
}
