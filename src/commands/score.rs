use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ScoreArgs;
use crate::metrics::{Metric, QueryScores, RunScores, evaluate_run};
use crate::qrels::load_qrels;
use crate::run_file::{load_run, run_name_from_path};

#[derive(Debug, Serialize)]
struct ScoreOutput<'a> {
    run: &'a str,
    map: f64,
    p_at_5: f64,
    query_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    per_query: Option<&'a [QueryScores]>,
}

pub fn run(args: ScoreArgs) -> Result<()> {
    let judgments = load_qrels(&args.qrels)
        .with_context(|| format!("failed to load qrels {}", args.qrels.display()))?;
    let run = load_run(&args.run, &run_name_from_path(&args.run))
        .with_context(|| format!("failed to load run {}", args.run.display()))?;

    let scores = evaluate_run(&judgments, &run, args.scoring.eval_options());
    info!(
        run = %run.name,
        queries = run.query_count(),
        judged_queries = scores
            .per_query
            .iter()
            .filter(|query| judgments.contains_query(&query.query_id))
            .count(),
        "scored run"
    );

    let mut output = io::BufWriter::new(io::stdout().lock());
    if args.json {
        let response = ScoreOutput {
            run: &run.name,
            map: scores.map,
            p_at_5: scores.p_at_5,
            query_count: scores.per_query.len(),
            per_query: args.per_query.then_some(scores.per_query.as_slice()),
        };
        serde_json::to_writer_pretty(&mut output, &response)
            .context("failed to serialize score json output")?;
        writeln!(output)?;
    } else {
        write_trec_style(&mut output, &scores, args.per_query)?;
    }
    output.flush()?;
    Ok(())
}

/// `measure <tab> query <tab> value` lines, per-query rows first, `all` last.
fn write_trec_style<W: Write>(output: &mut W, scores: &RunScores, per_query: bool) -> Result<()> {
    if per_query {
        for query in &scores.per_query {
            let values = [query.average_precision, query.precision_at_5];
            for (metric, value) in Metric::ALL.iter().zip(values) {
                writeln!(output, "{:<22}\t{}\t{:.4}", metric.trec_name(), query.query_id, value)?;
            }
        }
    }
    writeln!(output, "{:<22}\tall\t{}", "num_q", scores.per_query.len())?;
    for metric in Metric::ALL {
        writeln!(output, "{:<22}\tall\t{:.4}", metric.trec_name(), scores.value(metric))?;
    }
    Ok(())
}
