use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::leaderboard::EvaluationRecord;
use crate::metrics::Metric;

const TEAM_HEADER: &str = "Team";
const RUN_HEADER: &str = "Run";

pub fn render_table<W: Write>(
    output: &mut W,
    title: &str,
    records: &[EvaluationRecord],
) -> Result<()> {
    let team_width = records
        .iter()
        .map(|record| record.team.chars().count())
        .chain(std::iter::once(TEAM_HEADER.len()))
        .max()
        .unwrap_or(TEAM_HEADER.len());
    let run_width = records
        .iter()
        .map(|record| record.run.chars().count())
        .chain(std::iter::once(RUN_HEADER.len()))
        .max()
        .unwrap_or(RUN_HEADER.len());

    writeln!(output, "{title}")?;
    write!(
        output,
        "{:<team_width$}  {:<run_width$}",
        TEAM_HEADER, RUN_HEADER
    )?;
    for metric in Metric::ALL {
        write!(output, "  {:>8}", metric.label())?;
    }
    writeln!(output)?;

    if records.is_empty() {
        writeln!(output, "(no results)")?;
        return Ok(());
    }

    for record in records {
        writeln!(
            output,
            "{:<team_width$}  {:<run_width$}  {:>8.4}  {:>8.4}",
            record.team, record.run, record.map, record.p_at_5
        )?;
    }
    Ok(())
}

/// Writes `Team,Run,MAP,P@5` rows. Scores keep full precision.
pub fn write_csv(path: &Path, records: &[EvaluationRecord]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut output = BufWriter::new(file);
    write_csv_rows(&mut output, records)
        .with_context(|| format!("failed to write {}", path.display()))?;
    output
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}

fn write_csv_rows<W: Write>(output: &mut W, records: &[EvaluationRecord]) -> io::Result<()> {
    let mut header = vec![TEAM_HEADER, RUN_HEADER];
    header.extend(Metric::ALL.iter().map(|metric| metric.label()));
    writeln!(output, "{}", header.join(","))?;

    for record in records {
        writeln!(
            output,
            "{},{},{},{}",
            csv_field(&record.team),
            csv_field(&record.run),
            record.map,
            record.p_at_5
        )?;
    }
    Ok(())
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
