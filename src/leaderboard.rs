use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub team: String,
    pub run: String,
    pub map: f64,
    pub p_at_5: f64,
}

/// All evaluated runs plus the per-team views derived from them.
///
/// Records are kept in the order they were produced. Ranking compares MAP,
/// then P@5, both descending; remaining ties fall back to team id and run
/// name ascending so the output is stable across runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Leaderboard {
    records: Vec<EvaluationRecord>,
}

impl Leaderboard {
    pub fn from_records(records: Vec<EvaluationRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[EvaluationRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// One record per team: the run with the highest (MAP, P@5).
    pub fn best_per_team(&self) -> Vec<EvaluationRecord> {
        let mut best = BTreeMap::<&str, &EvaluationRecord>::new();
        for record in &self.records {
            best.entry(record.team.as_str())
                .and_modify(|current| {
                    if compare_runs(record, current) == Ordering::Less {
                        *current = record;
                    }
                })
                .or_insert(record);
        }
        best.into_values().cloned().collect()
    }

    pub fn ranking(&self) -> Vec<EvaluationRecord> {
        let mut ranked = self.best_per_team();
        ranked.sort_by(|left, right| {
            compare_scores(left, right).then_with(|| left.team.cmp(&right.team))
        });
        ranked
    }
}

/// Better scores sort first.
fn compare_scores(left: &EvaluationRecord, right: &EvaluationRecord) -> Ordering {
    right
        .map
        .total_cmp(&left.map)
        .then_with(|| right.p_at_5.total_cmp(&left.p_at_5))
}

fn compare_runs(left: &EvaluationRecord, right: &EvaluationRecord) -> Ordering {
    compare_scores(left, right).then_with(|| left.run.cmp(&right.run))
}
