use std::cmp::Ordering;

use serde::Serialize;

use crate::qrels::RelevanceJudgments;
use crate::run_file::{RunEntry, RunFile};

pub const PRECISION_CUTOFF: usize = 5;

/// Ordering applied to documents with equal scores.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum TieBreak {
    /// trec_eval: equal scores are ordered by document id, descending.
    #[default]
    DocIdDescending,
    /// Equal scores keep the order of the run file.
    FileOrder,
}

impl TieBreak {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DocIdDescending => "doc-id-descending",
            Self::FileOrder => "file-order",
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum PrecisionDenominator {
    /// trec_eval `P_5`: divide by the cutoff even when fewer documents were retrieved.
    #[default]
    Cutoff,
    /// Divide by the number of documents actually inside the cutoff.
    Retrieved,
}

impl PrecisionDenominator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cutoff => "cutoff",
            Self::Retrieved => "retrieved",
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct EvalOptions {
    pub tie_break: TieBreak,
    pub precision_denominator: PrecisionDenominator,
}

/// Metrics reported per run.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Metric {
    MeanAveragePrecision,
    PrecisionAt5,
}

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::MeanAveragePrecision, Metric::PrecisionAt5];

    pub fn label(self) -> &'static str {
        match self {
            Self::MeanAveragePrecision => "MAP",
            Self::PrecisionAt5 => "P@5",
        }
    }

    /// Measure name as trec_eval prints it.
    pub fn trec_name(self) -> &'static str {
        match self {
            Self::MeanAveragePrecision => "map",
            Self::PrecisionAt5 => "P_5",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryScores {
    pub query_id: String,
    pub retrieved: usize,
    pub relevant: usize,
    pub relevant_retrieved: usize,
    pub average_precision: f64,
    pub precision_at_5: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunScores {
    pub map: f64,
    pub p_at_5: f64,
    pub per_query: Vec<QueryScores>,
}

impl RunScores {
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::MeanAveragePrecision => self.map,
            Metric::PrecisionAt5 => self.p_at_5,
        }
    }
}

/// Scores every query the run mentions and averages them with equal weight.
/// Queries without judgments score zero.
pub fn evaluate_run(
    judgments: &RelevanceJudgments,
    run: &RunFile,
    options: EvalOptions,
) -> RunScores {
    let per_query = run
        .by_query()
        .into_iter()
        .map(|(query_id, entries)| evaluate_query(judgments, query_id, &entries, options))
        .collect::<Vec<QueryScores>>();

    RunScores {
        map: mean(per_query.iter().map(|query| query.average_precision)),
        p_at_5: mean(per_query.iter().map(|query| query.precision_at_5)),
        per_query,
    }
}

pub fn evaluate_query(
    judgments: &RelevanceJudgments,
    query_id: &str,
    entries: &[&RunEntry],
    options: EvalOptions,
) -> QueryScores {
    let ranked = rank_entries(entries, options.tie_break);
    let relevance = ranked
        .iter()
        .map(|entry| judgments.is_relevant(query_id, &entry.doc_id))
        .collect::<Vec<bool>>();
    let relevant = judgments.relevant_count(query_id);

    QueryScores {
        query_id: query_id.to_string(),
        retrieved: ranked.len(),
        relevant,
        relevant_retrieved: relevance.iter().filter(|hit| **hit).count(),
        average_precision: average_precision(&relevance, relevant),
        precision_at_5: precision_at_k(
            &relevance,
            PRECISION_CUTOFF,
            options.precision_denominator,
        ),
    }
}

/// Orders entries by score, highest first, resolving ties per `tie_break`.
pub fn rank_entries<'a>(entries: &[&'a RunEntry], tie_break: TieBreak) -> Vec<&'a RunEntry> {
    let mut ranked = entries.to_vec();
    ranked.sort_by(|left, right| {
        right
            .score
            .total_cmp(&left.score)
            .then_with(|| match tie_break {
                TieBreak::DocIdDescending => right.doc_id.as_bytes().cmp(left.doc_id.as_bytes()),
                TieBreak::FileOrder => Ordering::Equal,
            })
    });
    ranked
}

/// `relevance[i]` tells whether the document at rank `i + 1` is relevant.
pub fn average_precision(relevance: &[bool], total_relevant: usize) -> f64 {
    if total_relevant == 0 {
        return 0.0;
    }

    let mut relevant_found = 0usize;
    let mut precision_sum = 0.0_f64;
    for (index, is_relevant) in relevance.iter().enumerate() {
        if *is_relevant {
            relevant_found += 1;
            precision_sum += relevant_found as f64 / (index + 1) as f64;
        }
    }

    precision_sum / total_relevant as f64
}

pub fn precision_at_k(relevance: &[bool], k: usize, denominator: PrecisionDenominator) -> f64 {
    let cutoff = relevance.len().min(k);
    let hits = relevance.iter().take(cutoff).filter(|hit| **hit).count();
    let divisor = match denominator {
        PrecisionDenominator::Cutoff => k,
        PrecisionDenominator::Retrieved => cutoff,
    };
    if divisor == 0 {
        return 0.0;
    }

    hits as f64 / divisor as f64
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0_f64, 0usize), |(sum, count), value| {
        (sum + value, count + 1)
    });
    if count == 0 {
        return 0.0;
    }

    sum / count as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn judgments(rows: &[(&str, &str, i32)]) -> RelevanceJudgments {
        let mut judgments = RelevanceJudgments::default();
        for (query_id, doc_id, grade) in rows {
            judgments.insert(query_id, doc_id, *grade);
        }
        judgments
    }

    fn run(rows: &[(&str, &str, f64)]) -> RunFile {
        RunFile {
            name: "run".to_string(),
            entries: rows
                .iter()
                .enumerate()
                .map(|(index, (query_id, doc_id, score))| RunEntry {
                    query_id: query_id.to_string(),
                    doc_id: doc_id.to_string(),
                    rank: index as i64 + 1,
                    score: *score,
                    line: index + 1,
                })
                .collect(),
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-12,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn perfect_ranking_scores_one() {
        let mut qrels = Vec::new();
        let mut rows = Vec::new();
        let docs = ["d1", "d2", "d3", "d4", "d5", "d6"];
        for query_id in ["q1", "q2"] {
            for (index, doc_id) in docs.iter().enumerate() {
                qrels.push((query_id, *doc_id, 1));
                rows.push((query_id, *doc_id, 10.0 - index as f64));
            }
            rows.push((query_id, "junk", 0.5));
        }

        let scores = evaluate_run(&judgments(&qrels), &run(&rows), EvalOptions::default());
        assert_eq!(scores.map, 1.0);
        assert_eq!(scores.p_at_5, 1.0);
    }

    #[test]
    fn average_precision_matches_hand_computation() {
        // relevant at ranks 1 and 3, three relevant judged: (1/1 + 2/3) / 3
        let scores = evaluate_run(
            &judgments(&[("q", "a", 1), ("q", "c", 2), ("q", "z", 1), ("q", "b", 0)]),
            &run(&[("q", "a", 3.0), ("q", "b", 2.0), ("q", "c", 1.0)]),
            EvalOptions::default(),
        );

        assert_close(scores.map, (1.0 + 2.0 / 3.0) / 3.0);
        assert_close(scores.p_at_5, 2.0 / 5.0);
        assert_eq!(scores.per_query[0].relevant, 3);
        assert_eq!(scores.per_query[0].relevant_retrieved, 2);
    }

    #[test]
    fn unjudged_query_contributes_zero_not_nan() {
        let scores = evaluate_run(
            &judgments(&[("q1", "a", 1)]),
            &run(&[("q1", "a", 1.0), ("unknown", "a", 1.0)]),
            EvalOptions::default(),
        );

        assert_eq!(scores.per_query.len(), 2);
        assert_eq!(scores.per_query[1].average_precision, 0.0);
        assert_close(scores.map, 0.5);
        assert!(!scores.map.is_nan());
        assert!(!scores.p_at_5.is_nan());
    }

    #[test]
    fn run_without_judged_queries_scores_zero() {
        let scores = evaluate_run(
            &judgments(&[("q1", "a", 1)]),
            &run(&[("q9", "a", 1.0), ("q8", "b", 1.0)]),
            EvalOptions::default(),
        );
        assert_eq!(scores.map, 0.0);
        assert_eq!(scores.p_at_5, 0.0);

        let empty = evaluate_run(&judgments(&[]), &run(&[]), EvalOptions::default());
        assert_eq!(empty.map, 0.0);
        assert_eq!(empty.p_at_5, 0.0);
        assert!(empty.per_query.is_empty());
    }

    #[test]
    fn equal_scores_break_by_doc_id_descending_by_default() {
        let entries = run(&[("q", "a", 1.0), ("q", "c", 1.0), ("q", "b", 2.0)]);
        let refs = entries.entries.iter().collect::<Vec<&RunEntry>>();

        let ranked = rank_entries(&refs, TieBreak::DocIdDescending);
        let ids = ranked.iter().map(|entry| entry.doc_id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["b", "c", "a"]);

        let ranked = rank_entries(&refs, TieBreak::FileOrder);
        let ids = ranked.iter().map(|entry| entry.doc_id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn tie_break_changes_average_precision() {
        let qrels = judgments(&[("q", "a", 1)]);
        let rows = run(&[("q", "a", 1.0), ("q", "b", 1.0)]);

        let trec = evaluate_run(&qrels, &rows, EvalOptions::default());
        assert_close(trec.map, 0.5);

        let file_order = evaluate_run(
            &qrels,
            &rows,
            EvalOptions {
                tie_break: TieBreak::FileOrder,
                ..EvalOptions::default()
            },
        );
        assert_close(file_order.map, 1.0);
    }

    #[test]
    fn rank_column_is_ignored_in_favour_of_score() {
        let mut rows = run(&[("q", "a", 1.0), ("q", "b", 9.0)]);
        rows.entries[0].rank = 1;
        rows.entries[1].rank = 2;

        let scores = evaluate_run(&judgments(&[("q", "b", 1)]), &rows, EvalOptions::default());
        assert_eq!(scores.map, 1.0);
    }

    #[test]
    fn short_rankings_follow_precision_denominator() {
        let relevance = [true, false];
        assert_close(
            precision_at_k(&relevance, 5, PrecisionDenominator::Cutoff),
            0.2,
        );
        assert_close(
            precision_at_k(&relevance, 5, PrecisionDenominator::Retrieved),
            0.5,
        );
        assert_eq!(precision_at_k(&[], 5, PrecisionDenominator::Retrieved), 0.0);
    }

    #[test]
    fn precision_only_counts_top_five() {
        let relevance = [false, false, false, false, false, true, true];
        assert_eq!(
            precision_at_k(&relevance, 5, PrecisionDenominator::Cutoff),
            0.0
        );
    }

    #[test]
    fn scores_stay_within_unit_interval() {
        let qrels = judgments(&[("q", "a", 1), ("q", "b", 1), ("p", "x", 3)]);
        let rows = run(&[
            ("q", "b", 0.1),
            ("q", "c", 0.9),
            ("q", "a", 0.3),
            ("p", "y", 1.0),
            ("p", "x", -1.0),
            ("r", "x", 2.0),
        ]);

        for tie_break in [TieBreak::DocIdDescending, TieBreak::FileOrder] {
            for precision_denominator in [PrecisionDenominator::Cutoff, PrecisionDenominator::Retrieved]
            {
                let scores = evaluate_run(
                    &qrels,
                    &rows,
                    EvalOptions {
                        tie_break,
                        precision_denominator,
                    },
                );
                for metric in Metric::ALL {
                    let value = scores.value(metric);
                    assert!((0.0..=1.0).contains(&value), "{} out of range", metric.label());
                }
            }
        }
    }
}
