use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::ParseError;

/// Ground truth: query id -> document id -> relevance grade.
///
/// A document counts as relevant when its grade is positive, matching
/// trec_eval's default relevance level of 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelevanceJudgments {
    queries: HashMap<String, HashMap<String, i32>>,
}

impl RelevanceJudgments {
    pub fn insert(&mut self, query_id: &str, doc_id: &str, grade: i32) {
        self.queries
            .entry(query_id.to_string())
            .or_default()
            .insert(doc_id.to_string(), grade);
    }

    pub fn grade(&self, query_id: &str, doc_id: &str) -> Option<i32> {
        self.queries.get(query_id)?.get(doc_id).copied()
    }

    pub fn is_relevant(&self, query_id: &str, doc_id: &str) -> bool {
        self.grade(query_id, doc_id).is_some_and(|grade| grade > 0)
    }

    /// Judged-relevant documents for a query; zero for unknown queries.
    pub fn relevant_count(&self, query_id: &str) -> usize {
        self.queries
            .get(query_id)
            .map(|docs| docs.values().filter(|grade| **grade > 0).count())
            .unwrap_or(0)
    }

    pub fn contains_query(&self, query_id: &str) -> bool {
        self.queries.contains_key(query_id)
    }

    pub fn query_count(&self) -> usize {
        self.queries.len()
    }

    pub fn judgment_count(&self) -> usize {
        self.queries.values().map(HashMap::len).sum()
    }
}

pub fn load_qrels(path: &Path) -> Result<RelevanceJudgments, ParseError> {
    let file = File::open(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_qrels(BufReader::new(file), path)
}

/// Parses `query-id iteration document-id grade` lines. The iteration column
/// is ignored. Blank lines are skipped; a repeated (query, document) pair
/// keeps the grade from its last line.
pub fn parse_qrels<R: BufRead>(reader: R, path: &Path) -> Result<RelevanceJudgments, ParseError> {
    let mut judgments = RelevanceJudgments::default();

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line.map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let malformed = |reason: String| ParseError::Qrels {
            path: path.to_path_buf(),
            line: line_number,
            reason,
        };

        let fields = line.split_whitespace().collect::<Vec<&str>>();
        let [query_id, _iteration, doc_id, grade] = fields.as_slice() else {
            return Err(malformed(format!(
                "expected 4 fields, found {}",
                fields.len()
            )));
        };
        let grade = grade
            .parse::<i32>()
            .map_err(|_| malformed(format!("relevance grade is not an integer: {grade}")))?;

        judgments.insert(query_id, doc_id, grade);
    }

    Ok(judgments)
}
