use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub struct RunEntry {
    pub query_id: String,
    pub doc_id: String,
    pub rank: i64,
    pub score: f64,
    /// 1-based line in the source file.
    pub line: usize,
}

/// One submitted ranking, entries in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct RunFile {
    pub name: String,
    pub entries: Vec<RunEntry>,
}

impl RunFile {
    /// Entries grouped by query id, each group still in file order.
    pub fn by_query(&self) -> Vec<(&str, Vec<&RunEntry>)> {
        let mut order = Vec::<&str>::new();
        let mut groups = HashMap::<&str, Vec<&RunEntry>>::new();
        for entry in &self.entries {
            let group = groups.entry(entry.query_id.as_str()).or_insert_with(|| {
                order.push(entry.query_id.as_str());
                Vec::new()
            });
            group.push(entry);
        }

        order
            .into_iter()
            .map(|query_id| (query_id, groups.remove(query_id).unwrap_or_default()))
            .collect()
    }

    pub fn query_count(&self) -> usize {
        self.by_query().len()
    }
}

/// Run name as the reporting layer shows it: the file name up to its first dot.
pub fn run_name_from_path(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    file_name
        .split('.')
        .next()
        .unwrap_or_default()
        .to_string()
}

fn name_without_last_extension(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((head, _)) if !head.is_empty() => head.to_string(),
        _ => file_name.to_string(),
    }
}

/// Run names for the files of one team, in the same order. Each file gets
/// its name up to the first dot; when that collides within the team it falls
/// back to the name without its last extension, then to the full file name.
/// Anything still colliding gets a numeric suffix.
pub fn assign_run_names(file_names: &[String]) -> Vec<String> {
    let short = file_names
        .iter()
        .map(|file_name| run_name_from_path(Path::new(file_name)))
        .collect::<Vec<String>>();
    let long = file_names
        .iter()
        .map(|file_name| name_without_last_extension(file_name))
        .collect::<Vec<String>>();
    let is_unique = |names: &[String], name: &str| names.iter().filter(|n| *n == name).count() == 1;

    let mut taken = HashSet::<String>::new();
    let mut assigned = Vec::with_capacity(file_names.len());
    for (index, file_name) in file_names.iter().enumerate() {
        let preferred = if is_unique(&short, &short[index]) {
            short[index].clone()
        } else if is_unique(&long, &long[index]) {
            long[index].clone()
        } else {
            file_name.clone()
        };

        let mut name = preferred.clone();
        let mut suffix = 2usize;
        while taken.contains(&name) {
            name = format!("{preferred}-{suffix}");
            suffix += 1;
        }
        taken.insert(name.clone());
        assigned.push(name);
    }
    assigned
}

pub fn load_run(path: &Path, name: &str) -> Result<RunFile, ParseError> {
    let file = File::open(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let entries = parse_run_entries(BufReader::new(file), path)?;
    Ok(RunFile {
        name: name.to_string(),
        entries,
    })
}

/// Parses `query-id Q0 document-id rank score tag` lines. A document listed
/// twice for one query keeps only its last row, at the position of that row.
pub fn parse_run_entries<R: BufRead>(reader: R, path: &Path) -> Result<Vec<RunEntry>, ParseError> {
    let mut entries = Vec::<Option<RunEntry>>::new();
    let mut seen = HashMap::<(String, String), usize>::new();

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line.map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let malformed = |reason: String| ParseError::Run {
            path: path.to_path_buf(),
            line: line_number,
            reason,
        };

        let fields = line.split_whitespace().collect::<Vec<&str>>();
        let [query_id, _q0, doc_id, rank, score, _tag] = fields.as_slice() else {
            return Err(malformed(format!(
                "expected 6 fields, found {}",
                fields.len()
            )));
        };
        let rank = rank
            .parse::<i64>()
            .map_err(|_| malformed(format!("rank is not an integer: {rank}")))?;
        let score = score
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| malformed(format!("score is not a finite number: {score}")))?;

        let key = (query_id.to_string(), doc_id.to_string());
        if let Some(previous) = seen.insert(key, entries.len()) {
            entries[previous] = None;
        }
        entries.push(Some(RunEntry {
            query_id: query_id.to_string(),
            doc_id: doc_id.to_string(),
            rank,
            score,
            line: line_number,
        }));
    }

    Ok(entries.into_iter().flatten().collect())
}
