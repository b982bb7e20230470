use std::collections::HashSet;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{debug, info, warn};

use crate::model::ArchiveReport;
use crate::progress::{ProgressSink, Stage};
use crate::util::{ensure_directory, is_empty_directory, sha256_file};

pub const REQUIRED_SUBMISSIONS: usize = 3;
pub const RUN_FILE_EXTENSIONS: [&str; 2] = ["res", "txt"];
const ARCHIVE_EXTENSION: &str = "zip";

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MemberKind {
    RunFile,
    PlatformArtifact,
    Directory,
    Other,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RejectionReason {
    NotAnArchive,
    UnreadableArchive(String),
    InvalidTeamName(String),
    OnlyPlatformArtifacts,
    WrongSubmissionCount { found: usize, expected: usize },
    UnsafeMemberPath(String),
    DuplicateTeam(String),
    ExtractionFailed(String),
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnArchive => write!(f, "not a .{ARCHIVE_EXTENSION} archive"),
            Self::UnreadableArchive(detail) => write!(f, "unreadable archive: {detail}"),
            Self::InvalidTeamName(name) => write!(f, "invalid team name: {name:?}"),
            Self::OnlyPlatformArtifacts => write!(f, "archive holds only platform artifacts"),
            Self::WrongSubmissionCount { found, expected } => {
                write!(f, "expected {expected} run files, found {found}")
            }
            Self::UnsafeMemberPath(name) => write!(f, "member path escapes archive: {name}"),
            Self::DuplicateTeam(team) => write!(f, "team already extracted: {team}"),
            Self::ExtractionFailed(detail) => write!(f, "extraction failed: {detail}"),
        }
    }
}

/// `file_name` is the flattened name the member is written under; it is
/// unique within the archive.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RunMember {
    pub index: usize,
    pub file_name: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AcceptedArchive {
    pub team: String,
    pub path: PathBuf,
    pub run_members: Vec<RunMember>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ArchiveVerdict {
    Accepted(AcceptedArchive),
    Rejected(RejectionReason),
}

#[derive(Debug, Clone, Default)]
pub struct ExtractionSummary {
    pub reports: Vec<ArchiveReport>,
    pub extracted_teams: Vec<String>,
}

impl ExtractionSummary {
    pub fn rejected_count(&self) -> usize {
        self.reports
            .iter()
            .filter(|report| !report.is_accepted())
            .count()
    }
}

/// Decides which submissions are admitted and unpacks them.
pub struct SubmissionInspector {
    platform_artifact: Regex,
}

impl SubmissionInspector {
    pub fn new() -> Result<Self> {
        let platform_artifact = Regex::new(r"(^|/)(__MACOSX(/|$)|\._[^/]*$|\.DS_Store$)")
            .context("failed to compile platform artifact regex")?;

        Ok(Self { platform_artifact })
    }

    pub fn classify_member(&self, name: &str) -> MemberKind {
        let name = name.replace('\\', "/");
        if self.platform_artifact.is_match(&name) {
            return MemberKind::PlatformArtifact;
        }
        if name.ends_with('/') {
            return MemberKind::Directory;
        }

        let is_run_file = Path::new(&name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                RUN_FILE_EXTENSIONS
                    .iter()
                    .any(|accepted| ext.eq_ignore_ascii_case(accepted))
            })
            .unwrap_or(false);
        if is_run_file {
            MemberKind::RunFile
        } else {
            MemberKind::Other
        }
    }

    /// The archive's file stem, accepted when it names a single directory
    /// under the extraction root.
    pub fn team_from_path(&self, path: &Path) -> Result<String, RejectionReason> {
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut components = Path::new(&stem).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(stem),
            _ => Err(RejectionReason::InvalidTeamName(stem)),
        }
    }

    /// Admits an archive iff it holds exactly `REQUIRED_SUBMISSIONS` run files
    /// once platform artifacts are ignored.
    pub fn inspect(&self, path: &Path) -> ArchiveVerdict {
        match self.try_inspect(path) {
            Ok(accepted) => ArchiveVerdict::Accepted(accepted),
            Err(reason) => ArchiveVerdict::Rejected(reason),
        }
    }

    fn try_inspect(&self, path: &Path) -> Result<AcceptedArchive, RejectionReason> {
        let is_zip_named = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
            .unwrap_or(false);
        if !is_zip_named || !path.is_file() {
            return Err(RejectionReason::NotAnArchive);
        }

        let team = self.team_from_path(path)?;
        let mut archive = open_archive(path)?;

        let mut run_members = Vec::<RunMember>::new();
        let mut taken = HashSet::<String>::new();
        let mut artifact_count = 0usize;
        let mut other_count = 0usize;
        for index in 0..archive.len() {
            let member = archive
                .by_index(index)
                .map_err(|err| RejectionReason::UnreadableArchive(err.to_string()))?;
            let name = member.name().to_string();

            match self.classify_member(&name) {
                MemberKind::PlatformArtifact => artifact_count += 1,
                MemberKind::Directory => {}
                MemberKind::Other => other_count += 1,
                MemberKind::RunFile => {
                    let file_name = member
                        .enclosed_name()
                        .and_then(|enclosed| {
                            enclosed
                                .file_name()
                                .map(|file_name| file_name.to_string_lossy().into_owned())
                        })
                        .ok_or_else(|| RejectionReason::UnsafeMemberPath(name.clone()))?;
                    let file_name = unique_file_name(&taken, file_name);
                    taken.insert(file_name.clone());
                    run_members.push(RunMember { index, file_name });
                }
            }
        }

        if run_members.is_empty() && other_count == 0 && artifact_count > 0 {
            return Err(RejectionReason::OnlyPlatformArtifacts);
        }
        if run_members.len() != REQUIRED_SUBMISSIONS {
            return Err(RejectionReason::WrongSubmissionCount {
                found: run_members.len(),
                expected: REQUIRED_SUBMISSIONS,
            });
        }

        Ok(AcceptedArchive {
            team,
            path: path.to_path_buf(),
            run_members,
        })
    }

    /// Writes the archive's run files, flattened, into `dest_root/<team>/`.
    /// Creating an existing team directory is a no-op; a populated one is refused.
    pub fn extract(
        &self,
        accepted: &AcceptedArchive,
        dest_root: &Path,
    ) -> Result<PathBuf, RejectionReason> {
        let team_dir = dest_root.join(&accepted.team);
        if team_dir.is_dir()
            && !is_empty_directory(&team_dir)
                .map_err(|err| RejectionReason::ExtractionFailed(err.to_string()))?
        {
            return Err(RejectionReason::DuplicateTeam(accepted.team.clone()));
        }

        let result = write_run_members(accepted, &team_dir);
        if let Err(err) = result {
            if let Err(cleanup_err) = fs::remove_dir_all(&team_dir) {
                warn!(
                    path = %team_dir.display(),
                    error = %cleanup_err,
                    "failed to remove partially extracted team directory"
                );
            }
            return Err(RejectionReason::ExtractionFailed(format!("{err:#}")));
        }

        Ok(team_dir)
    }
}

/// Members from different archive folders may share a file name once
/// flattened; later ones get `-2`, `-3`, ... before the extension.
fn unique_file_name(taken: &HashSet<String>, file_name: String) -> String {
    if !taken.contains(&file_name) {
        return file_name;
    }

    let (stem, extension) = match file_name.rsplit_once('.') {
        Some((stem, extension)) => (stem.to_string(), format!(".{extension}")),
        None => (file_name.clone(), String::new()),
    };
    let mut suffix = 2usize;
    loop {
        let candidate = format!("{stem}-{suffix}{extension}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

fn open_archive(path: &Path) -> Result<zip::ZipArchive<BufReader<File>>, RejectionReason> {
    let file =
        File::open(path).map_err(|err| RejectionReason::UnreadableArchive(err.to_string()))?;
    zip::ZipArchive::new(BufReader::new(file))
        .map_err(|err| RejectionReason::UnreadableArchive(err.to_string()))
}

fn write_run_members(accepted: &AcceptedArchive, team_dir: &Path) -> Result<()> {
    ensure_directory(team_dir)?;
    let mut archive = open_archive(&accepted.path).map_err(|reason| anyhow::anyhow!("{reason}"))?;

    for member in &accepted.run_members {
        let mut source = archive
            .by_index(member.index)
            .with_context(|| format!("failed to read member {}", member.file_name))?;
        let target = team_dir.join(&member.file_name);
        let mut output = File::create(&target)
            .with_context(|| format!("failed to create {}", target.display()))?;
        io::copy(&mut source, &mut output)
            .with_context(|| format!("failed to write {}", target.display()))?;
    }

    Ok(())
}

/// Candidate entries of the submissions directory, sorted by file name.
pub fn list_candidates(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(input_dir)
        .with_context(|| format!("failed to read {}", input_dir.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", input_dir.display()))?;
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

/// Inspects every candidate without writing anything.
pub fn inventory_archives(
    inspector: &SubmissionInspector,
    input_dir: &Path,
) -> Result<Vec<ArchiveReport>> {
    let candidates = list_candidates(input_dir)?;
    let mut reports = Vec::with_capacity(candidates.len());
    for path in candidates {
        let verdict = inspector.inspect(&path);
        log_verdict(&path, &verdict);
        reports.push(build_report(inspector, &path, &verdict));
    }
    Ok(reports)
}

/// Extracts every valid submission under `dest_root`. Invalid submissions are
/// logged and skipped; only failures to list the input directory are errors.
pub fn extract_archives(
    inspector: &SubmissionInspector,
    input_dir: &Path,
    dest_root: &Path,
    progress: &dyn ProgressSink,
) -> Result<ExtractionSummary> {
    let candidates = list_candidates(input_dir)?;
    let total = candidates.len();
    info!(input = %input_dir.display(), candidates = total, "extracting submissions");

    let mut summary = ExtractionSummary::default();
    for (position, path) in candidates.iter().enumerate() {
        let verdict = match inspector.inspect(path) {
            ArchiveVerdict::Accepted(accepted) => match inspector.extract(&accepted, dest_root) {
                Ok(team_dir) => {
                    debug!(team = %accepted.team, path = %team_dir.display(), "extracted submission");
                    summary.extracted_teams.push(accepted.team.clone());
                    ArchiveVerdict::Accepted(accepted)
                }
                Err(reason) => ArchiveVerdict::Rejected(reason),
            },
            rejected => rejected,
        };

        log_verdict(path, &verdict);
        summary.reports.push(build_report(inspector, path, &verdict));
        progress.advance(Stage::Extract, position + 1, total);
    }

    info!(
        extracted = summary.extracted_teams.len(),
        rejected = summary.rejected_count(),
        "extraction complete"
    );
    Ok(summary)
}

fn log_verdict(path: &Path, verdict: &ArchiveVerdict) {
    match verdict {
        ArchiveVerdict::Accepted(accepted) => {
            info!(team = %accepted.team, archive = %path.display(), "submission accepted");
        }
        ArchiveVerdict::Rejected(reason) => {
            warn!(archive = %path.display(), reason = %reason, "submission rejected");
        }
    }
}

/// A candidate that cannot be hashed is still reported, without a digest.
fn archive_digest(path: &Path) -> Option<String> {
    if path.is_dir() {
        return None;
    }
    match sha256_file(path) {
        Ok(digest) => Some(digest),
        Err(err) => {
            warn!(
                archive = %path.display(),
                error = %format!("{err:#}"),
                "failed to hash submission"
            );
            None
        }
    }
}

fn build_report(
    inspector: &SubmissionInspector,
    path: &Path,
    verdict: &ArchiveVerdict,
) -> ArchiveReport {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let sha256 = archive_digest(path);

    match verdict {
        ArchiveVerdict::Accepted(accepted) => ArchiveReport {
            file_name,
            team: Some(accepted.team.clone()),
            sha256,
            status: "accepted".to_string(),
            reason: None,
            run_files: accepted
                .run_members
                .iter()
                .map(|member| member.file_name.clone())
                .collect(),
        },
        ArchiveVerdict::Rejected(reason) => ArchiveReport {
            file_name,
            team: inspector.team_from_path(path).ok(),
            sha256,
            status: "rejected".to_string(),
            reason: Some(reason.to_string()),
            run_files: Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::test_support::{NoProgress, RecordingProgress};
    use crate::run_file::assign_run_names;
    use crate::util::test_support::{scratch_dir, write_file, write_zip};

    const RUN: &str = "q1 Q0 d1 1 1.0 tag\n";

    fn inspector() -> SubmissionInspector {
        SubmissionInspector::new().expect("patterns should compile")
    }

    fn verdict_for(members: &[(&str, &str)]) -> ArchiveVerdict {
        let dir = scratch_dir("inspect");
        let path = dir.join("team-a.zip");
        write_zip(&path, members);
        inspector().inspect(&path)
    }

    #[test]
    fn classify_member_recognizes_run_files_and_artifacts() {
        let inspector = inspector();
        assert_eq!(inspector.classify_member("run1.txt"), MemberKind::RunFile);
        assert_eq!(inspector.classify_member("dir/run2.RES"), MemberKind::RunFile);
        assert_eq!(
            inspector.classify_member("__MACOSX/._run1.txt"),
            MemberKind::PlatformArtifact
        );
        assert_eq!(
            inspector.classify_member("sub/._run1.txt"),
            MemberKind::PlatformArtifact
        );
        assert_eq!(
            inspector.classify_member(".DS_Store"),
            MemberKind::PlatformArtifact
        );
        assert_eq!(
            inspector.classify_member("__MACOSX/"),
            MemberKind::PlatformArtifact
        );
        assert_eq!(inspector.classify_member("runs/"), MemberKind::Directory);
        assert_eq!(inspector.classify_member("README.md"), MemberKind::Other);
        assert_eq!(inspector.classify_member("notes.txt.bak"), MemberKind::Other);
    }

    #[test]
    fn inspect_accepts_exactly_three_run_files() {
        let verdict = verdict_for(&[("run1.txt", RUN), ("run2.txt", RUN), ("run3.res", RUN)]);
        let ArchiveVerdict::Accepted(accepted) = verdict else {
            panic!("expected accepted verdict, got {verdict:?}");
        };
        assert_eq!(accepted.team, "team-a");
        assert_eq!(accepted.run_members.len(), 3);
    }

    #[test]
    fn inspect_rejects_two_or_four_run_files() {
        assert_eq!(
            verdict_for(&[("run1.txt", RUN), ("run2.txt", RUN)]),
            ArchiveVerdict::Rejected(RejectionReason::WrongSubmissionCount {
                found: 2,
                expected: 3
            })
        );
        assert_eq!(
            verdict_for(&[
                ("run1.txt", RUN),
                ("run2.txt", RUN),
                ("run3.txt", RUN),
                ("run4.res", RUN)
            ]),
            ArchiveVerdict::Rejected(RejectionReason::WrongSubmissionCount {
                found: 4,
                expected: 3
            })
        );
    }

    #[test]
    fn inspect_ignores_non_qualifying_members() {
        let verdict = verdict_for(&[
            ("submission/", ""),
            ("submission/run1.txt", RUN),
            ("submission/run2.txt", RUN),
            ("submission/run3.txt", RUN),
            ("submission/README.md", "notes"),
            ("__MACOSX/submission/._run1.txt", "fork"),
            ("submission/.DS_Store", "meta"),
        ]);
        assert!(matches!(verdict, ArchiveVerdict::Accepted(_)));
    }

    #[test]
    fn inspect_rejects_artifact_only_archive() {
        assert_eq!(
            verdict_for(&[("__MACOSX/._run1.txt", "fork"), (".DS_Store", "meta")]),
            ArchiveVerdict::Rejected(RejectionReason::OnlyPlatformArtifacts)
        );
    }

    #[test]
    fn inspect_accepts_runs_sharing_a_name_prefix() {
        let dir = scratch_dir("shared-prefix");
        let path = dir.join("teamx.zip");
        write_zip(
            &path,
            &[
                ("teamx.bm25.txt", RUN),
                ("teamx.dense.txt", RUN),
                ("teamx.hybrid.txt", RUN),
            ],
        );

        let ArchiveVerdict::Accepted(accepted) = inspector().inspect(&path) else {
            panic!("runs sharing a prefix should be accepted");
        };
        let file_names = accepted
            .run_members
            .iter()
            .map(|member| member.file_name.clone())
            .collect::<Vec<String>>();
        assert_eq!(
            assign_run_names(&file_names),
            vec!["teamx.bm25", "teamx.dense", "teamx.hybrid"]
        );
    }

    #[test]
    fn inspect_renames_members_that_collide_when_flattened() {
        let verdict = verdict_for(&[("a/run1.txt", RUN), ("b/run1.txt", RUN), ("run2.txt", RUN)]);
        let ArchiveVerdict::Accepted(accepted) = verdict else {
            panic!("expected accepted verdict, got {verdict:?}");
        };
        let file_names = accepted
            .run_members
            .iter()
            .map(|member| member.file_name.clone())
            .collect::<Vec<String>>();
        assert_eq!(file_names, vec!["run1.txt", "run1-2.txt", "run2.txt"]);

        let names = assign_run_names(&file_names);
        assert_eq!(names, vec!["run1", "run1-2", "run2"]);
    }

    #[test]
    fn inspect_rejects_non_zip_inputs() {
        let dir = scratch_dir("not-zip");
        let text = dir.join("team-b.txt");
        write_file(&text, "hello");
        assert_eq!(
            inspector().inspect(&text),
            ArchiveVerdict::Rejected(RejectionReason::NotAnArchive)
        );

        let fake = dir.join("team-c.zip");
        write_file(&fake, "definitely not a zip");
        assert!(matches!(
            inspector().inspect(&fake),
            ArchiveVerdict::Rejected(RejectionReason::UnreadableArchive(_))
        ));
    }

    #[test]
    fn team_from_path_accepts_any_single_component() {
        let inspector = inspector();
        for name in ["Team Rocket", "team+1", "Team(A)", "o'brien", ".hidden"] {
            assert_eq!(
                inspector.team_from_path(&Path::new("in").join(format!("{name}.zip"))),
                Ok(name.to_string())
            );
        }
        assert_eq!(
            inspector.team_from_path(Path::new("in/..zip")),
            Err(RejectionReason::InvalidTeamName(".".to_string()))
        );
        assert!(inspector.team_from_path(Path::new("in/...zip")).is_err());
    }

    #[test]
    fn inspect_accepts_punctuated_team_names() {
        let dir = scratch_dir("punctuated");
        let path = dir.join("team+1.zip");
        write_zip(&path, &[("a.txt", RUN), ("b.txt", RUN), ("c.txt", RUN)]);

        let ArchiveVerdict::Accepted(accepted) = inspector().inspect(&path) else {
            panic!("team+1.zip should be accepted");
        };
        assert_eq!(accepted.team, "team+1");
    }

    #[test]
    fn escaping_member_is_rejected_and_nothing_leaks() {
        let root = scratch_dir("escape");
        let input = root.join("in");
        let output = root.join("out").join("dest");
        fs::create_dir_all(&input).unwrap();
        fs::create_dir_all(&output).unwrap();
        write_zip(
            &input.join("mallory.zip"),
            &[("../escape.txt", RUN), ("run2.txt", RUN), ("run3.txt", RUN)],
        );

        let summary = extract_archives(&inspector(), &input, &output, &NoProgress).unwrap();

        assert!(summary.extracted_teams.is_empty());
        assert_eq!(
            summary.reports[0].reason.as_deref(),
            Some("member path escapes archive: ../escape.txt")
        );
        assert!(is_empty_directory(&output).unwrap());
        assert!(!root.join("out").join("escape.txt").exists());
        assert!(!output.join("mallory").exists());
    }

    #[test]
    fn failed_extraction_removes_partial_team_directory() {
        let input = scratch_dir("partial-in");
        let output = scratch_dir("partial-out");
        let archive = input.join("omega.zip");
        write_zip(&archive, &[("r1.txt", RUN), ("r2.txt", RUN), ("r3.txt", RUN)]);

        let broken = AcceptedArchive {
            team: "omega".to_string(),
            path: archive,
            run_members: vec![
                RunMember {
                    index: 0,
                    file_name: "r1.txt".to_string(),
                },
                RunMember {
                    index: 1,
                    file_name: "r2.txt".to_string(),
                },
                RunMember {
                    index: 7,
                    file_name: "missing.txt".to_string(),
                },
            ],
        };

        let result = inspector().extract(&broken, &output);
        assert!(matches!(result, Err(RejectionReason::ExtractionFailed(_))));
        assert!(!output.join("omega").exists());
    }

    #[test]
    fn unhashable_candidate_is_reported_without_digest() {
        let dir = scratch_dir("digest");
        assert_eq!(archive_digest(&dir.join("vanished.zip")), None);
        assert_eq!(archive_digest(&dir), None);

        let report = build_report(
            &inspector(),
            &dir.join("vanished.zip"),
            &ArchiveVerdict::Rejected(RejectionReason::NotAnArchive),
        );
        assert_eq!(report.sha256, None);
        assert_eq!(report.team.as_deref(), Some("vanished"));
        assert_eq!(report.status, "rejected");
    }

    #[test]
    fn extract_archives_materializes_valid_teams_only() {
        let input = scratch_dir("extract-in");
        let output = scratch_dir("extract-out");
        write_zip(
            &input.join("alpha.zip"),
            &[("nested/run1.txt", RUN), ("run2.txt", RUN), ("run3.txt", RUN)],
        );
        write_zip(&input.join("beta.zip"), &[("run1.txt", RUN)]);
        write_file(&input.join("notes.md"), "ignore me");

        let progress = RecordingProgress::default();
        let summary = extract_archives(&inspector(), &input, &output, &progress).unwrap();

        assert_eq!(summary.extracted_teams, vec!["alpha".to_string()]);
        assert_eq!(summary.rejected_count(), 2);
        assert!(output.join("alpha").join("run1.txt").is_file());
        assert!(output.join("alpha").join("run3.txt").is_file());
        assert!(!output.join("beta").exists());
        assert_eq!(
            fs::read_to_string(output.join("alpha").join("run1.txt")).unwrap(),
            RUN
        );

        let events = progress.events.borrow();
        assert_eq!(events.len(), 3);
        assert_eq!(events.last(), Some(&(Stage::Extract, 3, 3)));

        let alpha = &summary.reports[0];
        assert_eq!(alpha.file_name, "alpha.zip");
        assert!(alpha.is_accepted());
        assert_eq!(alpha.sha256.as_deref().map(str::len), Some(64));
    }

    #[test]
    fn extract_refuses_populated_team_directory() {
        let input = scratch_dir("dup-in");
        let output = scratch_dir("dup-out");
        let archive = input.join("gamma.zip");
        write_zip(&archive, &[("r1.txt", RUN), ("r2.txt", RUN), ("r3.txt", RUN)]);

        let inspector = inspector();
        let ArchiveVerdict::Accepted(accepted) = inspector.inspect(&archive) else {
            panic!("fixture archive should be accepted");
        };
        inspector.extract(&accepted, &output).unwrap();
        assert_eq!(
            inspector.extract(&accepted, &output),
            Err(RejectionReason::DuplicateTeam("gamma".to_string()))
        );

        fs::create_dir_all(output.join("delta")).unwrap();
        let reused = AcceptedArchive {
            team: "delta".to_string(),
            ..accepted
        };
        assert!(inspector.extract(&reused, &output).is_ok());
    }

    #[test]
    fn inventory_archives_writes_nothing() {
        let input = scratch_dir("inventory-in");
        write_zip(
            &input.join("alpha.zip"),
            &[("run1.txt", RUN), ("run2.txt", RUN), ("run3.txt", RUN)],
        );
        write_zip(&input.join("beta.zip"), &[("run1.txt", RUN), ("run2.txt", RUN)]);

        let reports = inventory_archives(&inspector(), &input).unwrap();
        assert_eq!(reports.len(), 2);
        assert!(reports[0].is_accepted());
        assert_eq!(reports[1].team.as_deref(), Some("beta"));
        assert_eq!(
            reports[1].reason.as_deref(),
            Some("expected 3 run files, found 2")
        );
        assert_eq!(list_candidates(&input).unwrap().len(), 2);
    }
}
