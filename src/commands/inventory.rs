use std::path::Path;

use anyhow::{Result, bail};
use tracing::info;

use crate::archive::{SubmissionInspector, inventory_archives};
use crate::cli::InventoryArgs;
use crate::model::SubmissionInventoryManifest;
use crate::util::{now_utc_string, write_json_pretty};

const DEFAULT_MANIFEST_PATH: &str = "submission_inventory.json";

pub fn run(args: InventoryArgs) -> Result<()> {
    let manifest = build_manifest(&args.input)?;

    if args.dry_run {
        info!(
            archive_count = manifest.archive_count,
            accepted = manifest.accepted_count,
            rejected = manifest.rejected_count,
            source = %manifest.source_directory,
            "inventory dry-run complete"
        );
        return Ok(());
    }

    let manifest_path = args
        .manifest_path
        .unwrap_or_else(|| Path::new(DEFAULT_MANIFEST_PATH).to_path_buf());

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote submission inventory");
    info!(
        accepted = manifest.accepted_count,
        rejected = manifest.rejected_count,
        "inventory completed"
    );

    Ok(())
}

pub fn build_manifest(input_dir: &Path) -> Result<SubmissionInventoryManifest> {
    if !input_dir.is_dir() {
        bail!("input directory does not exist: {}", input_dir.display());
    }

    let inspector = SubmissionInspector::new()?;
    let archives = inventory_archives(&inspector, input_dir)?;
    let accepted_count = archives.iter().filter(|report| report.is_accepted()).count();

    Ok(SubmissionInventoryManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        source_directory: input_dir.display().to_string(),
        archive_count: archives.len(),
        accepted_count,
        rejected_count: archives.len() - accepted_count,
        archives,
    })
}
