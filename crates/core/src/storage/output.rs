use crate::render::{COVER_FILE, PAGE_FILE};
use anyhow::Context;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedPaths {
    pub cover: PathBuf,
    pub page: PathBuf,
}

/// Writes the cover image and the page into `output_dir`, replacing any previous run.
/// Both are staged as sibling temp files first; only once both are on disk are they renamed
/// over the old files, cover first. Each file is swapped whole, but the pair is not swapped
/// as one unit: a reader between the two renames sees the new cover with the old page.
pub async fn commit_artifacts(
    output_dir: &Path,
    page_html: &str,
    cover_bytes: &[u8],
) -> anyhow::Result<CommittedPaths> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("failed to create output dir {}", output_dir.display()))?;

    let cover = output_dir.join(COVER_FILE);
    let page = output_dir.join(PAGE_FILE);

    let cover_tmp = stage(&cover, cover_bytes).await?;
    let page_tmp = match stage(&page, page_html.as_bytes()).await {
        Ok(tmp) => tmp,
        Err(err) => {
            let _ = tokio::fs::remove_file(&cover_tmp).await;
            return Err(err);
        }
    };

    // Image first: the page references it by name.
    swap_in(&cover_tmp, &cover).await?;
    swap_in(&page_tmp, &page).await?;

    Ok(CommittedPaths { cover, page })
}

fn temp_path(path: &Path) -> anyhow::Result<PathBuf> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("invalid output path {}", path.display()))?;
    Ok(path.with_file_name(format!(".{file_name}.tmp")))
}

async fn stage(path: &Path, contents: &[u8]) -> anyhow::Result<PathBuf> {
    let tmp = temp_path(path)?;
    tokio::fs::write(&tmp, contents)
        .await
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    Ok(tmp)
}

async fn swap_in(tmp: &Path, path: &Path) -> anyhow::Result<()> {
    tokio::fs::rename(tmp, path)
        .await
        .with_context(|| format!("failed to move {} into place", path.display()))
}
