//! Storage of member thumbnails pulled from the directory.

use std::path::{Path, PathBuf};

use tracing::debug;

use xavyo_directory::DirectoryGuid;

use crate::error::SyncResult;

/// Write `bytes` as the `field` image of the member bound to `guid` under
/// `dir`.
///
/// The file is named after the GUID and the local field, so a later pull
/// overwrites the previous image instead of accumulating files, and two binary
/// mappings never share a file. The write is not undone if the surrounding
/// sync fails later.
pub async fn store_thumbnail(
    dir: &Path,
    guid: &DirectoryGuid,
    field: &str,
    bytes: &[u8],
) -> SyncResult<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(thumbnail_file_name(guid, field));
    tokio::fs::write(&path, bytes).await?;
    debug!(path = %path.display(), size = bytes.len(), "Stored member thumbnail");
    Ok(path)
}

fn thumbnail_file_name(guid: &DirectoryGuid, field: &str) -> String {
    let field: String = field
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("{}_{}.jpg", guid.file_stem(), field)
}
