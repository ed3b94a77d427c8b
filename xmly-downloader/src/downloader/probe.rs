use std::io;
use std::path::Path;

use tracing::debug;

/// Size of the regular file at `path`, `None` if there is none.
pub async fn existing_file_size(path: &Path) -> Option<u64> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Some(meta.len()),
        Ok(_) => None,
        Err(e) => {
            if e.kind() != io::ErrorKind::NotFound {
                debug!(path = %path.display(), error = %e, "Failed to stat destination");
            }
            None
        }
    }
}
