/*!
 * File Metadata
 * Executable metadata read from the filesystem
 */

use super::traits::FileInfoProvider;
use super::types::FileInfo;
use tracing::debug;

/// Reads executable metadata with `std::fs::metadata`
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFileInfoProvider;

impl FileInfoProvider for FsFileInfoProvider {
    fn file_info(&self, path: &str) -> Option<FileInfo> {
        if path.is_empty() {
            return None;
        }

        let metadata = match std::fs::metadata(path) {
            Ok(m) => m,
            Err(e) => {
                debug!(path, error = %e, "no file info");
                return None;
            }
        };

        let mut info = FileInfo {
            path: path.to_string(),
            size: metadata.len(),
            modified: metadata.modified().ok(),
            ..Default::default()
        };

        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            info.mode = metadata.mode();
            info.owner_uid = Some(metadata.uid());
            info.is_executable = metadata.is_file() && metadata.mode() & 0o111 != 0;
        }

        #[cfg(not(unix))]
        {
            info.is_executable = metadata.is_file();
        }

        Some(info)
    }
}
