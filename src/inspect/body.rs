//! Response body output.

use std::fs::Permissions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::error_handling::OutputError;
use crate::fetch::ExecutionResult;

/// Where the response body goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyTarget {
    /// Standard output
    Stdout,
    /// A file, replaced only once the whole body has been received
    File(PathBuf),
}

impl BodyTarget {
    /// `File` when a path is given, `Stdout` otherwise.
    pub fn from_path(path: Option<&Path>) -> Self {
        match path {
            Some(path) => BodyTarget::File(path.to_path_buf()),
            None => BodyTarget::Stdout,
        }
    }
}

/// Copies the remaining body to `out` and returns the number of bytes copied.
pub async fn copy_body(result: &mut ExecutionResult, out: &mut impl Write) -> Result<u64> {
    let mut written = 0u64;
    while let Some(chunk) = result.next_chunk().await? {
        out.write_all(&chunk).map_err(OutputError::Write)?;
        written += chunk.len() as u64;
    }
    out.flush().map_err(OutputError::Write)?;
    Ok(written)
}

/// Writes the remaining body to `target`.
///
/// File output goes to a temporary file next to the destination, which is
/// renamed into place only after the last chunk, so a failure leaves no
/// partial file behind. An existing destination keeps its permissions, and a
/// symlinked destination is replaced at its target.
pub async fn write_body(result: &mut ExecutionResult, target: &BodyTarget) -> Result<u64> {
    match target {
        BodyTarget::Stdout => {
            let mut stdout = std::io::stdout();
            copy_body(result, &mut stdout).await
        }
        BodyTarget::File(path) => {
            let (dest, existing) = destination(path);
            let dir = dest
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));

            #[cfg_attr(not(unix), allow(unused_mut))]
            let mut builder = tempfile::Builder::new();
            // Same mode a plain create would give: 0666 before the umask
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                builder.permissions(Permissions::from_mode(0o666));
            }
            let mut file = builder
                .tempfile_in(dir)
                .map_err(|source| OutputError::CreateFile {
                    path: path.clone(),
                    source,
                })?;

            let written = copy_body(result, file.as_file_mut()).await?;
            if let Some(permissions) = existing {
                file.as_file()
                    .set_permissions(permissions)
                    .map_err(|source| OutputError::CreateFile {
                        path: path.clone(),
                        source,
                    })?;
            }
            file.persist(&dest).map_err(|e| OutputError::Persist {
                path: path.clone(),
                source: e.error,
            })?;
            log::debug!("Wrote {written} byte(s) to {}", dest.display());
            Ok(written)
        }
    }
}

/// Resolves symlinks of an existing destination and returns its permissions.
fn destination(path: &Path) -> (PathBuf, Option<Permissions>) {
    match std::fs::metadata(path) {
        Ok(meta) => {
            let dest = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
            (dest, Some(meta.permissions()))
        }
        Err(_) => (path.to_path_buf(), None),
    }
}
