//! Shared persistence plumbing for the stores
//!
//! Both stores write the same way: back up the previous file to `.bak`,
//! write the new contents to a temp file beside the target, rename it into
//! place, and tighten permissions to owner read/write only. The rename
//! makes the replace atomic on the same filesystem; a crash mid-save
//! leaves either the old file or the new one, never a torn mix.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Path of the backup copy kept beside a store file.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

/// Copy an existing file to its `.bak` sibling. Missing originals are fine.
pub fn create_backup(path: &Path) -> io::Result<()> {
    if !path.exists() {
        return Ok(());
    }
    fs::copy(path, backup_path(path))?;
    Ok(())
}

/// Atomically replace `path` with `contents` via a temp file + rename,
/// then restrict permissions to owner read/write.
pub fn atomic_write(path: &Path, contents: &str) -> io::Result<()> {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    restrict_permissions(path)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}
