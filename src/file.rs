// src/file.rs

use std::{
    fs,
    io::{BufWriter, Write},
    path::Path,
};

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// Serialize `value` as pretty JSON (2-space indent, trailing newline) and
/// replace `path` in one step. The temp file lives next to the target so the
/// final rename never crosses filesystems; a crash leaves the old file intact.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    ensure_directory(dir)?;

    let tmp = NamedTempFile::new_in(dir)?;
    {
        let mut out = BufWriter::new(tmp.as_file());
        serde_json::to_writer_pretty(&mut out, value).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })?;
        out.write_all(b"\n")?;
        out.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| Error::Persist { path: path.to_path_buf(), source: e.error })?;
    Ok(())
}

pub fn ensure_directory(dir: &Path) -> Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("Path exists but is not a directory: {}", dir.display()),
        )));
    }
    if !dir.exists() { fs::create_dir_all(dir)?; }
    Ok(())
}
