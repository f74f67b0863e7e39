//! Parser module: file loading and dispatch to the header and source
//! scanners.

pub mod cpp;
pub mod header;
pub mod source;

use crate::model::{FileId, FileKind};
use crate::registry::Registry;
use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::Path;

/// Reads a file as text. Bytes that are not UTF-8 are replaced rather than
/// rejected; C++ sources in the wild carry Latin-1 comments.
fn read_text(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Reads and scans a source file. A read failure is fatal.
pub fn scan_source_file(reg: &mut Registry, path: &Path) -> Result<FileId> {
    log::debug!("scanning source file {}", path.display());
    let contents =
        read_text(path).with_context(|| format!("failed to read {}", path.display()))?;
    let id = reg.add_file(path.to_path_buf(), FileKind::Source, contents);
    source::scan(reg, id)?;
    Ok(id)
}

/// Reads and scans a header file. Returns `Ok(None)` if the file does not
/// exist; any other read failure is fatal.
pub fn scan_header_file(reg: &mut Registry, path: &Path) -> Result<Option<FileId>> {
    log::debug!("scanning header file {}", path.display());
    let contents = match read_text(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read header {}", path.display()))
        }
    };
    let id = reg.add_file(path.to_path_buf(), FileKind::Header, contents);
    header::scan(reg, id);
    Ok(Some(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn latin1_source_decoded_lossily() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cafe.cpp");
        fs::write(&path, b"/*! Serves caf\xe9 au lait. */\nvoid Bar::serve()\n{\n}\n").unwrap();

        let mut reg = Registry::new();
        scan_source_file(&mut reg, &path).unwrap();
        let f = reg.find_function("Bar::serve", Some("()"), false).unwrap();
        let doc = reg.doc(reg.function(f).doc.unwrap());
        assert_eq!(doc.text.trim_end(), "Serves caf\u{fffd} au lait.");
        assert!(reg.diagnostics.is_empty());
    }

    #[test]
    fn missing_header_is_none() {
        let dir = TempDir::new().unwrap();
        let mut reg = Registry::new();
        let found = scan_header_file(&mut reg, &dir.path().join("absent.h")).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn unreadable_source_is_fatal() {
        let dir = TempDir::new().unwrap();
        let mut reg = Registry::new();
        let err = scan_source_file(&mut reg, &dir.path().join("absent.cpp")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
