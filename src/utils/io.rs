use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;

use crate::error::ArtifactError;

pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, ArtifactError> {
    bincode::serialize(value).map_err(|e| ArtifactError::Encode(e.to_string()))
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ArtifactError> {
    bincode::deserialize(bytes).map_err(|e| ArtifactError::Decode(e.to_string()))
}

/// Writes through a sibling temp file and renames it into place, so readers
/// never observe a half-written file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}

/// Reads a file, mapping "not found" to `None`.
pub fn read_if_exists(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Removes a file, treating "already gone" as success.
pub fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_write_creates_parent_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("file.bin");
        write_atomic(&path, b"abc").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"abc");
        assert!(!dir.path().join("nested").join("file.bin.tmp").exists());
    }

    #[test]
    fn missing_files_are_none_and_removal_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.bin");
        assert!(read_if_exists(&path).unwrap().is_none());
        remove_if_exists(&path).unwrap();
    }

    #[test]
    fn decode_garbage_fails() {
        let err = decode::<Vec<String>>(&[0xff, 0xff, 0xff]).unwrap_err();
        assert!(matches!(err, ArtifactError::Decode(_)));
    }
}
