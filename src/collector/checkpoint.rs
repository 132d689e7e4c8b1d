use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{AppError, Result};

/// Durably record the index of the next symbol to process.
pub fn write_checkpoint(path: impl AsRef<Path>, index: usize) -> Result<()> {
    fs::write(path, index.to_string())?;
    Ok(())
}

/// Read the checkpoint back. A missing file means a fresh start (index 0);
/// a file we cannot parse is a real error.
pub fn read_checkpoint(path: impl AsRef<Path>) -> Result<usize> {
    let contents = match fs::read_to_string(path.as_ref()) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(0),
        Err(err) => return Err(err.into()),
    };

    contents.trim().parse().map_err(|_| {
        AppError::message(format!(
            "checkpoint file {} does not contain an index",
            path.as_ref().display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_an_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.txt");

        write_checkpoint(&path, 42).unwrap();
        assert_eq!(read_checkpoint(&path).unwrap(), 42);

        // Overwrite, not append.
        write_checkpoint(&path, 7).unwrap();
        assert_eq!(read_checkpoint(&path).unwrap(), 7);
    }

    #[test]
    fn missing_file_means_start_of_list() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_checkpoint(dir.path().join("absent.txt")).unwrap(), 0);
    }

    #[test]
    fn garbled_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.txt");
        std::fs::write(&path, "not-a-number").unwrap();
        assert!(read_checkpoint(&path).is_err());
    }
}
