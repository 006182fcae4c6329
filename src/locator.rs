//! Byte offset to line/column mapping.
//!
//! xmllint reports positions as 1-based byte offsets. The locator streams the
//! file up to that offset and converts it to a zero-based line and column,
//! so arbitrarily large documents never have to be loaded into memory.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ActionError, ContractViolation, Result};

const CHUNK_SIZE: usize = 8 * 1024;

/// Zero-based position of a byte inside a text file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: u64,
    pub column: u64,
}

/// Locate the byte at 1-based `position` inside `path`.
pub fn locate(path: &Path, position: u64) -> Result<Location> {
    let file = File::open(path)?;
    locate_in(BufReader::new(file), position).map_err(|error| match error {
        LocateError::OutOfRange { length } => ContractViolation::OffsetOutOfRange {
            file: path.to_path_buf(),
            position,
            length,
        }
        .into(),
        LocateError::Io(e) => ActionError::Io(e),
    })
}

/// Failure modes of [`locate_in`], before a file name is attached.
#[derive(Debug)]
pub enum LocateError {
    /// The reader ended (or `position` was 0) before the requested byte.
    OutOfRange { length: u64 },
    Io(std::io::Error),
}

impl From<std::io::Error> for LocateError {
    fn from(err: std::io::Error) -> Self {
        LocateError::Io(err)
    }
}

/// Locate the byte at 1-based `position` in a byte stream.
///
/// Reads exactly `position` bytes: the ones before the target are scanned for
/// newlines, the target itself is only required to exist.
pub fn locate_in<R: Read>(
    mut reader: R,
    position: u64,
) -> std::result::Result<Location, LocateError> {
    let Some(index) = position.checked_sub(1) else {
        return Err(LocateError::OutOfRange { length: 0 });
    };

    let mut line = 0;
    let mut line_start = 0;
    let mut consumed = 0;
    let mut buffer = [0u8; CHUNK_SIZE];
    let mut head = (&mut reader).take(index);

    loop {
        let read = match head.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };

        for (offset, _) in buffer[..read]
            .iter()
            .enumerate()
            .filter(|(_, byte)| **byte == b'\n')
        {
            line += 1;
            line_start = consumed + offset as u64 + 1;
        }
        consumed += read as u64;
    }

    if consumed < index {
        return Err(LocateError::OutOfRange { length: consumed });
    }

    let mut target = [0u8; 1];
    match reader.read_exact(&mut target) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
            return Err(LocateError::OutOfRange { length: consumed });
        }
        Err(e) => return Err(e.into()),
    }

    Ok(Location {
        line,
        column: index - line_start,
    })
}
