//! Purpose: Zip local-file-header sniffing for candidate archives.
//! Exports: `ZIP_FILE_HEADER`, `is_zip`, `is_zip_reader`.
//! Role: Gate that keeps non-archive dependencies from ever being opened as zips.
//! Invariants: Signature bytes are exactly `50 4B 03 04`.
//! Invariants: Files shorter than the signature are "not a zip"; other I/O errors surface.
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::core::error::{Error, ErrorKind};

pub const ZIP_FILE_HEADER: [u8; 4] = [b'P', b'K', 3, 4];

pub fn is_zip(path: &Path) -> Result<bool, Error> {
    let mut file = File::open(path).map_err(|err| {
        Error::new(ErrorKind::Input)
            .with_message("failed to open candidate archive")
            .with_path(path)
            .with_source(err)
    })?;
    is_zip_reader(&mut file).map_err(|err| {
        Error::new(ErrorKind::Input)
            .with_message("failed to read archive signature")
            .with_path(path)
            .with_source(err)
    })
}

pub fn is_zip_reader(reader: &mut impl Read) -> io::Result<bool> {
    let mut header = [0u8; ZIP_FILE_HEADER.len()];
    let mut filled = 0;
    while filled < header.len() {
        match reader.read(&mut header[filled..]) {
            Ok(0) => return Ok(false),
            Ok(read) => filled += read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(header == ZIP_FILE_HEADER)
}
