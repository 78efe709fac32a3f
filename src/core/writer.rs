//! Purpose: Sequential zip writer for the repackaged output archive.
//! Exports: `ArchiveWriter`, `NestedEntry`, bootstrap entry names.
//! Role: Owns the output file handle; the assembler drives it in protocol order.
//! Invariants: Bootstrap entries are raw-copied (no recompression, source order kept).
//! Invariants: Nested libraries are stored uncompressed as opaque archives.
//! Invariants: An entry name is written at most once; parent directories precede entries.
//! Invariants: Errors from the final fsync are logged and swallowed.
use std::collections::HashSet;
use std::fs::{File, Metadata, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::core::classify::open_archive;
use crate::core::error::{Error, ErrorKind};
use crate::core::library::{Library, LibraryScope};

pub const MANIFEST_ENTRY: &str = "META-INF/MANIFEST.MF";
pub const BOOTSTRAP_PREFIX: &str = "com/alipay/sofa/ark/bootstrap/";

const BOOTSTRAP_ROOTS: [&str; 2] = [MANIFEST_ENTRY, BOOTSTRAP_PREFIX];
const COPY_BUFFER_LEN: usize = 64 * 1024;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NestedEntry {
    pub library: String,
    pub scope: LibraryScope,
    pub entry: String,
    pub size: u64,
    pub sha256: String,
}

pub struct ArchiveWriter {
    path: PathBuf,
    zip: ZipWriter<BufWriter<File>>,
    written: HashSet<String>,
}

impl ArchiveWriter {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&path)
            .map_err(|err| write_error(&path, err).with_message("failed to create output archive"))?;
        Ok(Self {
            zip: ZipWriter::new(BufWriter::new(file)),
            path,
            written: HashSet::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copies the manifest and bootstrap classes of `source` verbatim.
    pub fn write_bootstrap_entries(&mut self, source: &Path) -> Result<usize, Error> {
        let mut archive = open_archive(source)?;
        let mut copied = 0;
        for index in 0..archive.len() {
            let entry = archive.by_index_raw(index).map_err(|err| {
                Error::new(ErrorKind::Input)
                    .with_message("failed to read bootstrap entry")
                    .with_path(source)
                    .with_source(err)
            })?;
            let name = entry.name().to_string();
            if !is_bootstrap_entry(&name) || self.written.contains(&name) {
                continue;
            }
            self.zip
                .raw_copy_file(entry)
                .map_err(|err| write_error(&self.path, err).with_destination(&name))?;
            self.written.insert(name);
            copied += 1;
        }
        debug!(source = %source.display(), copied, "copied bootstrap entries");
        Ok(copied)
    }

    /// Writes the full bytes of `library` as a single stored entry named `entry_name`.
    pub fn write_nested_library(
        &mut self,
        entry_name: &str,
        library: &Library,
    ) -> Result<NestedEntry, Error> {
        if self.written.contains(entry_name) {
            return Err(Error::new(ErrorKind::LayoutConflict)
                .with_message(format!("duplicate library {}", library.name()))
                .with_library(library.name())
                .with_destination(entry_name));
        }

        let mut file = File::open(library.file()).map_err(|err| library_error(library, err))?;
        let metadata = file.metadata().map_err(|err| library_error(library, err))?;
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .last_modified_time(modified_time(&metadata))
            .large_file(metadata.len() >= u64::from(u32::MAX));

        self.write_parent_directories(entry_name)?;
        self.zip
            .start_file(entry_name, options)
            .map_err(|err| write_error(&self.path, err).with_destination(entry_name))?;

        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; COPY_BUFFER_LEN];
        let mut size = 0u64;
        loop {
            let read = match file.read(&mut buf) {
                Ok(0) => break,
                Ok(read) => read,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(library_error(library, err)),
            };
            hasher.update(&buf[..read]);
            self.zip.write_all(&buf[..read]).map_err(|err| {
                write_error(&self.path, err)
                    .with_library(library.name())
                    .with_destination(entry_name)
            })?;
            size += read as u64;
        }
        self.written.insert(entry_name.to_string());

        Ok(NestedEntry {
            library: library.name().to_string(),
            scope: library.scope(),
            entry: entry_name.to_string(),
            size,
            sha256: hex_digest(&hasher.finalize()),
        })
    }

    /// Writes the central directory and flushes; an fsync failure afterwards is only logged.
    pub fn finish(self) -> Result<PathBuf, Error> {
        let Self { path, zip, .. } = self;
        let buffered = zip
            .finish()
            .map_err(|err| write_error(&path, err).with_message("failed to finalize archive"))?;
        let file = buffered.into_inner().map_err(|err| {
            write_error(&path, err.into_error()).with_message("failed to flush archive")
        })?;
        sync_quietly(&file, &path);
        Ok(path)
    }

    /// Best-effort close after a failed assembly; nothing here is escalated.
    pub fn abandon(self) {
        let Self { path, zip, .. } = self;
        match zip.finish() {
            Ok(buffered) => match buffered.into_inner() {
                Ok(file) => sync_quietly(&file, &path),
                Err(err) => {
                    warn!(path = %path.display(), error = %err.error(), "ignoring flush failure on close");
                }
            },
            Err(err) => warn!(path = %path.display(), error = %err, "ignoring close failure"),
        }
    }

    fn write_parent_directories(&mut self, entry_name: &str) -> Result<(), Error> {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .last_modified_time(DateTime::default());
        for (idx, _) in entry_name.match_indices('/') {
            let dir = &entry_name[..=idx];
            if self.written.contains(dir) {
                continue;
            }
            self.zip
                .add_directory(dir, options)
                .map_err(|err| write_error(&self.path, err).with_destination(dir))?;
            self.written.insert(dir.to_string());
        }
        Ok(())
    }
}

pub(crate) fn is_bootstrap_entry(name: &str) -> bool {
    BOOTSTRAP_ROOTS
        .iter()
        .any(|root| name.starts_with(root) || (name.ends_with('/') && root.starts_with(name)))
}

fn modified_time(metadata: &Metadata) -> DateTime {
    metadata
        .modified()
        .ok()
        .and_then(|modified| DateTime::try_from(time::OffsetDateTime::from(modified)).ok())
        .unwrap_or_default()
}

fn sync_quietly(file: &File, path: &Path) {
    if let Err(err) = file.sync_all() {
        warn!(path = %path.display(), error = %err, "ignoring sync failure on close");
    }
}

fn hex_digest(digest: &[u8]) -> String {
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        use std::fmt::Write;
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

fn write_error(path: &Path, err: impl std::error::Error + Send + Sync + 'static) -> Error {
    Error::new(ErrorKind::Write)
        .with_message("failed to write output archive")
        .with_path(path)
        .with_source(err)
}

fn library_error(library: &Library, err: io::Error) -> Error {
    Error::new(ErrorKind::Input)
        .with_message("failed to read library archive")
        .with_library(library.name())
        .with_path(library.file())
        .with_source(err)
}
