// Test-only helpers for building small jar fixtures on disk.
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub(crate) fn write_jar(dir: &Path, name: &str, entries: &[(&str, &[u8])]) -> PathBuf {
    let path = dir.join(name);
    let file = File::create(&path).expect("create jar");
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (entry, content) in entries {
        if entry.ends_with('/') {
            zip.add_directory(*entry, options).expect("add directory");
        } else {
            zip.start_file(*entry, options).expect("start file");
            zip.write_all(content).expect("write entry");
        }
    }
    zip.finish().expect("finish jar");
    path
}

pub(crate) fn entry_names(path: &Path) -> Vec<String> {
    let file = File::open(path).expect("open jar");
    let mut archive = zip::ZipArchive::new(file).expect("read jar");
    (0..archive.len())
        .map(|index| archive.by_index(index).expect("entry").name().to_string())
        .collect()
}
