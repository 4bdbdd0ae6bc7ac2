//! In-memory zip assembly.
//!
//! Entry names are repository paths without the leading `/`, so `/sub/b.txt`
//! is stored as `sub/b.txt`.

use std::io::{Cursor, Write};

use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;

pub struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
    entries: usize,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
            entries: 0,
        }
    }

    pub fn add_file(&mut self, path: &str, content: &[u8]) -> Result<()> {
        self.writer.start_file(entry_name(path), self.options)?;
        self.writer.write_all(content).map_err(ZipError::from)?;
        self.entries += 1;
        Ok(())
    }

    pub fn entry_count(&self) -> usize {
        self.entries
    }

    /// Write the central directory and return the archive bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        Ok(self.writer.finish()?.into_inner())
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn entry_name(path: &str) -> &str {
    path.trim_start_matches('/')
}
