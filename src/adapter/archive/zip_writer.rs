//! Zip Archive Writer
//!
//! 集めた成果物をメモリ上で1つのZIPにまとめる

use anyhow::{Context, Result};
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::domain::entities::aggregation::ArchiveEntry;
use crate::domain::ports::archive_writer::ArchiveWriter;

/// ZIPアーカイブライター
pub struct ZipArchiveWriter {
    compression: CompressionMethod,
}

impl ZipArchiveWriter {
    pub fn new() -> Self {
        Self {
            compression: CompressionMethod::Deflated,
        }
    }

    /// 無圧縮で格納するライター
    pub fn stored() -> Self {
        Self {
            compression: CompressionMethod::Stored,
        }
    }
}

impl Default for ZipArchiveWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveWriter for ZipArchiveWriter {
    fn build(&self, entries: &[ArchiveEntry]) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(self.compression);

        // Entries with the same name are written as separate records
        for entry in entries {
            writer
                .start_file(entry.name.as_str(), options)
                .context(format!("Failed to start archive entry: {}", entry.name))?;
            writer
                .write_all(&entry.payload)
                .context(format!("Failed to write archive entry: {}", entry.name))?;
        }

        let cursor = writer.finish().context("Failed to finalize archive")?;
        Ok(cursor.into_inner())
    }
}
