use std::collections::BTreeSet;
use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::DocxError;

/// In-memory zip archive of generated documents.
///
/// Nothing touches the filesystem until the caller writes the finished bytes,
/// so a failure part-way through leaves no partial archive behind.
pub struct Bundle {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    names: BTreeSet<String>,
}

impl Bundle {
    pub fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            names: BTreeSet::new(),
        }
    }

    pub fn add(&mut self, name: &str, bytes: &[u8]) -> Result<(), DocxError> {
        if !self.names.insert(name.to_string()) {
            return Err(DocxError::DuplicateEntry(name.to_string()));
        }
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        self.zip.start_file(name, options)?;
        self.zip.write_all(bytes)?;
        tracing::debug!(entry = name, bytes = bytes.len(), "added bundle entry");
        Ok(())
    }

    pub fn finish(self) -> Result<Vec<u8>, DocxError> {
        Ok(self.zip.finish()?.into_inner())
    }
}

impl Default for Bundle {
    fn default() -> Self {
        Self::new()
    }
}
