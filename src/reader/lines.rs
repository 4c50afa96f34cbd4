use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;

use flate2::read::GzDecoder;

use crate::constants::corpus::{DEFAULT_LANGUAGE, GZIP_EXTENSION};
use crate::document::Document;
use crate::errors::MetaError;
use crate::reader::{CorpusReader, DocumentStream};
use crate::transport::fs::has_extension;

/// Treats every line of a text file as one single-view document.
///
/// Document ids are zero-based line indexes; `.gz` files are decompressed
/// on the fly.
pub struct LineCorpusReader {
    id: String,
    path: PathBuf,
    language: String,
}

impl LineCorpusReader {
    /// Read `path`, decompressing it when it ends in `.gz`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            id: path.display().to_string(),
            path,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    /// Override the language assigned to every document.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    fn reader(&self) -> Result<Box<dyn BufRead + Send>, MetaError> {
        let file = File::open(&self.path).map_err(|err| MetaError::Corpus {
            reader_id: self.id.clone(),
            reason: format!("cannot open corpus: {err}"),
        })?;
        let inner: Box<dyn Read + Send> = if has_extension(&self.path, GZIP_EXTENSION) {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Ok(Box::new(BufReader::new(inner)))
    }
}

impl CorpusReader for LineCorpusReader {
    fn id(&self) -> &str {
        &self.id
    }

    fn open(&self) -> Result<DocumentStream<'_>, MetaError> {
        let reader = self.reader()?;
        Ok(Box::new(reader.lines().enumerate().map(
            move |(index, line)| {
                let text = line.map_err(|err| MetaError::Corpus {
                    reader_id: self.id.clone(),
                    reason: format!("line {index}: {err}"),
                })?;
                Ok(Document::single_view(index.to_string(), text)
                    .with_language(self.language.clone())
                    .with_uri(self.id.clone()))
            },
        )))
    }

    fn sources(&self) -> Result<Vec<PathBuf>, MetaError> {
        Ok(vec![self.path.clone()])
    }
}
