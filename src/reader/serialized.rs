use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::corpus::{DOCUMENT_PREFIX, DOCUMENT_VERSION, SERIALIZED_EXTENSION};
use crate::document::Document;
use crate::errors::MetaError;
use crate::reader::{CorpusReader, DocumentStream};
use crate::transport::fs::{FileScan, write_atomic};

enum SerializedInput {
    Root(PathBuf),
    Files(Vec<PathBuf>),
}

/// Reads one serialized `Document` per `.bin` file.
pub struct SerializedCorpusReader {
    id: String,
    input: SerializedInput,
}

impl SerializedCorpusReader {
    /// Read every `.bin` file below `root`, recursively, in path order.
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            id: root.display().to_string(),
            input: SerializedInput::Root(root),
        }
    }

    /// Read exactly the given files, in the given order.
    pub fn from_files(id: impl Into<String>, files: Vec<PathBuf>) -> Self {
        Self {
            id: id.into(),
            input: SerializedInput::Files(files),
        }
    }

    fn files(&self) -> Result<Vec<PathBuf>, MetaError> {
        match &self.input {
            SerializedInput::Root(root) => FileScan::new(root, SERIALIZED_EXTENSION).list(),
            SerializedInput::Files(files) => Ok(files.clone()),
        }
    }
}

impl CorpusReader for SerializedCorpusReader {
    fn id(&self) -> &str {
        &self.id
    }

    fn open(&self) -> Result<DocumentStream<'_>, MetaError> {
        let files = self.files()?;
        Ok(Box::new(
            files
                .into_iter()
                .map(move |path| read_document(&path).map_err(|err| self.corpus_error(&path, err))),
        ))
    }

    fn sources(&self) -> Result<Vec<PathBuf>, MetaError> {
        self.files()
    }
}

impl SerializedCorpusReader {
    fn corpus_error(&self, path: &Path, err: MetaError) -> MetaError {
        match err {
            MetaError::Io(io) => MetaError::Corpus {
                reader_id: self.id.clone(),
                reason: format!("cannot read '{}': {io}", path.display()),
            },
            other => other,
        }
    }
}

/// Encode a document as a versioned bitcode payload.
pub fn encode_document(document: &Document) -> Vec<u8> {
    let payload = bitcode::encode(document);
    let mut out = Vec::with_capacity(2 + payload.len());
    out.push(DOCUMENT_PREFIX);
    out.push(DOCUMENT_VERSION);
    out.extend_from_slice(&payload);
    out
}

/// Decode a payload produced by `encode_document`.
pub fn decode_document(bytes: &[u8]) -> Result<Document, String> {
    match bytes {
        [DOCUMENT_PREFIX, DOCUMENT_VERSION, rest @ ..] => {
            bitcode::decode(rest).map_err(|err| format!("corrupt document payload: {err}"))
        }
        [DOCUMENT_PREFIX, version, ..] => Err(format!(
            "document version mismatch: expected {DOCUMENT_VERSION}, found {version}"
        )),
        _ => Err("document payload missing expected prefix".into()),
    }
}

/// Read one serialized document file.
pub fn read_document(path: &Path) -> Result<Document, MetaError> {
    let bytes = fs::read(path)?;
    decode_document(&bytes).map_err(|reason| MetaError::Corpus {
        reader_id: path.display().to_string(),
        reason,
    })
}

/// Write one serialized document file atomically.
pub fn write_document(path: &Path, document: &Document) -> Result<(), MetaError> {
    write_atomic(path, &encode_document(document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentView, TextSpan};
    use tempfile::tempdir;

    #[test]
    fn root_reader_walks_bin_files_in_path_order() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write_document(&root.join("b.bin"), &Document::single_view("b", "second")).unwrap();
        write_document(&root.join("a.bin"), &Document::single_view("a", "first")).unwrap();
        write_document(&root.join("sub/c.bin"), &Document::single_view("c", "third")).unwrap();
        fs::write(root.join("readme.txt"), "ignored").unwrap();

        let reader = SerializedCorpusReader::from_root(root);
        let ids: Vec<String> = reader.open().unwrap().map(|d| d.unwrap().id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn documents_keep_views_and_spans() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("doc.bin");
        let doc = Document::with_views(
            "d",
            vec![
                DocumentView::new("source", "hello").with_units(vec![TextSpan::new(0, 5)]),
                DocumentView::new("target", "hallo").with_outcomes(vec!["de".into()]),
            ],
        )
        .with_language("en");
        write_document(&path, &doc).unwrap();
        assert_eq!(read_document(&path).unwrap(), doc);
    }

    #[test]
    fn explicit_file_lists_fail_on_missing_files() {
        let temp = tempdir().unwrap();
        let reader =
            SerializedCorpusReader::from_files("fold-1", vec![temp.path().join("absent.bin")]);
        let first = reader.open().unwrap().next().unwrap();
        match first {
            Err(MetaError::Corpus { reader_id, .. }) => assert_eq!(reader_id, "fold-1"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn decode_rejects_foreign_payloads() {
        assert!(decode_document(b"").is_err());
        let err = decode_document(&[DOCUMENT_PREFIX, DOCUMENT_VERSION + 1]).unwrap_err();
        assert!(err.contains("version mismatch"));
    }
}
