//! Reader for zipped documentation bundles.
//!
//! A bundle is a zip archive with two areas: `documents/` holds one JSON
//! envelope per page, `assets/` holds static files keyed by the names the
//! envelopes' asset manifests use. Opening or enumerating a broken archive
//! fails; a single undecodable document is logged and skipped so one bad
//! page cannot sink the rest of the bundle.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use mdxport_ast::Envelope;
use thiserror::Error;
use zip::ZipArchive;

const DOCUMENT_PREFIX: &str = "documents/";
const DOCUMENT_SUFFIX: &str = ".json";
const ASSET_PREFIX: &str = "assets/";

/// Errors raised while reading a bundle.
#[derive(Error, Debug)]
pub enum BundleError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, BundleError>;

/// One page pulled out of a bundle.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    /// Page path relative to the output root, without extension.
    pub page_path: String,
    /// The decoded envelope.
    pub envelope: Envelope,
}

/// An open documentation bundle.
pub struct Bundle<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl Bundle<File> {
    /// Opens a bundle file from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(File::open(path)?)
    }
}

impl<R: Read + Seek> Bundle<R> {
    /// Opens a bundle from any [`Read`] + [`Seek`] source.
    pub fn new(reader: R) -> Result<Self> {
        Ok(Self {
            archive: ZipArchive::new(reader)?,
        })
    }

    /// Decodes every document in the bundle, sorted by page path.
    ///
    /// Entries that are not valid JSON envelopes are skipped with a warning.
    pub fn documents(&mut self) -> Result<Vec<Document>> {
        let mut names: Vec<String> = self
            .archive
            .file_names()
            .filter(|name| name.starts_with(DOCUMENT_PREFIX) && name.ends_with(DOCUMENT_SUFFIX))
            .map(str::to_owned)
            .collect();
        names.sort();

        let mut documents = Vec::with_capacity(names.len());
        for name in names {
            let bytes = self.read_entry(&name)?;
            let text = String::from_utf8(strip_bom(&bytes).to_vec())?;
            let envelope: Envelope = match serde_json::from_str(&text) {
                Ok(envelope) => envelope,
                Err(error) => {
                    tracing::warn!(path = %name, error = %error, "skipping undecodable document");
                    continue;
                }
            };
            let page_path = name
                .trim_start_matches(DOCUMENT_PREFIX)
                .trim_end_matches(DOCUMENT_SUFFIX)
                .to_owned();
            documents.push(Document {
                page_path,
                envelope,
            });
        }
        Ok(documents)
    }

    /// Reads one asset by manifest key. Returns `None` when the bundle has
    /// no such asset.
    pub fn asset(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = format!("{ASSET_PREFIX}{key}");
        match self.archive.by_name(&path) {
            Ok(mut file) => {
                let mut contents = Vec::new();
                file.read_to_end(&mut contents)?;
                Ok(Some(contents))
            }
            Err(zip::result::ZipError::FileNotFound) => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    /// All asset keys present in the bundle, sorted.
    #[must_use]
    pub fn asset_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .archive
            .file_names()
            .filter_map(|name| name.strip_prefix(ASSET_PREFIX))
            .filter(|key| !key.is_empty() && !key.ends_with('/'))
            .map(str::to_owned)
            .collect();
        keys.sort();
        keys
    }

    fn read_entry(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut file = self.archive.by_name(name)?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        Ok(contents)
    }
}

/// Strip a UTF-8 BOM if present.
fn strip_bom(data: &[u8]) -> &[u8] {
    if data.starts_with(&[0xEF, 0xBB, 0xBF]) {
        &data[3..]
    } else {
        data
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use pretty_assertions::assert_eq;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    use super::*;

    fn build_bundle(entries: &[(&str, &[u8])]) -> Cursor<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        for (name, data) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap()
    }

    #[test]
    fn test_documents_sorted_by_page_path() {
        let cursor = build_bundle(&[
            (
                "documents/guide/page.json",
                br#"{"ast": {"type": "root"}}"#,
            ),
            ("documents/about.json", br#"{"ast": {"type": "root"}}"#),
            ("assets/sha1-abc", b"binary"),
            ("unrelated.txt", b"ignored"),
        ]);
        let mut bundle = Bundle::new(cursor).unwrap();
        let documents = bundle.documents().unwrap();

        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].page_path, "about");
        assert_eq!(documents[1].page_path, "guide/page");
        assert_eq!(
            documents[1].envelope.ast.as_ref().unwrap().kind,
            "root"
        );
    }

    #[test]
    fn test_undecodable_document_is_skipped() {
        let cursor = build_bundle(&[
            ("documents/bad.json", b"{ not json"),
            ("documents/good.json", br#"{"ast": {"type": "root"}}"#),
        ]);
        let mut bundle = Bundle::new(cursor).unwrap();
        let documents = bundle.documents().unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].page_path, "good");
    }

    #[test]
    fn test_document_with_bom() {
        let mut payload = vec![0xEF, 0xBB, 0xBF];
        payload.extend_from_slice(br#"{"ast": {"type": "root"}}"#);
        let cursor = build_bundle(&[("documents/bom.json", payload.as_slice())]);
        let mut bundle = Bundle::new(cursor).unwrap();
        assert_eq!(bundle.documents().unwrap().len(), 1);
    }

    #[test]
    fn test_asset_lookup() {
        let cursor = build_bundle(&[("assets/sha1-abc", b"image bytes")]);
        let mut bundle = Bundle::new(cursor).unwrap();

        assert_eq!(
            bundle.asset("sha1-abc").unwrap(),
            Some(b"image bytes".to_vec())
        );
        assert_eq!(bundle.asset("missing").unwrap(), None);
    }

    #[test]
    fn test_asset_keys_sorted() {
        let cursor = build_bundle(&[
            ("assets/zeta.png", b"z"),
            ("assets/alpha.png", b"a"),
            ("documents/page.json", br#"{}"#),
        ]);
        let bundle = Bundle::new(cursor).unwrap();
        assert_eq!(
            bundle.asset_keys(),
            vec!["alpha.png".to_owned(), "zeta.png".to_owned()]
        );
    }

    #[test]
    fn test_not_a_zip_fails() {
        assert!(Bundle::new(Cursor::new(b"plain text".to_vec())).is_err());
    }

    #[test]
    fn test_envelope_without_ast_survives() {
        let cursor = build_bundle(&[("documents/stub.json", br#"{"page_id": "x"}"#)]);
        let mut bundle = Bundle::new(cursor).unwrap();
        let documents = bundle.documents().unwrap();
        assert_eq!(documents.len(), 1);
        assert!(documents[0].envelope.ast.is_none());
    }
}
