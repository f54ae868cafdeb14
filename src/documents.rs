use crate::error::DecodeError;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_DOCUMENTS_DIR: &str = "documents";
const DOCUMENT_EXTENSIONS: &[&str] = &["md", "markdown", "txt"];
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const BINARY_SNIFF_LEN: usize = 8 * 1024;

/// Raw file content as picked by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedDocument {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn decode(&self) -> Result<String, DecodeError> {
        decode_document(&self.name, &self.bytes)
    }
}

/// Markdown and text files directly inside `dir`, sorted by path.
pub fn list_documents(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    if dir.is_dir()
        && let Ok(entries) = fs::read_dir(dir)
    {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file()
                && let Some(ext) = path.extension().and_then(|e| e.to_str())
                && DOCUMENT_EXTENSIONS
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            {
                files.push(path);
            }
        }
    }

    files.sort();
    files
}

pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Reads a file from disk. An unreadable file is a decode failure for that
/// document only.
pub fn read_document(path: &Path) -> Result<UploadedDocument, DecodeError> {
    let name = display_name(path);
    let bytes = fs::read(path).map_err(|e| DecodeError {
        name: name.clone(),
        reason: e.to_string(),
    })?;
    Ok(UploadedDocument { name, bytes })
}

/// UTF-8 first, Latin-1 when the bytes are not valid UTF-8.
///
/// A NUL byte within the first 8 KiB marks the content as binary and it is
/// rejected. NUL bytes further in are kept.
pub fn decode_document(name: &str, bytes: &[u8]) -> Result<String, DecodeError> {
    if bytes[..bytes.len().min(BINARY_SNIFF_LEN)].contains(&0) {
        return Err(DecodeError {
            name: name.to_string(),
            reason: "content is binary, not text".to_string(),
        });
    }

    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(text.to_string()),
        Err(_) => {
            tracing::debug!(document = name, "not valid UTF-8, decoding as Latin-1");
            Ok(bytes.iter().map(|&b| char::from(b)).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_decode_utf8() {
        let text = decode_document("a.md", "# Überschrift\n- Punkt".as_bytes()).unwrap();
        assert_eq!(text, "# Überschrift\n- Punkt");
    }

    #[test]
    fn test_decode_strips_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"# Title");
        assert_eq!(decode_document("a.md", &bytes).unwrap(), "# Title");
    }

    #[test]
    fn test_decode_latin1_fallback() {
        // "café" in Latin-1; 0xE9 alone is invalid UTF-8.
        let bytes = [b'c', b'a', b'f', 0xE9];
        assert_eq!(decode_document("a.md", &bytes).unwrap(), "café");
    }

    #[test]
    fn test_decode_rejects_binary() {
        let err = decode_document("image.md", &[0x89, b'P', b'N', b'G', 0x00, 0x01]).unwrap_err();
        assert_eq!(err.name, "image.md");
        assert!(err.reason.contains("binary"));
    }

    #[test]
    fn test_decode_keeps_late_nul_bytes() {
        let mut bytes = vec![b'a'; BINARY_SNIFF_LEN];
        bytes.extend_from_slice(b"\0tail");
        let text = decode_document("long.md", &bytes).unwrap();
        assert_eq!(text.len(), BINARY_SNIFF_LEN + 5);
        assert!(text.ends_with("\0tail"));

        let mut early = vec![b'a'; BINARY_SNIFF_LEN - 1];
        early.push(0);
        assert!(decode_document("early.md", &early).is_err());
    }

    #[test]
    fn test_list_documents_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.md"), "b").unwrap();
        fs::write(dir.path().join("a.markdown"), "a").unwrap();
        fs::write(dir.path().join("c.TXT"), "c").unwrap();
        fs::write(dir.path().join("skip.csv"), "x").unwrap();
        fs::create_dir(dir.path().join("nested.md")).unwrap();

        let names: Vec<String> = list_documents(dir.path())
            .iter()
            .map(|p| display_name(p))
            .collect();
        assert_eq!(names, vec!["a.markdown", "b.md", "c.TXT"]);
    }

    #[test]
    fn test_list_documents_missing_dir() {
        assert!(list_documents(Path::new("/definitely/not/here")).is_empty());
    }

    #[test]
    fn test_read_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("standard.md");
        fs::write(&path, "# Standard").unwrap();

        let doc = read_document(&path).unwrap();
        assert_eq!(doc.name, "standard.md");
        assert_eq!(doc.decode().unwrap(), "# Standard");

        let err = read_document(&dir.path().join("missing.md")).unwrap_err();
        assert_eq!(err.name, "missing.md");
    }
}
