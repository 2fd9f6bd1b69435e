//! Downloaded documents: file naming and saving to disk

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::{ApiError, ApiResult};

/// Give up finding a free name after this many " (n)" suffixes
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Body of a document download, held in memory until saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentDownload {
    pub document_id: i64,
    /// Suggested file name, already stripped of any directory part
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Default name for a document the server did not name
pub fn default_filename(document_id: i64) -> String {
    format!("document-{}", document_id)
}

/// Pick the file name from a `Content-Disposition` header
///
/// Accepts `filename="name"` and `filename=name`, case-insensitively, and
/// falls back to `document-<id>`. A quoted name may contain `;`.
pub fn filename_from_content_disposition(header: Option<&str>, document_id: i64) -> String {
    static FILENAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = FILENAME_REGEX.get_or_init(|| {
        Regex::new(r#"(?i)\bfilename\s*=\s*(?:"([^"]*)"|([^;\s]+))"#)
            .expect("Failed to compile filename regex")
    });

    header
        .and_then(|value| regex.captures(value))
        .and_then(|captures| captures.get(1).or_else(|| captures.get(2)))
        .map(|name| sanitize_filename(name.as_str(), document_id))
        .unwrap_or_else(|| default_filename(document_id))
}

/// Reduce a server-provided name to a plain file name
pub fn sanitize_filename(name: &str, document_id: i64) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>();
    let base = base.trim();

    if base.is_empty() || base == "." || base == ".." {
        default_filename(document_id)
    } else {
        base.to_string()
    }
}

fn candidate_name(filename: &str, attempt: u32) -> String {
    if attempt == 0 {
        return filename.to_string();
    }

    let path = Path::new(filename);
    match (
        path.file_stem().and_then(|s| s.to_str()),
        path.extension().and_then(|e| e.to_str()),
    ) {
        (Some(stem), Some(ext)) => format!("{} ({}).{}", stem, attempt, ext),
        _ => format!("{} ({})", filename, attempt),
    }
}

/// Save a download into `dir` and return the final path
///
/// The bytes go to a temporary file first, which is moved into place under
/// the first free name (`name`, `name (1)`, ...). The temporary file is
/// removed on every error path.
pub fn save_download(download: &DocumentDownload, dir: &Path) -> ApiResult<PathBuf> {
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&download.bytes)?;
    tmp.flush()?;

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let target = dir.join(candidate_name(&download.filename, attempt));
        match tmp.persist_noclobber(&target) {
            Ok(_) => {
                info!(
                    "Saved document {} to {}",
                    download.document_id,
                    target.display()
                );
                return Ok(target);
            }
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => tmp = e.file,
            Err(e) => return Err(ApiError::Io(e.error)),
        }
    }

    Err(ApiError::Io(std::io::Error::new(
        ErrorKind::AlreadyExists,
        format!("no free file name for {}", download.filename),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_from_quoted_header() {
        assert_eq!(
            filename_from_content_disposition(Some(r#"attachment; filename="transcript.pdf""#), 3),
            "transcript.pdf"
        );
    }

    #[test]
    fn test_quoted_filename_keeps_semicolons() {
        assert_eq!(
            filename_from_content_disposition(
                Some(r#"attachment; filename="Transcript; 2024.pdf""#),
                1
            ),
            "Transcript; 2024.pdf"
        );
        assert_eq!(
            filename_from_content_disposition(
                Some(r#"attachment; filename = "cert.pdf"; size=10"#),
                1
            ),
            "cert.pdf"
        );
    }

    #[test]
    fn test_extended_filename_is_not_decoded() {
        assert_eq!(
            filename_from_content_disposition(Some("attachment; filename*=UTF-8''a%20b.pdf"), 8),
            "document-8"
        );
    }

    #[test]
    fn test_filename_from_unquoted_header() {
        assert_eq!(
            filename_from_content_disposition(Some("attachment; FILENAME=diploma.pdf"), 3),
            "diploma.pdf"
        );
        assert_eq!(
            filename_from_content_disposition(Some("attachment; filename=a.pdf; size=10"), 3),
            "a.pdf"
        );
    }

    #[test]
    fn test_filename_defaults() {
        assert_eq!(filename_from_content_disposition(None, 42), "document-42");
        assert_eq!(
            filename_from_content_disposition(Some("attachment"), 42),
            "document-42"
        );
        assert_eq!(
            filename_from_content_disposition(Some(r#"attachment; filename="""#), 42),
            "document-42"
        );
    }

    #[test]
    fn test_directory_parts_are_stripped() {
        assert_eq!(sanitize_filename("../../etc/passwd", 1), "passwd");
        assert_eq!(sanitize_filename(r"C:\docs\cert.pdf", 1), "cert.pdf");
        assert_eq!(sanitize_filename("docs/", 1), "document-1");
        assert_eq!(sanitize_filename("..", 1), "document-1");
    }

    #[test]
    fn test_save_download_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let download = DocumentDownload {
            document_id: 1,
            filename: "transcript.pdf".to_string(),
            content_type: Some("application/pdf".to_string()),
            bytes: b"%PDF-1.4".to_vec(),
        };

        let first = save_download(&download, dir.path()).unwrap();
        let second = save_download(&download, dir.path()).unwrap();

        assert_eq!(first, dir.path().join("transcript.pdf"));
        assert_eq!(second, dir.path().join("transcript (1).pdf"));
        assert_eq!(fs::read(&second).unwrap(), b"%PDF-1.4");

        // Only the two saved files remain, no temporary leftovers
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_candidate_name_without_extension() {
        assert_eq!(candidate_name("document-5", 2), "document-5 (2)");
    }
}
