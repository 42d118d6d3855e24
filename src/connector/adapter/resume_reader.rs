use std::path::Path;

use tracing::{debug, warn};

use crate::domain::DomainError;

/// Reads resume text from `path`. PDFs go through text extraction; anything
/// else is read as UTF-8. The result is trimmed; a resume with no text yields
/// an empty string, which the matcher treats as "no matches".
pub fn read_resume(path: &Path) -> Result<String, DomainError> {
    let is_pdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

    let text = if is_pdf {
        pdf_extract::extract_text(path).map_err(|e| {
            DomainError::parse(format!("Failed to extract text from {}: {}", path.display(), e))
        })?
    } else {
        std::fs::read_to_string(path)?
    };

    let text = text.trim().to_string();
    if text.is_empty() {
        warn!("No text found in resume {}", path.display());
    }

    debug!("Read {} chars of resume text from {}", text.chars().count(), path.display());
    Ok(text)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_reads_plain_text_trimmed() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "\n  Rust, Python, SQL  \n").unwrap();

        assert_eq!(read_resume(file.path()).unwrap(), "Rust, Python, SQL");
    }

    #[test]
    fn test_blank_resume_reads_as_empty() {
        let file = tempfile::Builder::new().suffix(".md").tempfile().unwrap();
        assert_eq!(read_resume(file.path()).unwrap(), "");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_resume(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, DomainError::IoError(_)));
    }
}
