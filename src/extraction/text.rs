//! Plain-text passthrough.

use std::path::Path;

use super::ExtractionError;

/// Read a `.txt` file as UTF-8. Content is returned verbatim, including
/// trailing whitespace; invalid UTF-8 surfaces as an I/O error.
pub fn read_plain_text(path: &Path) -> Result<String, ExtractionError> {
    Ok(std::fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn content_is_returned_verbatim() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Chẩn đoán: viêm họng cấp\n\nRe-examination in 5 days\n").unwrap();
        let text = read_plain_text(file.path()).unwrap();
        assert_eq!(text, "Chẩn đoán: viêm họng cấp\n\nRe-examination in 5 days\n");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_plain_text(Path::new("/nonexistent/record.txt")).unwrap_err();
        assert!(matches!(err, ExtractionError::Io(_)));
    }
}
