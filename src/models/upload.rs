//! Files attached to multipart requests.

use crate::error::ApiError;
use std::path::Path;

/// Largest image accepted for upload.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Image content types the server accepts.
pub const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/jpg"];

/// An in-memory file ready to be attached to a form.
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, inferring its content type from the extension.
    pub async fn from_path(path: &Path) -> Result<Self, ApiError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::Validation(format!("Cannot read {}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }

    /// Reject images the server would refuse: wrong type or over 5 MB.
    pub fn validate_image(&self) -> Result<(), ApiError> {
        if !ALLOWED_IMAGE_TYPES.contains(&self.mime_type.as_str()) {
            return Err(ApiError::Validation(format!(
                "Unsupported image type {}; use JPEG or PNG",
                self.mime_type
            )));
        }
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(ApiError::Validation(format!(
                "Image is {}; the limit is {}",
                format_file_size(self.bytes.len() as u64),
                format_file_size(MAX_IMAGE_BYTES as u64)
            )));
        }
        Ok(())
    }
}

/// Human-readable byte count ("1.5 MB").
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_image() {
        let ok = Upload::new("me.png", "image/png", vec![0; 1024]);
        assert!(ok.validate_image().is_ok());

        let gif = Upload::new("me.gif", "image/gif", vec![0; 10]);
        assert!(matches!(gif.validate_image(), Err(ApiError::Validation(_))));

        let huge = Upload::new("me.jpg", "image/jpeg", vec![0; MAX_IMAGE_BYTES + 1]);
        assert!(matches!(huge.validate_image(), Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_content_type_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let cases = [
            ("Scan.JPG", "image/jpeg"),
            ("notes.pdf", "application/pdf"),
            ("cover.webp", "image/webp"),
            (
                "essay.docx",
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            ),
            ("README", "application/octet-stream"),
        ];
        for (name, expected) in cases {
            let path = dir.path().join(name);
            std::fs::write(&path, b"data").unwrap();
            let upload = Upload::from_path(&path).await.unwrap();
            assert_eq!(upload.file_name, name);
            assert_eq!(upload.mime_type, expected, "{}", name);
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Upload::from_path(&dir.path().join("gone.png")).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5 MB");
    }
}
