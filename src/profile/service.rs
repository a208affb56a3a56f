use axum::http::StatusCode;
use time::OffsetDateTime;

/// Why an upload was refused before anything touched storage.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("no file uploaded")]
    MissingFile,
    #[error("only image files are allowed")]
    UnsupportedFileType,
}

impl UploadError {
    pub fn status(&self) -> StatusCode {
        match self {
            UploadError::MissingFile => StatusCode::BAD_REQUEST,
            UploadError::UnsupportedFileType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        }
    }
}

const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];
const ALLOWED_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/gif"];

/// Check a multipart field's filename and declared content type before any
/// bytes are read. Both the extension and the mime type must be in the
/// image allowlist. Returns the lowercased extension for key generation.
pub fn validate_image(
    file_name: Option<&str>,
    content_type: Option<&str>,
) -> Result<String, UploadError> {
    let file_name = file_name.ok_or(UploadError::MissingFile)?;

    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .ok_or(UploadError::UnsupportedFileType)?;
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(UploadError::UnsupportedFileType);
    }

    let mime = content_type.ok_or(UploadError::UnsupportedFileType)?;
    if !ALLOWED_MIME_TYPES.contains(&mime) {
        return Err(UploadError::UnsupportedFileType);
    }

    Ok(ext)
}

/// Object key for a stored profile image: upload timestamp in milliseconds
/// plus the original extension.
pub fn object_key(now: OffsetDateTime, ext: &str) -> String {
    format!("{}.{}", now.unix_timestamp_nanos() / 1_000_000, ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn accepts_each_allowed_extension() {
        for (name, mime) in [
            ("me.jpg", "image/jpeg"),
            ("me.jpeg", "image/jpeg"),
            ("me.png", "image/png"),
            ("me.gif", "image/gif"),
        ] {
            assert!(validate_image(Some(name), Some(mime)).is_ok(), "{name}");
        }
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert_eq!(
            validate_image(Some("AVATAR.PNG"), Some("image/png")).unwrap(),
            "png"
        );
    }

    #[test]
    fn rejects_non_image_extensions() {
        for name in ["notes.txt", "run.exe", "page.html", "archive.tar.gz"] {
            assert_eq!(
                validate_image(Some(name), Some("image/png")),
                Err(UploadError::UnsupportedFileType),
                "{name}"
            );
        }
    }

    #[test]
    fn rejects_image_extension_with_wrong_mime() {
        assert_eq!(
            validate_image(Some("payload.png"), Some("application/octet-stream")),
            Err(UploadError::UnsupportedFileType)
        );
        assert_eq!(
            validate_image(Some("payload.jpg"), None),
            Err(UploadError::UnsupportedFileType)
        );
    }

    #[test]
    fn rejects_missing_filename_or_extension() {
        assert_eq!(
            validate_image(None, Some("image/png")),
            Err(UploadError::MissingFile)
        );
        assert_eq!(
            validate_image(Some("no-extension"), Some("image/png")),
            Err(UploadError::UnsupportedFileType)
        );
    }

    #[test]
    fn statuses_match_the_failure() {
        assert_eq!(UploadError::MissingFile.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            UploadError::UnsupportedFileType.status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
    }

    #[test]
    fn object_key_is_millis_plus_extension() {
        let now = datetime!(2024-05-01 12:00:00 UTC);
        assert_eq!(object_key(now, "png"), "1714564800000.png");
    }
}
