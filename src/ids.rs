//! Drive id validation and extraction.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{DriveError, IdField, Result};

/// Minimum token length accepted by `initialize`.
pub const MIN_TOKEN_LEN: usize = 21;

/// Drive ids as accepted on the caller surface.
static DRIVE_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{20,60}$").expect("Invalid drive id regex"));

static FOLDER_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://drive\.google\.com/drive/(?:u/\d+/)?folders/([a-zA-Z0-9_-]+)")
        .expect("Invalid folder URL regex")
});

static FILE_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:drive|docs)\.google\.com/(?:file|document|spreadsheets|presentation)/d/([a-zA-Z0-9_-]+)")
        .expect("Invalid file URL regex")
});

static OPEN_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://drive\.google\.com/open\?id=([a-zA-Z0-9_-]+)")
        .expect("Invalid open URL regex")
});

/// Whether `id` looks like a Drive id.
pub fn is_valid_drive_id(id: &str) -> bool {
    DRIVE_ID_REGEX.is_match(id)
}

/// Check a caller-supplied id before it is placed in a URL path or JSON body.
///
/// An empty id is reported as missing; anything else that does not match
/// `^[A-Za-z0-9_-]{20,60}$` is a format error.
pub fn validate_id(field: IdField, id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(DriveError::MissingArgument { field: field.name() });
    }
    if !is_valid_drive_id(id) {
        return Err(DriveError::InvalidIdFormat { field });
    }
    Ok(())
}

/// Validate an optional id; `None` passes.
pub fn validate_optional_id(field: IdField, id: Option<&str>) -> Result<()> {
    match id {
        Some(id) => validate_id(field, id),
        None => Ok(()),
    }
}

/// Crude sanity check on an access token. This is not real validation.
pub fn validate_token(token: &str) -> Result<()> {
    if token.is_empty() {
        return Err(DriveError::MissingToken);
    }
    if token.chars().count() < MIN_TOKEN_LEN {
        return Err(DriveError::InvalidToken);
    }
    Ok(())
}

/// Extract a Drive id from a share URL, or pass through a raw id.
///
/// Supports the following URL formats:
/// - `https://drive.google.com/drive/folders/<ID>`
/// - `https://drive.google.com/drive/u/0/folders/<ID>`
/// - `https://drive.google.com/file/d/<ID>/view`
/// - `https://docs.google.com/document/d/<ID>/edit`
/// - `https://drive.google.com/open?id=<ID>`
/// - Raw ID string
///
/// The returned id still goes through [`validate_id`] inside the client.
///
/// # Examples
///
/// ```
/// use drive_bridge::ids::extract_id;
///
/// let id = extract_id("https://drive.google.com/drive/folders/1AbCdEfGhIjKlMnOpQrStUv").unwrap();
/// assert_eq!(id, "1AbCdEfGhIjKlMnOpQrStUv");
///
/// let id = extract_id("1AbCdEfGhIjKlMnOpQrStUv").unwrap();
/// assert_eq!(id, "1AbCdEfGhIjKlMnOpQrStUv");
/// ```
pub fn extract_id(url_or_id: &str) -> Result<String> {
    let trimmed = url_or_id.trim();

    for regex in [&*FOLDER_URL_REGEX, &*FILE_URL_REGEX, &*OPEN_URL_REGEX] {
        if let Some(id) = regex.captures(trimmed).and_then(|c| c.get(1)) {
            return Ok(id.as_str().to_string());
        }
    }

    if is_valid_drive_id(trimmed) {
        return Ok(trimmed.to_string());
    }

    Err(DriveError::InvalidIdFormat { field: IdField::FileId })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "1AbCdEfGhIjKlMnOpQrStUvWxYz";

    #[test]
    fn test_valid_ids() {
        assert!(is_valid_drive_id(ID));
        assert!(is_valid_drive_id("abc-123_XYZabc-123_XY"));
        assert!(is_valid_drive_id(&"a".repeat(60)));
    }

    #[test]
    fn test_invalid_ids() {
        assert!(!is_valid_drive_id("bad id!"));
        assert!(!is_valid_drive_id(&"a".repeat(19)));
        assert!(!is_valid_drive_id(&"a".repeat(61)));
        assert!(!is_valid_drive_id("1AbCdEfGhIjKlMnOpQrSt/../x"));
    }

    #[test]
    fn test_validate_id_reports_field() {
        let err = validate_id(IdField::ParentFolderId, "bad id!").unwrap_err();
        assert_eq!(err.code(), "INVALID_PARENT_FOLDER_ID_FORMAT");

        let err = validate_id(IdField::FileId, "").unwrap_err();
        assert_eq!(err.code(), "MISSING_FILE_ID");
    }

    #[test]
    fn test_validate_optional_id() {
        assert!(validate_optional_id(IdField::FolderId, None).is_ok());
        assert!(validate_optional_id(IdField::FolderId, Some(ID)).is_ok());
        assert!(validate_optional_id(IdField::FolderId, Some("nope")).is_err());
    }

    #[test]
    fn test_validate_token() {
        assert!(matches!(validate_token(""), Err(DriveError::MissingToken)));
        assert!(matches!(
            validate_token(&"t".repeat(20)),
            Err(DriveError::InvalidToken)
        ));
        assert!(validate_token(&"t".repeat(21)).is_ok());
    }

    #[test]
    fn test_extract_folder_url() {
        let url = format!("https://drive.google.com/drive/u/2/folders/{}?usp=sharing", ID);
        assert_eq!(extract_id(&url).unwrap(), ID);
    }

    #[test]
    fn test_extract_with_whitespace() {
        assert_eq!(extract_id(&format!("  {}  ", ID)).unwrap(), ID);
    }

    #[test]
    fn test_extract_invalid() {
        assert!(extract_id("https://example.com/folder/123").is_err());
        assert!(extract_id("").is_err());
        assert!(extract_id("short").is_err());
    }
}
