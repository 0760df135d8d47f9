//! multipart/related bodies for Drive's `uploadType=multipart` endpoints.
//!
//! The boundary is fixed. Content containing the boundary sequence will
//! corrupt the body; there is no escaping.

use serde::Serialize;

/// Boundary used for every upload and update body.
pub const BOUNDARY: &str = "-------314159265358979323846";

/// Value for the outer request's `Content-Type` header.
pub fn content_type() -> String {
    format!("multipart/related; boundary={}", BOUNDARY)
}

/// Build a two-part body: JSON metadata first, then raw content.
pub fn build_body<M: Serialize>(
    metadata: &M,
    mime_type: &str,
    content: &str,
) -> serde_json::Result<String> {
    let metadata_json = serde_json::to_string(metadata)?;
    let delimiter = format!("\r\n--{}\r\n", BOUNDARY);
    let close_delimiter = format!("\r\n--{}--", BOUNDARY);

    let mut body = String::with_capacity(
        metadata_json.len() + content.len() + mime_type.len() + 2 * delimiter.len() + 96,
    );
    body.push_str(&delimiter);
    body.push_str("Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.push_str(&metadata_json);
    body.push_str(&delimiter);
    body.push_str("Content-Type: ");
    body.push_str(mime_type);
    body.push_str("\r\n\r\n");
    body.push_str(content);
    body.push_str(&close_delimiter);
    Ok(body)
}

/// Metadata part for a new file.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadMetadata<'a> {
    pub name: &'a str,
    pub mime_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parents: Option<[&'a str; 1]>,
}

/// Metadata part for a content update. Name and parents are left alone.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMetadata<'a> {
    pub mime_type: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Split a body into (headers, payload) per part.
    fn parts(body: &str) -> Vec<(String, String)> {
        let close = format!("\r\n--{}--", BOUNDARY);
        let inner = body.strip_suffix(close.as_str()).expect("missing close delimiter");
        inner
            .split(&format!("\r\n--{}\r\n", BOUNDARY))
            .skip(1)
            .map(|part| {
                let (headers, payload) = part.split_once("\r\n\r\n").expect("part without headers");
                (headers.to_string(), payload.to_string())
            })
            .collect()
    }

    #[test]
    fn test_upload_body_layout() {
        let metadata = UploadMetadata {
            name: "a.txt",
            mime_type: "text/plain",
            parents: None,
        };
        let body = build_body(&metadata, "text/plain", "hello").unwrap();

        let expected = format!(
            "\r\n--{b}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n\
             {{\"name\":\"a.txt\",\"mimeType\":\"text/plain\"}}\
             \r\n--{b}\r\nContent-Type: text/plain\r\n\r\nhello\r\n--{b}--",
            b = BOUNDARY
        );
        assert_eq!(body, expected);
    }

    #[test]
    fn test_parts_recover_metadata_and_content() {
        let metadata = UploadMetadata {
            name: "report.md",
            mime_type: "text/markdown",
            parents: Some(["0BfolderIdAbCdEfGhIjKlMn"]),
        };
        let content = "# Title\r\n\r\nbody with unicode: h\u{e9}llo";
        let body = build_body(&metadata, "text/markdown", content).unwrap();

        let parts = parts(&body);
        assert_eq!(parts.len(), 2);

        assert_eq!(parts[0].0, "Content-Type: application/json; charset=UTF-8");
        let json: serde_json::Value = serde_json::from_str(&parts[0].1).unwrap();
        assert_eq!(json["name"], "report.md");
        assert_eq!(json["parents"][0], "0BfolderIdAbCdEfGhIjKlMn");

        assert_eq!(parts[1].0, "Content-Type: text/markdown");
        assert_eq!(parts[1].1, content);
    }

    #[test]
    fn test_update_metadata_only_has_mime_type() {
        let json = serde_json::to_value(UpdateMetadata { mime_type: "text/csv" }).unwrap();
        assert_eq!(json, serde_json::json!({ "mimeType": "text/csv" }));
    }

    #[test]
    fn test_content_type_header() {
        assert_eq!(
            content_type(),
            "multipart/related; boundary=-------314159265358979323846"
        );
    }
}
