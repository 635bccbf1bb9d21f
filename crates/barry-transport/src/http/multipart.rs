//! `multipart/form-data` encoding of inline interaction responses.

use barry_core::model::FileUpload;
use serde_json::Value;

const BOUNDARY: &str = "barry-interaction-response-7f3c2a91";

/// Encodes `payload_json` followed by one `files[i]` part per file.
///
/// Returns the `Content-Type` header value and the body.
pub(crate) fn encode(payload: &Value, files: &[FileUpload]) -> (String, Vec<u8>) {
    let mut body = Vec::new();

    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"payload_json\"\r\n\
             Content-Type: application/json\r\n\r\n{payload}\r\n"
        )
        .as_bytes(),
    );

    for (i, file) in files.iter().enumerate() {
        let filename = file.name.replace(['"', '\r', '\n'], "_");
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files[{i}]\"; \
                 filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(&file.data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parts_are_laid_out_in_order() {
        let files = vec![
            FileUpload::new("rank.png", vec![1, 2, 3]),
            FileUpload::new("bad\"name.txt", "hi"),
        ];
        let (content_type, body) = encode(&json!({ "type": 4 }), &files);
        let text = String::from_utf8_lossy(&body);

        assert_eq!(content_type, format!("multipart/form-data; boundary={BOUNDARY}"));
        let payload = text.find("name=\"payload_json\"").unwrap();
        let first = text.find("name=\"files[0]\"; filename=\"rank.png\"").unwrap();
        let second = text.find("name=\"files[1]\"; filename=\"bad_name.txt\"").unwrap();
        assert!(payload < first && first < second);
        assert!(text.contains(r#"{"type":4}"#));
        assert!(text.ends_with(&format!("--{BOUNDARY}--\r\n")));
    }
}
