//! `multipart/form-data` body encoding for file uploads.
//!
//! Text fields come first, the file part last. The boundary is a random
//! UUID, which cannot collide with a preceding `--` line in practice.

use uuid::Uuid;

use crate::types::FileUpload;

/// Encoded multipart body and the matching `content-type` header value.
#[derive(Debug, Clone)]
pub struct MultipartBody {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

pub fn encode(fields: &[(String, String)], file_field: &str, file: &FileUpload) -> MultipartBody {
    encode_with_boundary(
        &format!("crocodoc-{}", Uuid::new_v4().simple()),
        fields,
        file_field,
        file,
    )
}

fn encode_with_boundary(
    boundary: &str,
    fields: &[(String, String)],
    file_field: &str,
    file: &FileUpload,
) -> MultipartBody {
    let mut bytes = Vec::with_capacity(file.content.len() + 256 * (fields.len() + 1));
    for (name, value) in fields {
        bytes.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        bytes.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", escape(name)).as_bytes(),
        );
        bytes.extend_from_slice(value.as_bytes());
        bytes.extend_from_slice(b"\r\n");
    }
    bytes.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    bytes.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            escape(file_field),
            escape(&file.filename)
        )
        .as_bytes(),
    );
    bytes.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    bytes.extend_from_slice(&file.content);
    bytes.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    MultipartBody {
        content_type: format!("multipart/form-data; boundary={boundary}"),
        bytes,
    }
}

fn escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace(['\r', '\n'], " ")
}
