//! Multipart form bodies (forms with an optional file)

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;

use super::error::ApiError;

/// The attached file of a multipart form
#[derive(Debug)]
pub struct FileField {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Text fields plus at most one file, read from the field named `file`
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    pub file: Option<FileField>,
}

fn multipart_error(err: MultipartError, max: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge { max }
    } else {
        ApiError::BadRequest {
            message: err.body_text(),
        }
    }
}

impl MultipartForm {
    /// Drain a multipart body. An empty file input (no name, no bytes)
    /// counts as no file.
    pub async fn read(mut multipart: Multipart, max_bytes: usize) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(e, max_bytes))?
        {
            let name = field.name().unwrap_or_default().to_string();

            if name == "file" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|e| multipart_error(e, max_bytes))?;
                if !file_name.is_empty() && !bytes.is_empty() {
                    form.file = Some(FileField { file_name, bytes });
                }
            } else {
                let value = field.text().await.map_err(|e| multipart_error(e, max_bytes))?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }
}
