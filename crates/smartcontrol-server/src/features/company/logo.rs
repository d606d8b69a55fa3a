//! Logo encoding
//!
//! Clients send the logo either as a data URL (`data:image/png;base64,...`)
//! or as bare base64. It is stored as raw bytes plus its MIME type.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

pub const DEFAULT_LOGO_MIME: &str = "image/png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logo {
    pub mime: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LogoError {
    #[error("logo is not valid base64: {0}")]
    Encoding(String),

    #[error("logo data URL must be base64 encoded")]
    UnsupportedDataUrl,
}

impl Logo {
    pub fn parse(input: &str) -> Result<Self, LogoError> {
        let input = input.trim();
        let (mime, payload) = match input.split_once(',') {
            Some((header, payload)) => (mime_from_header(header)?, payload),
            None => (DEFAULT_LOGO_MIME.to_string(), input),
        };

        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| LogoError::Encoding(e.to_string()))?;

        Ok(Self { mime, bytes })
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

fn mime_from_header(header: &str) -> Result<String, LogoError> {
    let meta = header.strip_prefix("data:").unwrap_or(header);
    let Some(mime) = meta.strip_suffix(";base64") else {
        return Err(LogoError::UnsupportedDataUrl);
    };
    if mime.is_empty() {
        Ok(DEFAULT_LOGO_MIME.to_string())
    } else {
        Ok(mime.to_string())
    }
}
