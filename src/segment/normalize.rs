use anyhow::{Context, Result};
use encoding_rs::WINDOWS_1252;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEncoding {
    Utf8,
    Windows1252,
}

impl SourceEncoding {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceEncoding::Utf8 => "utf-8",
            SourceEncoding::Windows1252 => "windows-1252",
        }
    }
}

/// Decodes as UTF-8, falling back to Windows-1252 when the bytes are not valid UTF-8.
pub fn decode_document(bytes: &[u8]) -> Result<(String, SourceEncoding)> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        return Ok((text.to_string(), SourceEncoding::Utf8));
    }

    let decoded = WINDOWS_1252
        .decode_without_bom_handling_and_without_replacement(bytes)
        .context("document is neither valid utf-8 nor windows-1252")?;

    Ok((decoded.into_owned(), SourceEncoding::Windows1252))
}

pub fn normalize_text(content: &str) -> String {
    content
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .trim()
        .to_string()
}
