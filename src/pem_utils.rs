use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{Result, SignError};

/// Convert DER‑encoded data into a PEM‑encoded string with the provided label.
pub fn der_to_pem(der: &[u8], label: &str) -> String {
    let pem = pem::Pem::new(label, der);
    pem::encode_config(
        &pem,
        pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF),
    )
}

/// Parses the first PEM block of `input`, if the input is PEM text at all.
///
/// Returns `Ok(None)` for binary or otherwise non-PEM input so callers can
/// fall back to DER.
pub fn parse_block(input: &[u8]) -> Result<Option<pem::Pem>> {
    let Ok(text) = std::str::from_utf8(input) else {
        return Ok(None);
    };
    if !text.trim_start().starts_with("-----BEGIN ") {
        return Ok(None);
    }
    Ok(Some(pem::parse(text.trim())?))
}

/// Decodes a textual blob that is either PEM with the given label or bare base64 DER.
pub fn decode_armored(input: &str, label: &str) -> Result<Vec<u8>> {
    if let Some(block) = parse_block(input.as_bytes())? {
        if block.tag() != label {
            return Err(SignError::DecodingError(format!(
                "expected a {label} PEM block, found {}",
                block.tag()
            )));
        }
        return Ok(block.into_contents());
    }
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|e| SignError::DecodingError(e.to_string()))
}
