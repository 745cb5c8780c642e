use encoding_rs::UTF_8;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("object body is not valid utf-8")]
    InvalidUtf8,
}

/// Decode an object body as UTF-8, dropping a leading BOM if present.
pub fn decode_utf8(bytes: &[u8]) -> Result<String, DecodeError> {
    let (text, had_errors) = UTF_8.decode_with_bom_removal(bytes);
    if had_errors {
        return Err(DecodeError::InvalidUtf8);
    }
    Ok(text.into_owned())
}
