//! Error types for the rendering library.
//!
//! Every collaborator failure (font loading, template import, symbol and
//! image encoding, document serialization) surfaces as an [`Error`] so the
//! embedding application decides whether to abort or continue.

/// Result type alias for rendering operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building a document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Font file could not be read or parsed
    #[error("Font load failure: {0}")]
    FontLoad(String),

    /// Template document could not be read, parsed, or a page is missing
    #[error("Template import failure: {0}")]
    TemplateImport(String),

    /// Barcode or QR symbol could not be encoded or scaled
    #[error("Symbol encode failure: {0}")]
    SymbolEncode(String),

    /// Raster image could not be encoded or embedded
    #[error("Image encode failure: {0}")]
    ImageEncode(String),

    /// Content stream or document serialization failed
    #[error("Render write failure: {0}")]
    RenderWrite(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed item or job description
    #[error("Item decode error: {0}")]
    ItemDecode(#[from] serde_json::Error),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::TemplateImport(err.to_string())
    }
}

impl From<crate::writer::ImageError> for Error {
    fn from(err: crate::writer::ImageError) -> Self {
        Error::ImageEncode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_load_error() {
        let err = Error::FontLoad("missing.ttf".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("Font load failure"));
        assert!(msg.contains("missing.ttf"));
    }

    #[test]
    fn test_symbol_encode_error() {
        let err = Error::SymbolEncode("width 10 below 68 modules".to_string());
        assert!(err.to_string().starts_with("Symbol encode failure"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let parse = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: Error = parse.into();
        assert!(err.to_string().contains("Item decode error"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
