//! # XML Errors

/// Errors raised while loading, navigating or writing a document tree
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    #[error("XML parse error at {line}:{column}: {message}")]
    Parse {
        line: u32,
        column: u32,
        message: String,
    },

    #[error("Document is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("Document nesting exceeds {limit} levels")]
    TooDeep { limit: usize },

    #[error("Document has no root element")]
    MissingRoot,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<roxmltree::Error> for XmlError {
    fn from(error: roxmltree::Error) -> Self {
        let pos = error.pos();
        XmlError::Parse {
            line: pos.row,
            column: pos.col,
            message: error.to_string(),
        }
    }
}
