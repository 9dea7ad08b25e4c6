use facet::Facet;

/// Errors reported while reading XML text into events.
///
/// The tree builder itself never fails; everything here comes from the
/// input document.
#[derive(Facet, Debug, Clone, PartialEq, Eq)]
#[facet(derive(Error))]
#[repr(u8)]
pub enum ParseError {
    /// xml syntax error at byte {position}: {message}
    Xml { position: u64, message: String },

    /// undeclared namespace prefix {prefix} at byte {position}
    UnknownPrefix { position: u64, prefix: String },

    /// invalid utf-8 at byte {position}
    Utf8 { position: u64 },

    /// document ended with {open} element(s) still open
    UnexpectedEof { open: usize },
}

impl ParseError {
    pub(crate) fn xml(position: u64, err: impl std::fmt::Display) -> Self {
        ParseError::Xml {
            position,
            message: err.to_string(),
        }
    }

    /// Byte offset in the input the error was detected at, if known.
    pub fn position(&self) -> Option<u64> {
        match self {
            ParseError::Xml { position, .. }
            | ParseError::UnknownPrefix { position, .. }
            | ParseError::Utf8 { position } => Some(*position),
            ParseError::UnexpectedEof { .. } => None,
        }
    }
}
