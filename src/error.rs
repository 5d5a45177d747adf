use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("parse error at line {line}: {message}")]
    Parse { line: u64, message: String },

    #[error("missing required column `{column}`")]
    Schema { column: String },

    #[error("{summary} summary is empty")]
    EmptyAggregate { summary: &'static str },

    /// A sum left the range of its numeric type.
    #[error("{what} total overflowed")]
    Overflow { what: String },

    #[error("failed to encode workbook: {0}")]
    Encode(#[from] rust_xlsxwriter::XlsxError),
}

impl ReportError {
    pub(crate) fn parse(line: u64, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn schema(column: &str) -> Self {
        Self::Schema {
            column: column.to_string(),
        }
    }

    pub(crate) fn overflow(what: impl Into<String>) -> Self {
        Self::Overflow { what: what.into() }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
