use thiserror::Error;

/// Every way a submission can fail. The `Display` text is what the user sees.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Rejected before any request was sent.
    #[error("{0}")]
    Validation(String),

    #[error("Error uploading file: {0}")]
    Transport(String),

    #[error("File upload failed: {status} {reason}")]
    ResponseStatus { status: u16, reason: String },

    #[error("Unexpected response from server: {0}")]
    Parse(String),

    #[error("Row {row}: field '{field}' {reason}")]
    Projection {
        row: usize,
        field: String,
        reason: String,
    },
}

impl From<reqwest::Error> for AnalysisError {
    fn from(e: reqwest::Error) -> Self {
        AnalysisError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(e: serde_json::Error) -> Self {
        AnalysisError::Parse(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_message_embeds_code_and_reason() {
        let e = AnalysisError::ResponseStatus {
            status: 500,
            reason: "Internal Server Error".into(),
        };
        assert_eq!(e.to_string(), "File upload failed: 500 Internal Server Error");
    }

    #[test]
    fn projection_message_names_row_and_field() {
        let e = AnalysisError::Projection {
            row: 2,
            field: "totalPrice".into(),
            reason: "is missing".into(),
        };
        assert_eq!(e.to_string(), "Row 2: field 'totalPrice' is missing");
    }
}
