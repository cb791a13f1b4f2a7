use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("reference well {well} not found on the plate")]
    ReferenceLookup { well: String },

    #[error("{stage} requires column {column}, which was never produced")]
    MissingColumn {
        stage: &'static str,
        column: &'static str,
    },

    #[error("calibration failed: {0}")]
    Calibration(String),

    // mapped out of the error channel by the executor, never a failure
    #[error("analysis cancelled")]
    Cancelled,
}

impl Error {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}
