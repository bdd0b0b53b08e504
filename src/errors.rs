use thiserror::Error;

pub type Result<T> = std::result::Result<T, SamlineError>;

/// Everything that can stop a record from being generated. There is no partial
/// success: the first error aborts generation for the whole template.
#[derive(Error, Debug)]
pub enum SamlineError {
    #[error("Malformed CIGAR '{cigar}': {reason}")]
    MalformedCigar { cigar: String, reason: String },

    /// The reference window ran out before the CIGAR's reference-consuming
    /// operations were satisfied
    #[error("Reference window too short: needed {needed} bases, {available} available")]
    ReferenceWindowTooShort { needed: usize, available: usize },

    #[error("Insert pool exhausted: needed {needed} bases, {available} available")]
    InsertPoolExhausted { needed: usize, available: usize },

    #[error("Reference sequence '{name}' not found")]
    ReferenceNotFound { name: String },

    #[error("Failed to read FASTA '{path}': {reason}")]
    Fasta { path: String, reason: String },

    /// A later generation stage ran before the stage it depends on
    #[error("Mate {mate} has no {stage} yet")]
    Incomplete { mate: usize, stage: &'static str },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SamlineError {
    /// Process exit code reported by the binary for this error
    pub fn exit_code(&self) -> exitcode::ExitCode {
        match self {
            SamlineError::MalformedCigar { .. }
            | SamlineError::ReferenceWindowTooShort { .. }
            | SamlineError::InsertPoolExhausted { .. } => exitcode::DATAERR,
            SamlineError::ReferenceNotFound { .. } | SamlineError::Config(_) => exitcode::CONFIG,
            SamlineError::Fasta { .. } => exitcode::NOINPUT,
            SamlineError::Io(_) => exitcode::IOERR,
            SamlineError::Incomplete { .. } | SamlineError::Json(_) => exitcode::SOFTWARE,
        }
    }
}
