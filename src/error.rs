use std::{
    error::Error,
    fmt::{self, Display},
};

/// The result type used in the entire crate.
pub type Result<T> = std::result::Result<T, VatErr>;

/// The crate's error type.
#[derive(Debug)]
pub enum VatErr {
    InvalidConfig {
        what: &'static str,
        reason: &'static str,
    },
    WeightMismatch {
        got: usize,
        expected: usize,
    },
    ShapeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    Json(serde_json::Error),
}

impl Display for VatErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VatErr::InvalidConfig { what, reason } => {
                write!(f, "invalid configuration for {what}: {reason}")
            }
            VatErr::WeightMismatch { got, expected } => write!(
                f,
                "there are {got} per-example weights but the batch has {expected} examples"
            ),
            VatErr::ShapeMismatch {
                what,
                got,
                expected,
            } => write!(f, "shape mismatch for {what}: got {got}, expected {expected}"),
            VatErr::Json(e) => write!(f, "failed to parse configuration: {e}"),
        }
    }
}

impl Error for VatErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            VatErr::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for VatErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
