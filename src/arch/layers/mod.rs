mod dense;

pub use dense::{Dense, DenseTrace};
