use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid embedding dimension: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Duplicate catalog id: {0}")]
    DuplicateKey(u64),

    #[error("Implant not found: {0}")]
    NotFound(u64),

    #[error("Catalog is empty")]
    EmptyCatalog,

    #[error("Malformed catalog: {0}")]
    Malformed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
