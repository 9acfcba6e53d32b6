use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to fetch from system of record: {0}")]
    SourceFetch(String),

    #[error("Inference capability unavailable: {0}")]
    InferenceUnavailable(String),

    #[error("Failed to publish outcome: {0}")]
    Publish(String),

    #[error("Request carries no radiograph reference")]
    MissingImage,

    #[error(transparent)]
    Catalog(#[from] implantx_catalog::Error),

    #[error(transparent)]
    Tracking(#[from] implantx_tracking::Error),
}
