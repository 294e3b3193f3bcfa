use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Tag error: {0}")]
    Tag(#[from] lofty::error::LoftyError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MetadataError>;
