use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollageError {
    #[error("Not enough albums to fill the collage: need {needed}, got {available}")]
    InsufficientAlbums { needed: usize, available: usize },
    #[error("Failed to save collage to {}: {source}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
