pub mod api_client;
pub mod collage;
pub mod configuration;
pub mod startup;

pub use api_client::{AlbumEntry, FetchError, ImageFetchError};
pub use collage::{compose_collage, CollageError, GridLayout};
pub use configuration::*;
pub use startup::{run, run_from_environment, RunError, RunErrorKind, RunStage, RunSummary};
