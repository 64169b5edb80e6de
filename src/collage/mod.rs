mod collage_error;
mod compose;
mod layout;

pub use collage_error::CollageError;
pub use compose::*;
pub use layout::{GridCursor, GridLayout};
