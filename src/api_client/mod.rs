mod album_art;
mod fetch_error;
mod models;
mod top_albums;

pub use album_art::*;
pub use fetch_error::{FetchError, ImageFetchError};
pub use models::AlbumEntry;
pub use top_albums::*;

use reqwest::blocking::Client;
use std::time::Duration;

/// Builds the blocking HTTP client shared by the ranking and cover requests.
///
/// Without an explicit timeout the client keeps reqwest's default.
pub fn build_http_client(timeout: Option<Duration>) -> reqwest::Result<Client> {
    let mut builder = Client::builder().user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}
