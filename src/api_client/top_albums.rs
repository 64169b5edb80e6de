//! Retrieval of a user's ranked top albums from the Last.fm API.

use crate::api_client::models::{AlbumEntry, ApiErrorBody, TopAlbumsResponse};
use crate::api_client::FetchError;
use crate::configuration::{Period, Settings};
use log::{debug, info};
use reqwest::blocking::Client;
use reqwest::StatusCode;

const TOP_ALBUMS_METHOD: &str = "user.gettopalbums";

/// Source of the ranked album list, most played first.
#[cfg_attr(test, mockall::automock)]
pub trait TopAlbumsSource {
    fn fetch_top_albums(
        &self,
        username: &str,
        limit: u32,
        period: Period,
    ) -> Result<Vec<AlbumEntry>, FetchError>;
}

/// Blocking client for the Last.fm ranking endpoint.
pub struct LastFmClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl LastFmClient {
    pub fn new(client: Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn from_settings(client: Client, settings: &Settings) -> Self {
        Self::new(client, &settings.api_base_url, &settings.api_key)
    }
}

impl TopAlbumsSource for LastFmClient {
    /// Issues a single ranking request; there is no retry.
    fn fetch_top_albums(
        &self,
        username: &str,
        limit: u32,
        period: Period,
    ) -> Result<Vec<AlbumEntry>, FetchError> {
        info!(
            "Fetching top {} albums of {} for period {}",
            limit, username, period
        );

        let query = top_albums_query(username, &self.api_key, limit, period);
        let response = self.client.get(&self.base_url).query(&query).send()?;
        let status = response.status();
        let body = response.text()?;

        let albums = parse_top_albums(status, &body)?;
        debug!("Last.fm returned {} ranked albums", albums.len());
        Ok(albums)
    }
}

fn top_albums_query(
    username: &str,
    api_key: &str,
    limit: u32,
    period: Period,
) -> Vec<(&'static str, String)> {
    vec![
        ("method", TOP_ALBUMS_METHOD.to_string()),
        ("user", username.to_string()),
        ("api_key", api_key.to_string()),
        ("format", "json".to_string()),
        ("limit", limit.to_string()),
        ("period", period.to_string()),
    ]
}

/// Turns a ranking response into album entries, keeping the response order.
fn parse_top_albums(status: StatusCode, body: &str) -> Result<Vec<AlbumEntry>, FetchError> {
    if !status.is_success() {
        let message = serde_json::from_str::<ApiErrorBody>(body)
            .ok()
            .map(|error| error.message);
        return Err(FetchError::Status { status, message });
    }

    match serde_json::from_str::<TopAlbumsResponse>(body) {
        Ok(response) => Ok(response
            .top_albums
            .album
            .into_iter()
            .map(AlbumEntry::from)
            .collect()),
        Err(parse_error) => match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(error) => Err(FetchError::Api {
                code: error.error,
                message: error.message,
            }),
            Err(_) => Err(FetchError::Parse(parse_error)),
        },
    }
}
