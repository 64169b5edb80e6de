use crate::api_client::ImageFetchError;
use image::DynamicImage;
use log::debug;
use reqwest::blocking::Client;

/// Source of decoded cover images.
#[cfg_attr(test, mockall::automock)]
pub trait AlbumArtSource {
    fn fetch_album_art(&self, url: &str) -> Result<DynamicImage, ImageFetchError>;
}

/// Downloads covers over HTTP, one request per image.
pub struct HttpArtFetcher {
    client: Client,
}

impl HttpArtFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl AlbumArtSource for HttpArtFetcher {
    fn fetch_album_art(&self, url: &str) -> Result<DynamicImage, ImageFetchError> {
        if url.is_empty() {
            return Err(ImageFetchError::MissingUrl);
        }

        debug!("Downloading cover {}", url);
        let request_error = |source| ImageFetchError::Request {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ImageFetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let bytes = response.bytes().map_err(request_error)?;
        decode_album_art(url, &bytes)
    }
}

/// Decodes an image payload, guessing the format from its content.
pub fn decode_album_art(url: &str, bytes: &[u8]) -> Result<DynamicImage, ImageFetchError> {
    image::load_from_memory(bytes).map_err(|source| ImageFetchError::Decode {
        url: url.to_string(),
        source,
    })
}
