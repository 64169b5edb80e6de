use serde::Deserialize;

/// One album of the top albums chart, in rank order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumEntry {
    pub name: String,
    pub artist: String,
    /// URL of the largest cover variant; empty when Last.fm has no cover.
    pub art_url: String,
}

/// Body of a successful `user.gettopalbums` response.
#[derive(Debug, Deserialize)]
pub(crate) struct TopAlbumsResponse {
    #[serde(rename = "topalbums")]
    pub top_albums: TopAlbums,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TopAlbums {
    #[serde(default)]
    pub album: Vec<RankedAlbum>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RankedAlbum {
    pub name: String,
    pub artist: ArtistName,
    #[serde(default)]
    pub image: Vec<ImageVariant>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArtistName {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageVariant {
    #[serde(rename = "#text")]
    pub url: String,
}

/// Error object returned by Last.fm, with or without a failing HTTP status.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: i32,
    pub message: String,
}

impl From<RankedAlbum> for AlbumEntry {
    fn from(album: RankedAlbum) -> Self {
        // Variants are listed smallest first.
        let art_url = album
            .image
            .into_iter()
            .last()
            .map(|variant| variant.url)
            .unwrap_or_default();

        AlbumEntry {
            name: album.name,
            artist: album.artist.name,
            art_url,
        }
    }
}
