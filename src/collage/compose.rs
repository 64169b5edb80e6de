//! Composition of album covers into a single grid image.
//!
//! Albums are placed in rank order, left to right and top to bottom. A cover
//! that cannot be fetched or decoded leaves its tile black; later albums keep
//! the position their rank gives them.

use crate::api_client::{AlbumArtSource, AlbumEntry, ImageFetchError};
use crate::collage::{CollageError, GridLayout};
use crate::configuration::Period;
use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbImage};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// The canvas being filled. Saving consumes it.
#[derive(Debug)]
pub struct Collage {
    layout: GridLayout,
    canvas: RgbImage,
}

impl Collage {
    /// Allocates a black canvas sized for `layout`.
    pub fn new(layout: GridLayout) -> Self {
        let (width, height) = layout.canvas_dimensions();
        Self {
            layout,
            canvas: RgbImage::new(width, height),
        }
    }

    pub fn layout(&self) -> GridLayout {
        self.layout
    }

    pub fn canvas(&self) -> &RgbImage {
        &self.canvas
    }

    fn paste(&mut self, column: u32, row: u32, tile: &RgbImage) {
        let (x, y) = self.layout.tile_offset(column, row);
        imageops::replace(&mut self.canvas, tile, i64::from(x), i64::from(y));
    }

    /// Writes the collage as PNG into `dir` and returns the file path.
    pub fn save(self, dir: &Path, period: Period) -> Result<PathBuf, CollageError> {
        let path = dir.join(collage_file_name(self.layout, period));
        info!("Saving collage to {}", path.display());

        self.canvas
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|source| CollageError::Save {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}

/// `{grid_width}x{grid_height}_{period}_collage.png`
pub fn collage_file_name(layout: GridLayout, period: Period) -> String {
    format!(
        "{}x{}_{}_collage.png",
        layout.grid_width, layout.grid_height, period
    )
}

/// A tile left blank, with the reason its cover is missing.
#[derive(Debug)]
pub struct BlankTile {
    pub rank: usize,
    pub column: u32,
    pub row: u32,
    pub album: AlbumEntry,
    pub error: ImageFetchError,
}

/// Outcome of composing every tile.
#[derive(Debug, Default)]
pub struct CompositionReport {
    /// Ranks whose cover was placed.
    pub filled: Vec<usize>,
    pub blank: Vec<BlankTile>,
}

/// Fails unless there is an album for every tile of `layout`.
pub fn ensure_enough_albums(albums: &[AlbumEntry], layout: GridLayout) -> Result<(), CollageError> {
    let needed = layout.tile_count();
    if albums.len() < needed {
        return Err(CollageError::InsufficientAlbums {
            needed,
            available: albums.len(),
        });
    }
    Ok(())
}

/// Fills a new collage with the covers of the first `tile_count` albums.
///
/// Albums beyond the grid are ignored. Per-tile failures are logged and
/// recorded in the report; only a short album list is an error. `on_tile`
/// is called with each rank before its cover is fetched.
pub fn compose_collage(
    albums: &[AlbumEntry],
    layout: GridLayout,
    art: &dyn AlbumArtSource,
    progress: &ProgressBar,
    on_tile: &mut dyn FnMut(usize),
) -> Result<(Collage, CompositionReport), CollageError> {
    ensure_enough_albums(albums, layout)?;

    let tile_count = layout.tile_count();
    let mut collage = Collage::new(layout);
    let mut report = CompositionReport::default();

    progress.set_length(tile_count as u64);
    progress.set_style(tile_progress_style());

    for (rank, (album, (column, row))) in albums.iter().zip(layout.cursor()).enumerate() {
        on_tile(rank);
        progress.set_message(format!("{} - {}", album.artist, album.name));
        debug!(
            "Placing tile {}/{} at column {}, row {}",
            rank + 1,
            tile_count,
            column,
            row
        );

        match render_tile(art, album, layout.tile_size_px) {
            Ok(tile) => {
                collage.paste(column, row, &tile);
                report.filled.push(rank);
            }
            Err(error) => {
                warn!(
                    "Leaving tile {} blank for {} - {}: {}",
                    rank + 1,
                    album.artist,
                    album.name,
                    error
                );
                report.blank.push(BlankTile {
                    rank,
                    column,
                    row,
                    album: album.clone(),
                    error,
                });
            }
        }
        progress.inc(1);
    }

    progress.finish_with_message(format!(
        "{} of {} covers placed",
        report.filled.len(),
        tile_count
    ));
    Ok((collage, report))
}

fn render_tile(
    art: &dyn AlbumArtSource,
    album: &AlbumEntry,
    tile_size_px: u32,
) -> Result<RgbImage, ImageFetchError> {
    let cover = art.fetch_album_art(&album.art_url)?;
    let tile = cover
        .resize_exact(tile_size_px, tile_size_px, FilterType::CatmullRom)
        .to_rgb8();

    if tile.dimensions() != (tile_size_px, tile_size_px) {
        return Err(ImageFetchError::UnexpectedSize {
            url: album.art_url.clone(),
            expected: (tile_size_px, tile_size_px),
            actual: tile.dimensions(),
        });
    }
    Ok(tile)
}

fn tile_progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{elapsed_precise} [{bar:40.cyan/blue}] {pos}/{len} covers {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
}
