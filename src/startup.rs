/// # The Main Entry Point of a Collage Run
///
/// This module sequences a whole run, from configuration loading to the saved
/// collage file.
///
/// # Steps:
/// 1. Loads the configuration
/// 2. Fetches exactly `grid_width × grid_height` ranked albums
/// 3. Composes their covers into the grid
/// 4. Saves the collage as PNG
///
/// Any failure before composition, and a failed save, aborts the run. A
/// cover that cannot be fetched only leaves its tile blank.
use crate::api_client::{
    build_http_client, AlbumArtSource, FetchError, HttpArtFetcher, LastFmClient, TopAlbumsSource,
};
use crate::collage::{compose_collage, ensure_enough_albums, CollageError, CompositionReport};
use crate::configuration::{self, ConfigError, Settings};
use indicatif::ProgressBar;
use log::{error, info};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Where a run currently is. `Saved` and `Aborted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Idle,
    ConfigLoaded,
    AlbumsFetched,
    /// Working on tile `tile` (1-based) of `of`.
    ComposerRunning { tile: usize, of: usize },
    Saved,
    Aborted,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStage::Idle => write!(f, "idle"),
            RunStage::ConfigLoaded => write!(f, "configuration loaded"),
            RunStage::AlbumsFetched => write!(f, "albums fetched"),
            RunStage::ComposerRunning { tile, of } => write!(f, "composing tile {} of {}", tile, of),
            RunStage::Saved => write!(f, "saved"),
            RunStage::Aborted => write!(f, "aborted"),
        }
    }
}

#[derive(Debug, Error)]
pub enum RunErrorKind {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to set up the HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("Error fetching top albums from Last.fm: {0}")]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Collage(#[from] CollageError),
}

/// A fatal failure, with the stage the run was in when it aborted.
#[derive(Debug, Error)]
#[error("Run aborted ({stage}): {kind}")]
pub struct RunError {
    pub stage: RunStage,
    pub kind: RunErrorKind,
}

/// Result of a successful run.
#[derive(Debug)]
pub struct RunSummary {
    pub output_path: PathBuf,
    pub report: CompositionReport,
}

/// Loads the settings from `cfg_file` and the environment, then runs against
/// the real Last.fm API.
pub fn run_from_environment(cfg_file: &Path) -> Result<RunSummary, RunError> {
    let mut stage = RunStage::Idle;

    let settings = configuration::get_configuration(cfg_file)
        .map_err(|err| abort(&mut stage, RunErrorKind::from(err)))?;
    let client = build_http_client(settings.timeout_secs.map(Duration::from_secs))
        .map_err(|err| abort(&mut stage, RunErrorKind::HttpClient(err)))?;
    let top_albums = LastFmClient::from_settings(client.clone(), &settings);
    let album_art = HttpArtFetcher::new(client);

    run(&settings, &top_albums, &album_art, &ProgressBar::new(0))
}

/// Runs one collage from already loaded settings.
pub fn run(
    settings: &Settings,
    top_albums: &dyn TopAlbumsSource,
    album_art: &dyn AlbumArtSource,
    progress: &ProgressBar,
) -> Result<RunSummary, RunError> {
    let mut stage = RunStage::Idle;
    run_stages(settings, top_albums, album_art, progress, &mut stage)
        .map_err(|kind| abort(&mut stage, kind))
}

fn run_stages(
    settings: &Settings,
    top_albums: &dyn TopAlbumsSource,
    album_art: &dyn AlbumArtSource,
    progress: &ProgressBar,
    stage: &mut RunStage,
) -> Result<RunSummary, RunErrorKind> {
    advance(stage, RunStage::ConfigLoaded);
    let layout = settings.layout();

    let albums =
        top_albums.fetch_top_albums(&settings.username, settings.album_limit(), settings.period)?;
    advance(stage, RunStage::AlbumsFetched);
    ensure_enough_albums(&albums, layout)?;

    let of = layout.tile_count();
    advance(stage, RunStage::ComposerRunning { tile: 1, of });
    let (collage, report) = compose_collage(
        &albums[..of],
        layout,
        album_art,
        progress,
        &mut |rank| {
            *stage = RunStage::ComposerRunning { tile: rank + 1, of };
        },
    )?;

    let output_path = collage.save(&settings.output_dir, settings.period)?;
    advance(stage, RunStage::Saved);

    Ok(RunSummary {
        output_path,
        report,
    })
}

fn advance(stage: &mut RunStage, next: RunStage) {
    info!("Run stage: {} -> {}", stage, next);
    *stage = next;
}

/// Records the stage the run failed in and moves it to `Aborted`.
fn abort(stage: &mut RunStage, kind: RunErrorKind) -> RunError {
    let failed_in = *stage;
    error!("Run aborted ({}): {}", failed_in, kind);
    advance(stage, RunStage::Aborted);
    RunError {
        stage: failed_in,
        kind,
    }
}
