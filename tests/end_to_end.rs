//! End-to-end runs against a local stand-in for the Last.fm API and its
//! image hosts.

use image::{ImageFormat, Rgb, RgbImage};
use indicatif::ProgressBar;
use lastfm_collage::api_client::{build_http_client, HttpArtFetcher, LastFmClient};
use lastfm_collage::{
    run, CollageError, FetchError, Period, RunError, RunErrorKind, RunStage, RunSummary, Settings,
};
use serde_json::json;
use std::io::Cursor;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tiny_http::{Header, Response, Server};

struct Fixture {
    album_count: usize,
    broken_rank: Option<usize>,
    unknown_user: bool,
}

struct TestServer {
    base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

fn color_for(rank: usize) -> Rgb<u8> {
    Rgb([30 + rank as u8 * 25, 220 - rank as u8 * 20, 60])
}

fn png_cover(rank: usize) -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbImage::from_pixel(120, 120, color_for(rank))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn header(raw: &str) -> Header {
    raw.parse::<Header>().unwrap()
}

/// Start a server answering ranking requests and cover downloads
fn start_test_server(fixture: Fixture) -> TestServer {
    let server = Server::http("127.0.0.1:0").unwrap();
    let address = server.server_addr().to_ip().unwrap();
    let base_url = format!("http://{}", address);
    let requests = Arc::new(Mutex::new(Vec::new()));

    let art_base = base_url.clone();
    let recorded = Arc::clone(&requests);
    std::thread::spawn(move || {
        for request in server.incoming_requests() {
            let url = request.url().to_string();
            recorded.lock().unwrap().push(url.clone());

            let response = if url.starts_with("/2.0/") && fixture.unknown_user {
                Response::from_string(json!({"error": 6, "message": "User not found"}).to_string())
                    .with_status_code(404)
                    .with_header(header("Content-Type: application/json"))
            } else if url.starts_with("/2.0/") {
                let albums: Vec<_> = (0..fixture.album_count)
                    .map(|rank| {
                        json!({
                            "name": format!("Album {rank}"),
                            "artist": {"name": format!("Artist {rank}")},
                            "image": [
                                {"#text": format!("{art_base}/art/small/{rank}.png"), "size": "small"},
                                {"#text": format!("{art_base}/art/{rank}.png"), "size": "extralarge"}
                            ]
                        })
                    })
                    .collect();
                Response::from_string(json!({"topalbums": {"album": albums}}).to_string())
                    .with_header(header("Content-Type: application/json"))
            } else if let Some(rank) = url
                .strip_prefix("/art/")
                .and_then(|name| name.strip_suffix(".png"))
                .and_then(|rank| rank.parse::<usize>().ok())
                .filter(|rank| Some(*rank) != fixture.broken_rank)
            {
                Response::from_data(png_cover(rank)).with_header(header("Content-Type: image/png"))
            } else {
                Response::from_string("Not Found").with_status_code(404)
            };
            let _ = request.respond(response);
        }
    });

    TestServer { base_url, requests }
}

fn settings(server: &TestServer, output_dir: &Path) -> Settings {
    Settings {
        api_key: "test-key".to_string(),
        username: "rj".to_string(),
        period: Period::SevenDay,
        grid_width: 3,
        grid_height: 3,
        tile_size_px: 300,
        api_base_url: format!("{}/2.0/", server.base_url),
        output_dir: output_dir.to_path_buf(),
        timeout_secs: Some(10),
    }
}

fn run_against(settings: &Settings) -> Result<RunSummary, RunError> {
    let client = build_http_client(settings.timeout_secs.map(std::time::Duration::from_secs))
        .unwrap();
    let top_albums = LastFmClient::from_settings(client.clone(), settings);
    let album_art = HttpArtFetcher::new(client);
    run(settings, &top_albums, &album_art, &ProgressBar::hidden())
}

fn tile_is_black(collage: &RgbImage, column: u32, row: u32, size: u32) -> bool {
    (row * size..(row + 1) * size).all(|y| {
        (column * size..(column + 1) * size).all(|x| collage.get_pixel(x, y) == &Rgb([0, 0, 0]))
    })
}

fn assert_tile_color(collage: &RgbImage, column: u32, row: u32, size: u32, expected: Rgb<u8>) {
    let pixel = collage.get_pixel(column * size + size / 2, row * size + size / 2);
    for (actual, expected) in pixel.0.iter().zip(expected.0.iter()) {
        assert!(
            actual.abs_diff(*expected) <= 2,
            "tile ({column}, {row}) is {pixel:?}, expected {expected:?}"
        );
    }
}

#[test]
fn test_full_grid_is_saved() {
    let server = start_test_server(Fixture {
        album_count: 9,
        broken_rank: None,
        unknown_user: false,
    });
    let temp_dir = TempDir::new().unwrap();

    let summary = run_against(&settings(&server, temp_dir.path())).unwrap();

    assert_eq!(
        summary.output_path,
        temp_dir.path().join("3x3_7day_collage.png")
    );
    assert_eq!(summary.report.filled.len(), 9);

    let collage = image::open(&summary.output_path).unwrap().to_rgb8();
    assert_eq!(collage.dimensions(), (900, 900));
    for rank in 0..9u32 {
        let (column, row) = (rank % 3, rank / 3);
        assert!(!tile_is_black(&collage, column, row, 300));
        assert_tile_color(&collage, column, row, 300, color_for(rank as usize));
    }
}

#[test]
fn test_ranking_request_asks_for_one_album_per_tile() {
    let server = start_test_server(Fixture {
        album_count: 9,
        broken_rank: None,
        unknown_user: false,
    });
    let temp_dir = TempDir::new().unwrap();

    run_against(&settings(&server, temp_dir.path())).unwrap();

    let requests = server.requests.lock().unwrap();
    let ranking: Vec<_> = requests.iter().filter(|url| url.starts_with("/2.0/")).collect();
    assert_eq!(ranking.len(), 1);
    let query = ranking[0];
    assert!(query.contains("method=user.gettopalbums"));
    assert!(query.contains("user=rj"));
    assert!(query.contains("api_key=test-key"));
    assert!(query.contains("format=json"));
    assert!(query.contains("limit=9"));
    assert!(query.contains("period=7day"));

    // Only the largest variant of each cover is downloaded.
    assert_eq!(requests.iter().filter(|url| url.starts_with("/art/")).count(), 9);
    assert!(!requests.iter().any(|url| url.starts_with("/art/small/")));
}

#[test]
fn test_short_ranking_writes_nothing() {
    let server = start_test_server(Fixture {
        album_count: 5,
        broken_rank: None,
        unknown_user: false,
    });
    let temp_dir = TempDir::new().unwrap();

    let err = run_against(&settings(&server, temp_dir.path())).unwrap_err();

    assert_eq!(err.stage, RunStage::AlbumsFetched);
    assert!(matches!(
        err.kind,
        RunErrorKind::Collage(CollageError::InsufficientAlbums {
            needed: 9,
            available: 5
        })
    ));
    assert!(!temp_dir.path().join("3x3_7day_collage.png").exists());
    let requests = server.requests.lock().unwrap();
    assert!(!requests.iter().any(|url| url.starts_with("/art/")));
}

#[test]
fn test_unreachable_cover_leaves_its_tile_blank() {
    let server = start_test_server(Fixture {
        album_count: 9,
        broken_rank: Some(4),
        unknown_user: false,
    });
    let temp_dir = TempDir::new().unwrap();

    let summary = run_against(&settings(&server, temp_dir.path())).unwrap();

    assert_eq!(summary.report.filled.len(), 8);
    assert_eq!(summary.report.blank.len(), 1);
    assert_eq!(
        (summary.report.blank[0].column, summary.report.blank[0].row),
        (1, 1)
    );

    let collage = image::open(&summary.output_path).unwrap().to_rgb8();
    assert_eq!(collage.dimensions(), (900, 900));
    assert!(tile_is_black(&collage, 1, 1, 300));
    for rank in (0..9u32).filter(|rank| *rank != 4) {
        let (column, row) = (rank % 3, rank / 3);
        assert_tile_color(&collage, column, row, 300, color_for(rank as usize));
    }
}

#[test]
fn test_unknown_user_aborts_with_api_message() {
    let server = start_test_server(Fixture {
        album_count: 0,
        broken_rank: None,
        unknown_user: true,
    });
    let temp_dir = TempDir::new().unwrap();

    let err = run_against(&settings(&server, temp_dir.path())).unwrap_err();

    assert_eq!(err.stage, RunStage::ConfigLoaded);
    match err.kind {
        RunErrorKind::Fetch(FetchError::Status { status, message }) => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(message.as_deref(), Some("User not found"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}
