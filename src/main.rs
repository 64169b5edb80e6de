use anyhow::Context;
use clap::Command;
use lastfm_collage::configuration::{create_config, CONFIG_FILE_NAME};
use lastfm_collage::startup::run_from_environment;
use std::path::Path;

fn main() -> anyhow::Result<()> {
    let args = Command::new("lastfm-collage")
        .about("🎵 Build a cover art collage from your Last.fm top albums 🎵")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand(Command::new("run").about("🖼️ Fetch your top albums and save the collage"))
        .subcommand(Command::new("config").about("🛠️ Create a collage.yaml settings template"))
        .get_matches();

    init_environment();
    init_logger();

    let cfg_file = Path::new(CONFIG_FILE_NAME);

    match args.subcommand() {
        Some(("config", _)) => {
            println!("\x1b[1m\x1b[34mConfiguring lastfm-collage...\x1b[0m");
            create_config(cfg_file).map_err(|err| anyhow::anyhow!(err.to_string()))
        }
        _ => {
            println!("\x1b[1m\x1b[34mBuilding your collage...\x1b[0m");
            let summary = run_from_environment(cfg_file).context("Collage run failed")?;

            if !summary.report.blank.is_empty() {
                println!(
                    "\x1b[33m{} cover(s) could not be fetched, their tiles are blank.\x1b[0m",
                    summary.report.blank.len()
                );
            }
            println!(
                "\x1b[32mCollage saved to {}\x1b[0m",
                summary.output_path.display()
            );
            Ok(())
        }
    }
}

fn init_environment() {
    if let Ok(path) = dotenvy::dotenv() {
        // Logging is not initialized yet
        eprintln!("Loaded environment from dotenv file {:?}", path);
    }
}

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
