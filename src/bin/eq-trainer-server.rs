//! HTTP server for the frequency guessing game.

use std::path::PathBuf;

use clap::Parser;
use eq_trainer_core::config::EngineConfig;
use eq_trainer_core::server::run_server;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "eq-trainer-server")]
#[command(about = "Serve boosted-frequency rounds and score guesses", long_about = None)]
struct Args {
    /// JSON config file (falls back to $EQ_TRAINER_CONFIG, then ./eq-trainer.json)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Listen address, e.g. 127.0.0.1:5000
    #[arg(long, value_name = "ADDR")]
    listen: Option<String>,

    /// Directory of source sounds
    #[arg(long, value_name = "DIR")]
    sounds: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut cfg = EngineConfig::load(args.config.as_deref())?;
    if let Some(listen) = args.listen {
        cfg.listen_addr = listen;
    }
    if let Some(sounds) = args.sounds {
        cfg.sounds_dir = sounds;
    }
    log::info!(
        "EQ trainer {} boot: gain={} dB Q={}",
        eq_trainer_core::VERSION,
        cfg.eq.gain_db,
        cfg.eq.q
    );

    run_server(cfg).await?;
    Ok(())
}
