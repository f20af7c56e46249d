use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use avatar_gateway::api::{self, ApiState};
use avatar_gateway::model::CompletionClient;
use avatar_gateway::notify::GraphQlPublisher;
use avatar_gateway::storage::HttpObjectStore;
use avatar_gateway::tts::SpeechClient;
use avatar_gateway::{ChatPipeline, Config, ExchangeRepo};
use avatar_gateway::{audio, db, lipsync};

/// Avatar - conversational speech gateway for talking avatars
#[derive(Parser)]
#[command(name = "avatar", version, about)]
struct Cli {
    /// Port to listen on (overrides configuration)
    #[arg(long, env = "AVATAR_PORT")]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Compute a lip-sync track from a local audio file
    Track {
        /// Path to an MP3 or WAV file
        file: PathBuf,

        /// Peak-normalized loudness threshold
        #[arg(short, long, default_value = "0.2")]
        threshold: f32,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,avatar_gateway=info",
        1 => "info,avatar_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(cmd) = cli.command {
        return match cmd {
            Command::Track { file, threshold } => cmd_track(&file, threshold),
        };
    }

    let config = Config::load()?;
    let port = cli.port.unwrap_or(config.server.port);

    tracing::info!(port, "starting avatar gateway");

    // Service clients are constructed once here and shared across requests
    let model = Arc::new(CompletionClient::new(&config.model)?);
    let synthesizer = Arc::new(SpeechClient::new(&config.tts)?);
    let store = Arc::new(HttpObjectStore::new(&config.storage));
    let publisher = Arc::new(GraphQlPublisher::new(&config.push));

    let pool = db::init(config.db_path())?;
    let exchanges = ExchangeRepo::new(pool.clone());

    let pipeline = ChatPipeline::new(
        model,
        synthesizer,
        store,
        publisher,
        exchanges,
        config.lipsync,
    );

    let state = Arc::new(ApiState {
        pipeline: Arc::new(pipeline),
        db: pool,
    });

    tracing::info!(channel = %config.push.channel, "avatar gateway ready");
    api::serve(state, port).await?;

    Ok(())
}

/// Print the lip-sync track for a local audio file
fn cmd_track(file: &Path, threshold: f32) -> anyhow::Result<()> {
    let bytes = std::fs::read(file)?;
    let format = audio::AudioFormat::from_path(file)
        .ok_or_else(|| anyhow::anyhow!("unsupported audio format: {}", file.display()))?;

    let waveform = audio::decode(&bytes, format)?;
    let config = lipsync::LipSyncConfig {
        threshold,
        ..lipsync::LipSyncConfig::default()
    };
    let track = lipsync::extract(&waveform, &config)?;

    println!(
        "{} samples at {} Hz -> {} events ({:.2}s)",
        waveform.samples.len(),
        waveform.sample_rate,
        track.len(),
        waveform.duration_secs()
    );
    for event in &track.events {
        println!(
            "{:7.3}s  {}",
            event.time,
            if event.mouth_open { "open" } else { "closed" }
        );
    }

    Ok(())
}
