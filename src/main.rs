//! Penalty Dash - headless session runner
//!
//! Plays one full game with the autopilot and logs every phase change,
//! tackle encounter and the final result.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use penalty_dash::app::{Autopilot, HeadlessHost, Session};
use penalty_dash::config::Config;
use penalty_dash::game::PhaseCoordinator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    let tuning = config.tuning()?;
    let rng = match config.seed {
        Some(seed) => {
            info!(seed, "Using fixed seed");
            ChaCha8Rng::seed_from_u64(seed)
        }
        None => ChaCha8Rng::from_entropy(),
    };

    info!("Starting Penalty Dash session");
    info!(
        width = config.viewport_width,
        height = config.viewport_height,
        frame_rate = config.frame_rate,
        "Surface configured"
    );

    let host = HeadlessHost::from_config(&config, &tuning);
    let coordinator = PhaseCoordinator::new(host, tuning, rng)?;
    let session = Session::new(coordinator, Autopilot::default(), config.frame_rate)
        .with_max_frames(config.max_frames)
        .with_snapshot_every(config.snapshot_every);

    tokio::select! {
        report = session.run() => {
            match report.outcome {
                Some(outcome) => {
                    info!(frames = report.frames, result = outcome.caption(), "Game over")
                }
                None => info!(frames = report.frames, "Frame cap reached before the game ended"),
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, stopping session");
        }
    }

    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}
