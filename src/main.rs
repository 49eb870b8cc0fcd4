//! Crashpit demo runner - a headless scripted session.
//!
//! Plays a configurable number of rounds with both players holding their
//! inward drive key, logging the session event stream. The real game
//! embeds [`GameSession`] behind a UI shell instead.

use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crashpit::util::time::TICK_DURATION_MICROS;
use crashpit::{Config, GameSession, RoundPhase};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    info!("Starting Crashpit demo session");
    info!(
        arena_width = config.game.arena_width,
        arena_height = config.game.arena_height,
        map = ?config.game.map,
        p1 = ?config.game.vehicles[0],
        p2 = ?config.game.vehicles[1],
        rounds = config.demo_rounds,
        "session configuration"
    );

    let mut session = GameSession::new(config.game.clone());

    // Log every session event as it is published
    let mut events = session.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            info!(?event, "session event");
        }
    });

    session.start_round();
    script_inputs(&mut session);

    let mut ticker = interval(Duration::from_micros(TICK_DURATION_MICROS));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let mut rounds_played = 0u32;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                session.tick();
                if matches!(session.phase(), RoundPhase::Ended { .. }) {
                    rounds_played += 1;
                    if rounds_played >= config.demo_rounds {
                        break;
                    }
                    session.next_round();
                    script_inputs(&mut session);
                }
            }
            _ = &mut shutdown => {
                info!("Received shutdown signal, ending session");
                break;
            }
        }
    }

    let [p1, p2] = session.scores();
    info!(p1, p2, rounds_played, "final score");
    Ok(())
}

/// Both players hold their inward key so the demo ends in a crash or a
/// drowning rather than an eternal stand-off.
fn script_inputs(session: &mut GameSession) {
    session.key_down("KeyD");
    session.key_down("ArrowLeft");
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

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
