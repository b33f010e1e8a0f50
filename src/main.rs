//! Headless AI-vs-AI simulator
//!
//! Runs full games in memory and reports landlord/farmer win counts. Useful
//! for exercising the engine end to end and for eyeballing heuristic changes.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use doudizhu_engine::application::GameSession;
use doudizhu_engine::domain::GamePhase;

/// Hard cap on turns per game, far above anything a real game reaches
const TURN_LIMIT: u32 = 600;

fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "doudizhu_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let games: u64 = std::env::var("SIM_GAMES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(100);
    let seed: Option<u64> = std::env::var("SIM_SEED")
        .ok()
        .and_then(|v| v.parse().ok());

    tracing::info!(games, ?seed, "starting simulation");

    let mut landlord_wins = 0u64;
    let mut farmer_wins = 0u64;
    let mut unfinished = 0u64;
    let mut total_turns = 0u64;

    for game in 0..games {
        let game_seed = seed.map(|s| s.wrapping_add(game));
        let mut session = GameSession::new(game_seed, None);
        session.new_round();

        let mut turns = 0u32;
        while session.state().phase == GamePhase::Playing && turns < TURN_LIMIT {
            session.advance();
            turns += 1;
        }
        total_turns += u64::from(turns);

        match session.state().landlord_side_won() {
            Some(true) => landlord_wins += 1,
            Some(false) => farmer_wins += 1,
            None => {
                unfinished += 1;
                tracing::warn!(game, "game hit the turn limit without a winner");
            }
        }
    }

    let avg_turns = if games > 0 { total_turns / games } else { 0 };
    tracing::info!(
        games,
        landlord_wins,
        farmer_wins,
        unfinished,
        avg_turns,
        "simulation complete"
    );
    Ok(())
}
