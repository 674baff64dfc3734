//! Standalone development server.
//!
//! Binds to `QUIZARENA_ADDR` (default `127.0.0.1:8080`) and fabricates
//! player profiles from user IDs instead of calling the platform's
//! user service.

use quizarena::prelude::*;

/// Fabricates a profile from the ID. Development only.
struct DevProfiles;

impl ProfileProvider for DevProfiles {
    async fn resolve(
        &self,
        user_id: UserId,
    ) -> Result<PlayerProfile, SessionError> {
        Ok(PlayerProfile {
            user_id,
            name: format!("player-{}", user_id.0),
            level: 1,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), QuizArenaError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new("info")
                }),
        )
        .init();

    let addr = std::env::var("QUIZARENA_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    let server = QuizArenaServer::<DevProfiles>::builder()
        .bind(&addr)
        .build(DevProfiles)
        .await?;
    tracing::info!(%addr, "QuizArena dev server listening");
    server.run().await
}
