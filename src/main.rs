//! inkpress - a small self-hosted blog platform backend

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inkpress::{
    api::{self, AppState, RequestStats},
    config::Config,
    db::{
        self,
        repositories::{SqlxCommentRepository, SqlxPostRepository, SqlxUserRepository},
    },
    services::{CommentService, PostService, SigninRateLimiter, TokenService, UserService},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inkpress=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting inkpress...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Create repositories
    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let post_repo = SqlxPostRepository::boxed(pool.clone());
    let comment_repo = SqlxCommentRepository::boxed(pool.clone());

    // Initialize services
    let user_service = Arc::new(UserService::new(user_repo));
    let post_service = Arc::new(PostService::new(post_repo.clone()));
    let comment_service = Arc::new(CommentService::new(comment_repo, post_repo));
    let token_service = Arc::new(TokenService::new(
        &config.auth.jwt_secret,
        config.auth.token_ttl_days,
    ));

    let rate_limiter = Arc::new(SigninRateLimiter::new());
    let request_stats = Arc::new(RequestStats::new());

    let state = AppState {
        pool: pool.clone(),
        user_service,
        post_service,
        comment_service,
        token_service,
        rate_limiter: rate_limiter.clone(),
        request_stats,
    };

    // Start rate limiter cleanup task (runs every 5 minutes)
    {
        let limiter = rate_limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(300));
            loop {
                interval.tick().await;
                limiter.cleanup().await;
            }
        });
    }

    // Build router
    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
