//! Application state management.
//!
//! Defines the AppState struct that holds the generator, the diagram store,
//! the change feed and the token validator shared by all route handlers.

use crate::services::{
    DiagramGenerator, GatewayCompletionClient, InMemoryQuotaGate, JwtService,
    PostgresQuotaGate, PromptCompiler, QuotaGate, QuotaPolicy, SharedJwtService,
};
use crate::storage::{
    DiagramEvents, DiagramStore, InMemoryDiagramStore, PostgresDiagramStore, StorageError,
};
use anyhow::anyhow;
use axum::extract::FromRef;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

/// Application state shared across all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<DiagramGenerator>,
    pub store: Arc<dyn DiagramStore>,
    pub events: DiagramEvents,
    pub jwt: SharedJwtService,
    /// PostgreSQL pool when DATABASE_URL is configured
    pub database: Option<PgPool>,
    /// Prefix for share links, e.g. https://diagrams.example.com
    pub public_base_url: Option<String>,
}

impl AppState {
    /// Assemble state from explicit parts. Used by `from_env` and by tests.
    pub fn new(
        generator: Arc<DiagramGenerator>,
        store: Arc<dyn DiagramStore>,
        jwt: SharedJwtService,
    ) -> Self {
        Self {
            generator,
            store,
            events: DiagramEvents::new(),
            jwt,
            database: None,
            public_base_url: None,
        }
    }

    /// Build the production state from environment configuration.
    ///
    /// With DATABASE_URL set, migrations are run and both the diagram store and
    /// the quota counter live in PostgreSQL; otherwise both are in memory.
    pub async fn from_env() -> anyhow::Result<Self> {
        let jwt = Arc::new(JwtService::from_env().map_err(|e| anyhow!(e))?);
        let policy = QuotaPolicy::from_env();
        let completion = Arc::new(GatewayCompletionClient::from_env());

        let database = match std::env::var("DATABASE_URL") {
            Ok(url) => Some(connect_database(&url).await?),
            Err(_) => None,
        };

        let (store, quota): (Arc<dyn DiagramStore>, Arc<dyn QuotaGate>) = match &database {
            Some(pool) => {
                info!("Using PostgreSQL diagram store and quota counter");
                (
                    Arc::new(PostgresDiagramStore::new(pool.clone())),
                    Arc::new(PostgresQuotaGate::new(pool.clone())),
                )
            }
            None => {
                info!("DATABASE_URL not set; using in-memory diagram store and quota");
                (
                    Arc::new(InMemoryDiagramStore::new()),
                    Arc::new(InMemoryQuotaGate::new()),
                )
            }
        };

        info!(
            max_requests = policy.max_requests,
            window_minutes = policy.window_minutes,
            "Generation quota configured"
        );

        let generator = Arc::new(DiagramGenerator::new(
            PromptCompiler::default(),
            completion,
            quota,
            policy,
        ));

        let mut state = Self::new(generator, store, jwt);
        state.database = database;
        state.public_base_url = std::env::var("PUBLIC_BASE_URL")
            .ok()
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());
        Ok(state)
    }

    /// Public link for a share token.
    pub fn share_url(&self, share_token: &str) -> String {
        match &self.public_base_url {
            Some(base) => format!("{}/shared/{}", base, share_token),
            None => format!("/shared/{}", share_token),
        }
    }

    /// Check if PostgreSQL storage is enabled
    pub fn is_postgres(&self) -> bool {
        self.database.is_some()
    }
}

async fn connect_database(database_url: &str) -> Result<PgPool, StorageError> {
    let pool = PgPool::connect(database_url).await.map_err(|e| {
        StorageError::ConnectionError(format!("Failed to connect to database: {}", e))
    })?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| StorageError::ConnectionError(format!("Migration failed: {}", e)))?;

    Ok(pool)
}

impl FromRef<AppState> for SharedJwtService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.jwt.clone()
    }
}
