use std::sync::Arc;

use crate::{
    config::Config,
    error::AppResult,
    infrastructure::{
        database, DbPool, GoogleTokenVerifier, IdTokenVerifier, LogMailer, Mailer, TokenService,
    },
    schemas::{build_schema, FeedSchema},
    services::{AccountService, FeedService, SocialGraphService},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub tokens: Arc<TokenService>,
    pub accounts: Arc<AccountService>,
    pub feed: FeedService,
    pub social: SocialGraphService,
    pub schema: FeedSchema,
    pub config: Config,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        // Initialize database (runs migrations)
        let pool = database::connect(&config.database).await?;

        Ok(Self::with_parts(
            pool,
            config,
            Arc::new(LogMailer),
            Arc::new(GoogleTokenVerifier::new()),
        ))
    }

    /// Wire the services over an existing pool with the given collaborators
    pub fn with_parts(
        pool: DbPool,
        config: Config,
        mailer: Arc<dyn Mailer>,
        google: Arc<dyn IdTokenVerifier>,
    ) -> Self {
        let tokens = Arc::new(TokenService::from_config(&config.auth));
        let accounts = Arc::new(AccountService::new(
            pool.clone(),
            tokens.clone(),
            mailer,
            google,
            &config,
        ));
        let feed = FeedService::new(pool.clone());
        let social = SocialGraphService::new(pool.clone());
        let schema = build_schema(accounts.clone(), feed.clone(), social.clone());

        Self {
            pool,
            tokens,
            accounts,
            feed,
            social,
            schema,
            config,
        }
    }
}
