// AccountService - registration, credentials and token lifecycle

use chrono::{Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::config::{Config, EmailConfig};
use crate::entities::{PasswordResetToken, RefreshToken, User, UserProfile};
use crate::error::{AppError, AppResult};
use crate::infrastructure::database::begin_write;
use crate::infrastructure::mailer::password_reset_email;
use crate::infrastructure::security::{
    generate_token, hash_password, verify_password, Claims, UNUSABLE_PASSWORD,
};
use crate::infrastructure::viewer::PERMISSION_DENIED;
use crate::infrastructure::{
    DbConnection, DbPool, IdTokenVerifier, Mailer, TokenService, ViewerContext,
};

pub const INVALID_CREDENTIALS: &str = "Please enter valid credentials";
pub const INVALID_REFRESH_TOKEN: &str = "Invalid refresh token";
pub const INVALID_RESET_TOKEN: &str = "Invalid or expired reset token";
pub const RESET_REQUESTED: &str =
    "If an account with that email exists, a password reset link has been sent.";
pub const RESET_COMPLETE: &str = "Password has been reset successfully.";
pub const GOOGLE_NOT_CONFIGURED: &str = "Google OAuth is not configured";
pub const GOOGLE_EMAIL_MISSING: &str = "Email not provided by Google";
pub const GOOGLE_EMAIL_UNVERIFIED: &str = "Google account email is not verified";
pub const USERNAME_TAKEN: &str = "A user with that username already exists.";
pub const EMAIL_TAKEN: &str = "A user with that email already exists.";

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_USERNAME_LENGTH: usize = 150;

static USERNAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("username pattern"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

/// Access/refresh pair handed out on every successful sign-in
#[derive(Debug, Clone)]
pub struct AuthTokens {
    pub token: String,
    pub refresh_token: String,
    /// Unix timestamp after which the refresh token stops working
    pub refresh_expires_in: i64,
    pub user: User,
}

pub struct AccountService {
    pool: DbPool,
    tokens: Arc<TokenService>,
    mailer: Arc<dyn Mailer>,
    google: Arc<dyn IdTokenVerifier>,
    google_client_id: Option<String>,
    email: EmailConfig,
    reset_ttl: Duration,
}

impl AccountService {
    pub fn new(
        pool: DbPool,
        tokens: Arc<TokenService>,
        mailer: Arc<dyn Mailer>,
        google: Arc<dyn IdTokenVerifier>,
        config: &Config,
    ) -> Self {
        Self {
            pool,
            tokens,
            mailer,
            google,
            google_client_id: config.google.client_id.clone(),
            email: config.email.clone(),
            reset_ttl: Duration::hours(config.auth.password_reset_hours),
        }
    }

    #[instrument(skip(self, email, password))]
    pub async fn register(&self, username: &str, email: &str, password: &str) -> AppResult<AuthTokens> {
        validate_username(username)?;
        validate_email(email)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;
        let mut tx = begin_write(&self.pool).await?;

        if User::username_exists(&mut tx, username).await? {
            warn!("Registration rejected: username {} taken", username);
            return Err(AppError::Conflict(USERNAME_TAKEN.to_string()));
        }
        if User::email_exists(&mut tx, email).await? {
            warn!("Registration rejected: email already in use");
            return Err(AppError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let user = User::create(&mut tx, username, email, &password_hash)
            .await
            .map_err(registration_conflict)?;
        let tokens = self.issue_tokens(&mut tx, user).await?;

        tx.commit().await?;
        info!("Registered user {} ({})", tokens.user.username, tokens.user.id);
        Ok(tokens)
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> AppResult<AuthTokens> {
        let mut conn = self.pool.acquire().await?;

        let user = match User::gen_by_username(&mut conn, username).await? {
            Some(user) if verify_password(password, &user.password_hash) => user,
            _ => {
                warn!("Failed login for {}", username);
                return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
            }
        };

        let tokens = self.issue_tokens(&mut conn, user).await?;
        info!("User {} logged in", tokens.user.id);
        Ok(tokens)
    }

    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        self.tokens.validate_access_token(token)
    }

    /// Exchange a refresh token for a new pair. The presented token is revoked.
    #[instrument(skip_all)]
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthTokens> {
        let now = Utc::now();
        let mut tx = begin_write(&self.pool).await?;

        let record = RefreshToken::gen_by_token(&mut tx, refresh_token)
            .await?
            .filter(|record| record.is_active(now, self.tokens.refresh_ttl()))
            .ok_or_else(invalid_refresh_token)?;

        if !RefreshToken::revoke(&mut tx, record.id, now).await? {
            return Err(invalid_refresh_token());
        }

        let user = User::gen_nullable(&mut tx, record.user_id)
            .await?
            .ok_or_else(invalid_refresh_token)?;
        let tokens = self.issue_tokens(&mut tx, user).await?;

        tx.commit().await?;
        info!("Rotated refresh token for user {}", tokens.user.id);
        Ok(tokens)
    }

    /// Revoke a refresh token, returning the revocation time in unix seconds
    #[instrument(skip_all)]
    pub async fn revoke_token(&self, refresh_token: &str) -> AppResult<i64> {
        let now = Utc::now();
        let mut conn = self.pool.acquire().await?;

        let record = RefreshToken::gen_by_token(&mut conn, refresh_token)
            .await?
            .ok_or_else(invalid_refresh_token)?;
        if !RefreshToken::revoke(&mut conn, record.id, now).await? {
            return Err(invalid_refresh_token());
        }

        info!("Revoked refresh token for user {}", record.user_id);
        Ok(now.timestamp())
    }

    /// Always answers with the same message so callers cannot probe for accounts
    #[instrument(skip_all)]
    pub async fn request_password_reset(&self, email: &str) -> AppResult<String> {
        let mut conn = self.pool.acquire().await?;
        let Some(user) = User::gen_by_email(&mut conn, email).await? else {
            info!("Password reset requested for unknown email");
            return Ok(RESET_REQUESTED.to_string());
        };

        let token = generate_token();
        PasswordResetToken::create(&mut conn, user.id, &token, self.reset_ttl).await?;
        drop(conn);

        let message = password_reset_email(
            &self.email.from_address,
            &user.email,
            &user.username,
            &self.reset_link(&token),
            self.reset_ttl.num_hours(),
        );
        if let Err(e) = self.mailer.send(message).await {
            error!("Failed to send password reset email to user {}: {}", user.id, e);
            return Err(AppError::Upstream(
                "Failed to send password reset email".to_string(),
            ));
        }

        info!("Password reset email sent to user {}", user.id);
        Ok(RESET_REQUESTED.to_string())
    }

    #[instrument(skip_all)]
    pub async fn reset_password(&self, token: &str, new_password: &str) -> AppResult<String> {
        validate_password(new_password)?;
        let password_hash = hash_password(new_password)?;

        let now = Utc::now();
        let mut tx = begin_write(&self.pool).await?;

        let record = PasswordResetToken::gen_by_token(&mut tx, token)
            .await?
            .filter(|record| record.is_valid(now))
            .ok_or_else(invalid_reset_token)?;
        if !PasswordResetToken::mark_used(&mut tx, record.id).await? {
            return Err(invalid_reset_token());
        }

        User::set_password_hash(&mut tx, record.user_id, &password_hash).await?;
        let revoked = RefreshToken::revoke_all_for_user(&mut tx, record.user_id).await?;

        tx.commit().await?;
        info!(
            "Password reset for user {} ({} refresh tokens revoked)",
            record.user_id, revoked
        );
        Ok(RESET_COMPLETE.to_string())
    }

    /// Sign in with a Google ID token, creating the local account on first use
    #[instrument(skip_all)]
    pub async fn google_sign_in(&self, id_token: &str) -> AppResult<AuthTokens> {
        let client_id = self
            .google_client_id
            .as_deref()
            .ok_or_else(|| AppError::Validation(GOOGLE_NOT_CONFIGURED.to_string()))?;

        let identity = self.google.verify(id_token, client_id).await?;
        let email = identity
            .email
            .filter(|email| !email.is_empty())
            .ok_or_else(|| AppError::Validation(GOOGLE_EMAIL_MISSING.to_string()))?;
        if identity.email_verified != Some(true) {
            warn!("Google sign-in rejected: email not verified");
            return Err(AppError::Validation(GOOGLE_EMAIL_UNVERIFIED.to_string()));
        }

        let mut tx = begin_write(&self.pool).await?;

        let user = match User::gen_by_email(&mut tx, &email).await? {
            Some(user) => user,
            None => {
                let username = unique_username(&mut tx, &username_base(&email)).await?;
                let user = User::create(&mut tx, &username, &email, UNUSABLE_PASSWORD).await?;
                UserProfile::ensure_with_picture(&mut tx, user.id, identity.picture.as_deref())
                    .await?;
                info!("Created user {} from Google sign-in", user.id);
                user
            }
        };
        let tokens = self.issue_tokens(&mut tx, user).await?;

        tx.commit().await?;
        info!("User {} signed in with Google", tokens.user.id);
        Ok(tokens)
    }

    /// The signed-in caller's account
    pub async fn current_user(&self, viewer: &ViewerContext) -> AppResult<User> {
        let caller = viewer.require_user()?;
        let mut conn = self.pool.acquire().await?;
        User::gen_nullable(&mut conn, caller.user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized(PERMISSION_DENIED.to_string()))
    }

    fn reset_link(&self, token: &str) -> String {
        format!(
            "{}/reset-password?token={}",
            self.email.frontend_url.trim_end_matches('/'),
            token
        )
    }

    async fn issue_tokens(&self, conn: &mut DbConnection, user: User) -> AppResult<AuthTokens> {
        let token = self.tokens.issue_access_token(user.id, &user.username)?;
        let refresh = RefreshToken::create(conn, user.id, &generate_token()).await?;

        Ok(AuthTokens {
            token,
            refresh_expires_in: (refresh.created_at + self.tokens.refresh_ttl()).timestamp(),
            refresh_token: refresh.token,
            user,
        })
    }
}

fn invalid_refresh_token() -> AppError {
    AppError::Unauthorized(INVALID_REFRESH_TOKEN.to_string())
}

fn invalid_reset_token() -> AppError {
    AppError::Validation(INVALID_RESET_TOKEN.to_string())
}

/// Map a unique-index violation on insert to the matching duplicate message
fn registration_conflict(err: AppError) -> AppError {
    match err {
        AppError::Conflict(detail) if detail.contains("username") => {
            AppError::Conflict(USERNAME_TAKEN.to_string())
        }
        AppError::Conflict(_) => AppError::Conflict(EMAIL_TAKEN.to_string()),
        other => other,
    }
}

pub fn validate_username(username: &str) -> AppResult<()> {
    if username.chars().count() > MAX_USERNAME_LENGTH || !USERNAME_RE.is_match(username) {
        return Err(AppError::Validation(
            "Enter a valid username. It may contain only letters, numbers, and @/./+/-/_ characters."
                .to_string(),
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> AppResult<()> {
    if !EMAIL_RE.is_match(email) {
        return Err(AppError::Validation("Enter a valid email address.".to_string()));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(format!(
            "This password is too short. It must contain at least {} characters.",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// Username seed derived from the local part of an email address
fn username_base(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let base: String = local
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '@' | '+' | '-' | '_'))
        .take(MAX_USERNAME_LENGTH - 10)
        .collect();

    if base.is_empty() {
        "user".to_string()
    } else {
        base
    }
}

async fn unique_username(conn: &mut DbConnection, base: &str) -> AppResult<String> {
    if !User::username_exists(conn, base).await? {
        return Ok(base.to_string());
    }

    let mut suffix: u64 = 1;
    loop {
        let candidate = format!("{}{}", base, suffix);
        if !User::username_exists(conn, &candidate).await? {
            return Ok(candidate);
        }
        suffix += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames_allow_the_documented_characters() {
        assert!(validate_username("alice.b+c-d_e@x").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"a".repeat(151)).is_err());
    }

    #[test]
    fn email_and_password_rules() {
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("nope").is_err());
        assert!(validate_email("a@b").is_err());
        assert!(validate_password("short").is_err());
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn username_base_uses_the_email_local_part() {
        assert_eq!(username_base("jane.doe@gmail.com"), "jane.doe");
        assert_eq!(username_base("we!rd#@x.com"), "werd");
        assert_eq!(username_base("!!!@x.com"), "user");
    }

    #[test]
    fn unique_violations_on_insert_read_as_duplicates() {
        let email = registration_conflict(AppError::Conflict(
            "UNIQUE constraint failed: users.email".to_string(),
        ));
        assert_eq!(email.message(), EMAIL_TAKEN);

        let username = registration_conflict(AppError::Conflict(
            "UNIQUE constraint failed: users.username".to_string(),
        ));
        assert_eq!(username.message(), USERNAME_TAKEN);

        let other = registration_conflict(AppError::Database("disk I/O error".to_string()));
        assert!(matches!(other, AppError::Database(_)));
    }
}
