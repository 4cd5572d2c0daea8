// EntPasswordResetToken - single-use, time-limited reset credentials

use chrono::{DateTime, Duration, Utc};

use crate::error::AppResult;
use crate::infrastructure::DbConnection;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PasswordResetToken {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_used: bool,
}

impl PasswordResetToken {
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.is_used && now < self.expires_at
    }

    pub async fn create(
        conn: &mut DbConnection,
        user_id: i64,
        token: &str,
        valid_for: Duration,
    ) -> AppResult<PasswordResetToken> {
        let now = Utc::now();
        let record = sqlx::query_as::<_, PasswordResetToken>(
            "INSERT INTO password_reset_tokens (user_id, token, created_at, expires_at, is_used) \
             VALUES (?, ?, ?, ?, 0) \
             RETURNING id, user_id, token, created_at, expires_at, is_used",
        )
        .bind(user_id)
        .bind(token)
        .bind(now)
        .bind(now + valid_for)
        .fetch_one(&mut *conn)
        .await?;
        Ok(record)
    }

    pub async fn gen_by_token(conn: &mut DbConnection, token: &str) -> AppResult<Option<PasswordResetToken>> {
        let record = sqlx::query_as::<_, PasswordResetToken>(
            "SELECT id, user_id, token, created_at, expires_at, is_used \
             FROM password_reset_tokens WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(record)
    }

    /// Flip `is_used`, returning false if someone else already consumed it
    pub async fn mark_used(conn: &mut DbConnection, id: i64) -> AppResult<bool> {
        let result = sqlx::query("UPDATE password_reset_tokens SET is_used = 1 WHERE id = ? AND is_used = 0")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
