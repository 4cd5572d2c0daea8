// EntRefreshToken - opaque refresh credentials paired with access tokens

use chrono::{DateTime, Duration, Utc};

use crate::error::AppResult;
use crate::infrastructure::DbConnection;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct RefreshToken {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    pub fn is_active(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.revoked_at.is_none() && now < self.created_at + ttl
    }

    pub async fn create(conn: &mut DbConnection, user_id: i64, token: &str) -> AppResult<RefreshToken> {
        let record = sqlx::query_as::<_, RefreshToken>(
            "INSERT INTO refresh_tokens (user_id, token, created_at) VALUES (?, ?, ?) \
             RETURNING id, user_id, token, created_at, revoked_at",
        )
        .bind(user_id)
        .bind(token)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;
        Ok(record)
    }

    pub async fn gen_by_token(conn: &mut DbConnection, token: &str) -> AppResult<Option<RefreshToken>> {
        let record = sqlx::query_as::<_, RefreshToken>(
            "SELECT id, user_id, token, created_at, revoked_at FROM refresh_tokens WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(record)
    }

    /// Returns false when the token was already revoked
    pub async fn revoke(conn: &mut DbConnection, id: i64, at: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query("UPDATE refresh_tokens SET revoked_at = ? WHERE id = ? AND revoked_at IS NULL")
            .bind(at)
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn revoke_all_for_user(conn: &mut DbConnection, user_id: i64) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = ? WHERE user_id = ? AND revoked_at IS NULL",
        )
        .bind(Utc::now())
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }
}
