// EntFollow - directed follower -> following edges

use chrono::Utc;

use crate::error::AppResult;
use crate::infrastructure::DbConnection;

pub struct Follow;

impl Follow {
    /// Insert the edge unless it is already there. Returns true when a row was written.
    pub async fn create_if_absent(
        conn: &mut DbConnection,
        follower_id: i64,
        following_id: i64,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO follows (follower_id, following_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(follower_id)
        .bind(following_id)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(conn: &mut DbConnection, follower_id: i64, following_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM follows WHERE follower_id = ? AND following_id = ?")
            .bind(follower_id)
            .bind(following_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(conn: &mut DbConnection, follower_id: i64, following_id: i64) -> AppResult<bool> {
        let row = sqlx::query("SELECT 1 FROM follows WHERE follower_id = ? AND following_id = ?")
            .bind(follower_id)
            .bind(following_id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row.is_some())
    }
}
