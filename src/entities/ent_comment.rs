// EntComment - comments attached to a post

use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};

use crate::error::AppResult;
use crate::infrastructure::DbConnection;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, SimpleObject)]
#[graphql(complex)]
pub struct Comment {
    pub id: i64,
    #[graphql(skip)]
    pub post_id: i64,
    #[graphql(skip)]
    pub author_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub async fn create(
        conn: &mut DbConnection,
        post_id: i64,
        author_id: i64,
        content: &str,
    ) -> AppResult<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (post_id, author_id, content, created_at) VALUES (?, ?, ?, ?) \
             RETURNING id, post_id, author_id, content, created_at",
        )
        .bind(post_id)
        .bind(author_id)
        .bind(content)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;
        Ok(comment)
    }

    /// Oldest first
    pub async fn list_for_post(conn: &mut DbConnection, post_id: i64) -> AppResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT id, post_id, author_id, content, created_at FROM comments \
             WHERE post_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(post_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(comments)
    }
}
