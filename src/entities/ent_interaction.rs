// EntInteraction - likes and shares recorded against a post

use async_graphql::{Enum, SimpleObject};
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite};

use crate::error::AppResult;
use crate::infrastructure::DbConnection;

const INTERACTION_COLUMNS: &str = "id, user_id, post_id, type, created_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Enum)]
#[sqlx(rename_all = "lowercase")]
pub enum InteractionKind {
    Like,
    Share,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, SimpleObject)]
#[graphql(complex)]
pub struct Interaction {
    pub id: i64,
    #[graphql(skip)]
    pub user_id: i64,
    #[graphql(skip)]
    pub post_id: i64,
    #[sqlx(rename = "type")]
    #[graphql(name = "type")]
    pub kind: InteractionKind,
    pub created_at: DateTime<Utc>,
}

impl Interaction {
    /// Filters combine with AND; no filter returns every interaction, newest first.
    pub async fn list(
        conn: &mut DbConnection,
        post_id: Option<i64>,
        user_id: Option<i64>,
    ) -> AppResult<Vec<Interaction>> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {INTERACTION_COLUMNS} FROM interactions WHERE 1 = 1"
        ));
        if let Some(post_id) = post_id {
            qb.push(" AND post_id = ");
            qb.push_bind(post_id);
        }
        if let Some(user_id) = user_id {
            qb.push(" AND user_id = ");
            qb.push_bind(user_id);
        }
        qb.push(" ORDER BY created_at DESC, id DESC");

        let interactions = qb
            .build_query_as::<Interaction>()
            .fetch_all(&mut *conn)
            .await?;
        Ok(interactions)
    }

    pub async fn create(
        conn: &mut DbConnection,
        user_id: i64,
        post_id: i64,
        kind: InteractionKind,
    ) -> AppResult<Interaction> {
        let interaction = sqlx::query_as::<_, Interaction>(&format!(
            "INSERT INTO interactions (user_id, post_id, type, created_at) VALUES (?, ?, ?, ?) \
             RETURNING {INTERACTION_COLUMNS}"
        ))
        .bind(user_id)
        .bind(post_id)
        .bind(kind)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;
        Ok(interaction)
    }

    /// Returns true when a like was removed
    pub async fn delete_like(conn: &mut DbConnection, user_id: i64, post_id: i64) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM interactions WHERE user_id = ? AND post_id = ? AND type = ?",
        )
        .bind(user_id)
        .bind(post_id)
        .bind(InteractionKind::Like)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
