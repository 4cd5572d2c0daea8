// EntPost - posts, quote posts and reposts with their denormalized counters

use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite};

use crate::error::AppResult;
use crate::infrastructure::DbConnection;

const POST_COLUMNS: &str = "posts.id, posts.author_id, posts.content, posts.created_at, posts.updated_at, \
                            posts.likes_count, posts.comments_count, posts.shares_count, \
                            posts.quotes_count, posts.reposts_count, posts.quoted_post_id, posts.is_repost";

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, SimpleObject)]
#[graphql(complex)]
pub struct Post {
    pub id: i64,
    #[graphql(skip)]
    pub author_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub likes_count: i64,
    pub comments_count: i64,
    pub shares_count: i64,
    pub quotes_count: i64,
    pub reposts_count: i64,
    #[graphql(skip)]
    pub quoted_post_id: Option<i64>,
    pub is_repost: bool,
}

/// Feed listing parameters. `offset` is applied before `limit`.
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    pub search: Option<String>,
    pub author_id: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Post {
    pub async fn gen_nullable(conn: &mut DbConnection, id: i64) -> AppResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(post)
    }

    pub async fn exists(conn: &mut DbConnection, id: i64) -> AppResult<bool> {
        let row = sqlx::query("SELECT 1 FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row.is_some())
    }

    /// Newest first. Search matches content or author username, case-insensitively.
    pub async fn list(conn: &mut DbConnection, query: &PostQuery) -> AppResult<Vec<Post>> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {POST_COLUMNS} FROM posts JOIN users ON users.id = posts.author_id WHERE 1 = 1"
        ));

        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = like_pattern(search);
            qb.push(" AND (posts.content LIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" ESCAPE '\\' OR users.username LIKE ");
            qb.push_bind(pattern);
            qb.push(" ESCAPE '\\')");
        }
        if let Some(author_id) = query.author_id {
            qb.push(" AND posts.author_id = ");
            qb.push_bind(author_id);
        }

        qb.push(" ORDER BY posts.created_at DESC, posts.id DESC");

        // SQLite needs a LIMIT before OFFSET; -1 means unbounded
        qb.push(" LIMIT ");
        qb.push_bind(query.limit.unwrap_or(-1));
        qb.push(" OFFSET ");
        qb.push_bind(query.offset.unwrap_or(0));

        let posts = qb.build_query_as::<Post>().fetch_all(&mut *conn).await?;
        Ok(posts)
    }

    pub async fn create(
        conn: &mut DbConnection,
        author_id: i64,
        content: &str,
        quoted_post_id: Option<i64>,
        is_repost: bool,
    ) -> AppResult<Post> {
        let now = Utc::now();
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO posts (author_id, content, created_at, updated_at, quoted_post_id, is_repost) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(author_id)
        .bind(content)
        .bind(now)
        .bind(now)
        .bind(quoted_post_id)
        .bind(is_repost)
        .fetch_one(&mut *conn)
        .await?;

        Self::gen_enforce(conn, id).await
    }

    pub async fn gen_enforce(conn: &mut DbConnection, id: i64) -> AppResult<Post> {
        Self::gen_nullable(conn, id)
            .await?
            .ok_or_else(|| crate::error::AppError::NotFound("Post not found".to_string()))
    }

    /// Remove `author_id`'s repost of `target_id`, reporting whether one existed
    pub async fn delete_repost(
        conn: &mut DbConnection,
        author_id: i64,
        target_id: i64,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM posts WHERE author_id = ? AND quoted_post_id = ? AND is_repost = 1",
        )
        .bind(author_id)
        .bind(target_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Re-derive every counter from its source rows
    pub async fn refresh_counters(conn: &mut DbConnection, id: i64) -> AppResult<()> {
        sqlx::query(
            "UPDATE posts SET \
             likes_count = (SELECT COUNT(*) FROM interactions i WHERE i.post_id = posts.id AND i.type = 'like'), \
             shares_count = (SELECT COUNT(*) FROM interactions i WHERE i.post_id = posts.id AND i.type = 'share'), \
             comments_count = (SELECT COUNT(*) FROM comments c WHERE c.post_id = posts.id), \
             quotes_count = (SELECT COUNT(*) FROM posts q WHERE q.quoted_post_id = posts.id AND q.is_repost = 0), \
             reposts_count = (SELECT COUNT(*) FROM posts r WHERE r.quoted_post_id = posts.id AND r.is_repost = 1) \
             WHERE id = ?",
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}

/// Substring LIKE pattern with the wildcard characters of `search` escaped
pub fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
