// EntUser - account rows and follow-graph lookups

use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};

use crate::error::AppResult;
use crate::infrastructure::DbConnection;

const USER_COLUMNS: &str = "users.id, users.username, users.email, users.password_hash, users.date_joined";

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, SimpleObject)]
#[graphql(complex)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[graphql(skip)]
    pub password_hash: String,
    pub date_joined: DateTime<Utc>,
}

impl User {
    pub async fn gen_nullable(conn: &mut DbConnection, id: i64) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(user)
    }

    pub async fn gen_by_username(conn: &mut DbConnection, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(user)
    }

    /// Email comparison is case-insensitive (column collation)
    pub async fn gen_by_email(conn: &mut DbConnection, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
            .bind(email)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(user)
    }

    pub async fn username_exists(conn: &mut DbConnection, username: &str) -> AppResult<bool> {
        let row = sqlx::query("SELECT 1 FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row.is_some())
    }

    pub async fn email_exists(conn: &mut DbConnection, email: &str) -> AppResult<bool> {
        let row = sqlx::query("SELECT 1 FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row.is_some())
    }

    pub async fn create(
        conn: &mut DbConnection,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, email, password_hash, date_joined) VALUES (?, ?, ?, ?) \
             RETURNING id, username, email, password_hash, date_joined",
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;
        Ok(user)
    }

    pub async fn set_password_hash(
        conn: &mut DbConnection,
        id: i64,
        password_hash: &str,
    ) -> AppResult<()> {
        sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Users following `user_id`, most recent first
    pub async fn gen_followers(conn: &mut DbConnection, user_id: i64) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             JOIN follows ON follows.follower_id = users.id \
             WHERE follows.following_id = ? \
             ORDER BY follows.created_at DESC, follows.id DESC"
        ))
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(users)
    }

    /// Users that `user_id` follows, most recent first
    pub async fn gen_following(conn: &mut DbConnection, user_id: i64) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             JOIN follows ON follows.following_id = users.id \
             WHERE follows.follower_id = ? \
             ORDER BY follows.created_at DESC, follows.id DESC"
        ))
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(users)
    }
}
