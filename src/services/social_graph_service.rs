// SocialGraphService - users, profiles and the follow graph

use tracing::{info, instrument, warn};

use crate::entities::{Follow, ProfileChanges, User, UserProfile};
use crate::error::{AppError, AppResult};
use crate::infrastructure::database::begin_write;
use crate::infrastructure::{DbConnection, DbPool};

pub const USER_NOT_FOUND: &str = "User not found";
pub const CANNOT_FOLLOW_SELF: &str = "You cannot follow yourself";

#[derive(Clone)]
pub struct SocialGraphService {
    pool: DbPool,
}

impl SocialGraphService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn get_user(&self, id: i64) -> AppResult<Option<User>> {
        let mut conn = self.pool.acquire().await?;
        User::gen_nullable(&mut conn, id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let mut conn = self.pool.acquire().await?;
        User::gen_by_username(&mut conn, username).await
    }

    pub async fn get_profile(&self, user_id: i64) -> AppResult<Option<UserProfile>> {
        let mut conn = self.pool.acquire().await?;
        UserProfile::gen_for_user(&mut conn, user_id).await
    }

    pub async fn followers(&self, user_id: i64) -> AppResult<Vec<User>> {
        let mut conn = self.pool.acquire().await?;
        User::gen_followers(&mut conn, user_id).await
    }

    pub async fn following(&self, user_id: i64) -> AppResult<Vec<User>> {
        let mut conn = self.pool.acquire().await?;
        User::gen_following(&mut conn, user_id).await
    }

    pub async fn is_following(&self, follower_id: i64, following_id: i64) -> AppResult<bool> {
        let mut conn = self.pool.acquire().await?;
        Follow::exists(&mut conn, follower_id, following_id).await
    }

    /// Apply the supplied fields, creating the profile row first if needed
    #[instrument(skip(self, changes))]
    pub async fn update_profile(&self, user_id: i64, changes: &ProfileChanges) -> AppResult<UserProfile> {
        let mut tx = begin_write(&self.pool).await?;

        UserProfile::ensure(&mut tx, user_id).await?;
        if !changes.is_empty() {
            UserProfile::apply_changes(&mut tx, user_id, changes).await?;
        }
        let profile = UserProfile::gen_for_user(&mut tx, user_id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Profile for user {} vanished", user_id)))?;

        tx.commit().await?;
        info!("Updated profile for user {}", user_id);
        Ok(profile)
    }

    /// Follow `target_id`. Following someone twice is a no-op.
    #[instrument(skip(self))]
    pub async fn follow(&self, follower_id: i64, target_id: i64) -> AppResult<()> {
        if follower_id == target_id {
            warn!("User {} tried to follow themselves", follower_id);
            return Err(AppError::Validation(CANNOT_FOLLOW_SELF.to_string()));
        }

        let mut tx = begin_write(&self.pool).await?;
        require_user(&mut tx, target_id).await?;

        if Follow::create_if_absent(&mut tx, follower_id, target_id).await? {
            refresh_pair(&mut tx, follower_id, target_id).await?;
            info!("User {} followed user {}", follower_id, target_id);
        }

        tx.commit().await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn unfollow(&self, follower_id: i64, target_id: i64) -> AppResult<()> {
        let mut tx = begin_write(&self.pool).await?;
        require_user(&mut tx, target_id).await?;

        if Follow::delete(&mut tx, follower_id, target_id).await? {
            refresh_pair(&mut tx, follower_id, target_id).await?;
            info!("User {} unfollowed user {}", follower_id, target_id);
        }

        tx.commit().await?;
        Ok(())
    }
}

async fn require_user(conn: &mut DbConnection, user_id: i64) -> AppResult<()> {
    match User::gen_nullable(conn, user_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound(USER_NOT_FOUND.to_string())),
    }
}

/// Both profiles exist after this call and carry exact follow counts
async fn refresh_pair(conn: &mut DbConnection, follower_id: i64, target_id: i64) -> AppResult<()> {
    UserProfile::ensure(conn, follower_id).await?;
    UserProfile::ensure(conn, target_id).await?;
    UserProfile::refresh_follow_counts(conn, follower_id).await?;
    UserProfile::refresh_follow_counts(conn, target_id).await?;
    Ok(())
}
