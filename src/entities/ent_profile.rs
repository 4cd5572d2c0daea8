// EntUserProfile - per-user profile row with follow counters

use async_graphql::SimpleObject;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite};

use crate::error::AppResult;
use crate::infrastructure::DbConnection;

const PROFILE_COLUMNS: &str = "id, user_id, bio, date_of_birth, location, profile_picture, \
                               followers_count, following_count, created_at, updated_at";

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, SimpleObject)]
#[graphql(complex)]
pub struct UserProfile {
    pub id: i64,
    pub user_id: i64,
    pub bio: Option<String>,
    #[graphql(skip)]
    pub date_of_birth: Option<NaiveDate>,
    pub location: Option<String>,
    pub profile_picture: Option<String>,
    pub followers_count: i64,
    pub following_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied to a profile update; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub bio: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub location: Option<String>,
    pub profile_picture: Option<String>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.bio.is_none()
            && self.date_of_birth.is_none()
            && self.location.is_none()
            && self.profile_picture.is_none()
    }
}

impl UserProfile {
    pub async fn gen_for_user(conn: &mut DbConnection, user_id: i64) -> AppResult<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE user_id = ?"
        ))
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(profile)
    }

    /// Create the profile row on first use and return it
    pub async fn ensure(conn: &mut DbConnection, user_id: i64) -> AppResult<UserProfile> {
        Self::ensure_with_picture(conn, user_id, None).await
    }

    /// Like `ensure`, seeding the picture when the row is new
    pub async fn ensure_with_picture(
        conn: &mut DbConnection,
        user_id: i64,
        profile_picture: Option<&str>,
    ) -> AppResult<UserProfile> {
        let now = Utc::now();
        sqlx::query(
            "INSERT OR IGNORE INTO user_profiles (user_id, profile_picture, created_at, updated_at) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(profile_picture)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        let profile = sqlx::query_as::<_, UserProfile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE user_id = ?"
        ))
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(profile)
    }

    pub async fn apply_changes(
        conn: &mut DbConnection,
        user_id: i64,
        changes: &ProfileChanges,
    ) -> AppResult<()> {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE user_profiles SET updated_at = ");
        qb.push_bind(Utc::now());

        if let Some(bio) = &changes.bio {
            qb.push(", bio = ");
            qb.push_bind(bio.clone());
        }
        if let Some(date_of_birth) = changes.date_of_birth {
            qb.push(", date_of_birth = ");
            qb.push_bind(date_of_birth);
        }
        if let Some(location) = &changes.location {
            qb.push(", location = ");
            qb.push_bind(location.clone());
        }
        if let Some(profile_picture) = &changes.profile_picture {
            qb.push(", profile_picture = ");
            qb.push_bind(profile_picture.clone());
        }

        qb.push(" WHERE user_id = ");
        qb.push_bind(user_id);

        qb.build().execute(&mut *conn).await?;
        Ok(())
    }

    /// Re-derive both follow counters from the follows table.
    /// Users without a profile row are left alone.
    pub async fn refresh_follow_counts(conn: &mut DbConnection, user_id: i64) -> AppResult<()> {
        sqlx::query(
            "UPDATE user_profiles SET \
             followers_count = (SELECT COUNT(*) FROM follows WHERE following_id = user_profiles.user_id), \
             following_count = (SELECT COUNT(*) FROM follows WHERE follower_id = user_profiles.user_id) \
             WHERE user_id = ?",
        )
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}
