mod common;

use chrono::NaiveDate;
use sqlx::SqlitePool;

use common::{register, test_app};
use social_feed::entities::ProfileChanges;
use social_feed::error::AppError;

async fn follow_rows(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM follows")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test]
async fn test_follow_is_idempotent(pool: SqlitePool) {
    let app = test_app(pool.clone());
    let social = &app.state.social;
    let a = register(&app, "follower").await.user;
    let b = register(&app, "followed").await.user;

    social.follow(a.id, b.id).await.unwrap();
    social.follow(a.id, b.id).await.unwrap();

    assert_eq!(follow_rows(&pool).await, 1);
    assert!(social.is_following(a.id, b.id).await.unwrap());
    assert!(!social.is_following(b.id, a.id).await.unwrap());

    let a_profile = social.get_profile(a.id).await.unwrap().unwrap();
    let b_profile = social.get_profile(b.id).await.unwrap().unwrap();
    assert_eq!(a_profile.following_count, 1);
    assert_eq!(a_profile.followers_count, 0);
    assert_eq!(b_profile.followers_count, 1);
    assert_eq!(b_profile.following_count, 0);

    let followers = social.followers(b.id).await.unwrap();
    assert_eq!(followers.len(), 1);
    assert_eq!(followers[0].id, a.id);
    let following = social.following(a.id).await.unwrap();
    assert_eq!(following[0].id, b.id);
}

#[sqlx::test]
async fn test_unfollow_resets_counts(pool: SqlitePool) {
    let app = test_app(pool.clone());
    let social = &app.state.social;
    let a = register(&app, "fickle").await.user;
    let b = register(&app, "target").await.user;

    social.follow(a.id, b.id).await.unwrap();
    social.unfollow(a.id, b.id).await.unwrap();
    // A second unfollow has nothing to delete and must not go negative
    social.unfollow(a.id, b.id).await.unwrap();

    assert_eq!(follow_rows(&pool).await, 0);
    assert_eq!(social.get_profile(a.id).await.unwrap().unwrap().following_count, 0);
    assert_eq!(social.get_profile(b.id).await.unwrap().unwrap().followers_count, 0);
}

#[sqlx::test]
async fn test_follow_rejects_self_and_unknown_users(pool: SqlitePool) {
    let app = test_app(pool);
    let social = &app.state.social;
    let a = register(&app, "narcissus").await.user;

    let err = social.follow(a.id, a.id).await.unwrap_err();
    assert_eq!(err.message(), "You cannot follow yourself");

    let err = social.follow(a.id, 4242).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(err.message(), "User not found");

    assert!(matches!(social.unfollow(a.id, 4242).await, Err(AppError::NotFound(_))));
}

#[sqlx::test]
async fn test_update_profile_applies_only_supplied_fields(pool: SqlitePool) {
    let app = test_app(pool);
    let social = &app.state.social;
    let user = register(&app, "profiled").await.user;
    assert!(social.get_profile(user.id).await.unwrap().is_none());

    let profile = social
        .update_profile(
            user.id,
            &ProfileChanges {
                bio: Some("Hello there".to_string()),
                location: Some("Lagos".to_string()),
                ..ProfileChanges::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(profile.bio.as_deref(), Some("Hello there"));
    assert_eq!(profile.location.as_deref(), Some("Lagos"));

    let dob = NaiveDate::from_ymd_opt(1990, 5, 17).unwrap();
    let profile = social
        .update_profile(
            user.id,
            &ProfileChanges {
                date_of_birth: Some(dob),
                ..ProfileChanges::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(profile.bio.as_deref(), Some("Hello there"));
    assert_eq!(profile.location.as_deref(), Some("Lagos"));
    assert_eq!(profile.date_of_birth, Some(dob));
    assert!(profile.profile_picture.is_none());
}

#[sqlx::test]
async fn test_user_lookup_by_username(pool: SqlitePool) {
    let app = test_app(pool);
    let user = register(&app, "findme").await.user;

    let found = app.state.social.get_user_by_username("findme").await.unwrap();
    assert_eq!(found.map(|u| u.id), Some(user.id));
    assert!(app.state.social.get_user_by_username("nobody").await.unwrap().is_none());
}

#[sqlx::test]
async fn test_concurrent_follows_keep_counts_exact(pool: SqlitePool) {
    let app = test_app(pool);
    let star = register(&app, "celebrity").await.user;

    let mut handles = Vec::new();
    for i in 0..6 {
        let follower = register(&app, &format!("follower{}", i)).await.user;
        let social = app.state.social.clone();
        let star_id = star.id;
        handles.push(tokio::spawn(async move { social.follow(follower.id, star_id).await }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let profile = app.state.social.get_profile(star.id).await.unwrap().unwrap();
    assert_eq!(profile.followers_count, 6);
    assert_eq!(app.state.social.followers(star.id).await.unwrap().len(), 6);
}
