mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::ServiceExt;

use common::{register, test_app, TestApp};
use social_feed::routes::create_router;

fn router(app: &TestApp) -> Router {
    create_router(app.state.clone())
}

async fn graphql(router: Router, token: Option<&str>, query: &str, variables: Value) -> Value {
    let mut request = Request::builder()
        .method("POST")
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = json!({ "query": query, "variables": variables }).to_string();

    let response = router
        .oneshot(request.body(Body::from(body)).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[sqlx::test]
async fn test_health_endpoint(pool: SqlitePool) {
    let app = test_app(pool);
    let response = router(&app)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
}

#[sqlx::test]
async fn test_register_then_me(pool: SqlitePool) {
    let app = test_app(pool);

    let result = graphql(
        router(&app),
        None,
        "mutation($u: String!, $e: String!, $p: String!) {
            register(username: $u, email: $e, password: $p) {
                success errors token refreshToken user { id username email }
            }
        }",
        json!({ "u": "gqluser", "e": "gql@example.com", "p": "long password" }),
    )
    .await;
    let payload = &result["data"]["register"];
    assert_eq!(payload["success"], true);
    assert_eq!(payload["user"]["username"], "gqluser");
    let token = payload["token"].as_str().unwrap().to_string();

    let me = graphql(router(&app), Some(&token), "{ me { username email } }", json!({})).await;
    assert_eq!(me["data"]["me"]["username"], "gqluser");

    let duplicate = graphql(
        router(&app),
        None,
        "mutation { register(username: \"gqluser\", email: \"x@example.com\", password: \"long password\") { success errors } }",
        json!({}),
    )
    .await;
    assert_eq!(duplicate["data"]["register"]["success"], false);
    assert_eq!(
        duplicate["data"]["register"]["errors"][0],
        "A user with that username already exists."
    );
}

#[sqlx::test]
async fn test_gated_mutations_fail_without_token(pool: SqlitePool) {
    let app = test_app(pool);

    let result = graphql(
        router(&app),
        None,
        "mutation { createPost(content: \"hi\") { success } }",
        json!({}),
    )
    .await;
    assert!(result["data"].is_null() || result["data"]["createPost"].is_null());
    assert_eq!(
        result["errors"][0]["message"],
        "You do not have permission to perform this action"
    );
    assert_eq!(result["errors"][0]["extensions"]["code"], "UNAUTHORIZED");

    let me = graphql(router(&app), Some("garbage"), "{ me { id } }", json!({})).await;
    assert_eq!(me["errors"][0]["message"], "Invalid token");
}

#[sqlx::test]
async fn test_feed_round_trip(pool: SqlitePool) {
    let app = test_app(pool);
    let author = register(&app, "poster").await;
    let fan = register(&app, "liker").await;

    let created = graphql(
        router(&app),
        Some(&author.token),
        "mutation { createPost(content: \"hello graph\") { success post { id content author { username } } } }",
        json!({}),
    )
    .await;
    let post = &created["data"]["createPost"]["post"];
    assert_eq!(post["author"]["username"], "poster");
    let post_id = post["id"].as_i64().unwrap();

    let liked = graphql(
        router(&app),
        Some(&fan.token),
        "mutation($id: Int!) { toggleLike(postId: $id) { success liked post { likesCount } } }",
        json!({ "id": post_id }),
    )
    .await;
    assert_eq!(liked["data"]["toggleLike"]["liked"], true);
    assert_eq!(liked["data"]["toggleLike"]["post"]["likesCount"], 1);

    let commented = graphql(
        router(&app),
        Some(&fan.token),
        "mutation($id: Int!) { createComment(postId: $id, content: \"nice\") { success comment { content author { username } } } }",
        json!({ "id": post_id }),
    )
    .await;
    assert_eq!(commented["data"]["createComment"]["comment"]["author"]["username"], "liker");

    let fetched = graphql(
        router(&app),
        None,
        "query($id: ID!) { post(id: $id) { content commentsCount likesCount comments { content } } }",
        json!({ "id": post_id.to_string() }),
    )
    .await;
    let post = &fetched["data"]["post"];
    assert_eq!(post["commentsCount"], 1);
    assert_eq!(post["comments"][0]["content"], "nice");

    let missing = graphql(router(&app), None, "{ post(id: \"999\") { id } }", json!({})).await;
    assert!(missing["data"]["post"].is_null());

    let listed = graphql(
        router(&app),
        None,
        "{ posts(search: \"graph\", first: 10, skip: 0) { content } }",
        json!({}),
    )
    .await;
    assert_eq!(listed["data"]["posts"].as_array().unwrap().len(), 1);

    let interactions = graphql(
        router(&app),
        None,
        "query($id: Int) { interactions(postId: $id) { type user { username } } }",
        json!({ "id": post_id }),
    )
    .await;
    assert_eq!(interactions["data"]["interactions"][0]["type"], "LIKE");
    assert_eq!(interactions["data"]["interactions"][0]["user"]["username"], "liker");
}

#[sqlx::test]
async fn test_payload_errors_for_missing_post(pool: SqlitePool) {
    let app = test_app(pool);
    let user = register(&app, "misser").await;

    let result = graphql(
        router(&app),
        Some(&user.token),
        "mutation { sharePost(postId: 12345) { success errors post { id } } }",
        json!({}),
    )
    .await;
    let payload = &result["data"]["sharePost"];
    assert_eq!(payload["success"], false);
    assert_eq!(payload["errors"][0], "Post not found");
    assert!(payload["post"].is_null());
}

#[sqlx::test]
async fn test_profile_and_follow_over_graphql(pool: SqlitePool) {
    let app = test_app(pool);
    let a = register(&app, "graphfan").await;
    let b = register(&app, "graphstar").await;

    let followed = graphql(
        router(&app),
        Some(&a.token),
        "mutation($id: Int!) { followUser(userId: $id) { success errors isFollowing } }",
        json!({ "id": b.user.id }),
    )
    .await;
    assert_eq!(followed["data"]["followUser"]["isFollowing"], true);

    let updated = graphql(
        router(&app),
        Some(&b.token),
        "mutation { updateProfile(bio: \"star\", dateOfBirth: \"1991-02-03\") { success profile { bio dateOfBirth followersCount } } }",
        json!({}),
    )
    .await;
    let profile = &updated["data"]["updateProfile"]["profile"];
    assert_eq!(profile["bio"], "star");
    assert_eq!(profile["dateOfBirth"], "1991-02-03");
    assert_eq!(profile["followersCount"], 1);

    let viewed = graphql(
        router(&app),
        Some(&a.token),
        "{ user(username: \"graphstar\") { username isFollowing profile { bio } } }",
        json!({}),
    )
    .await;
    assert_eq!(viewed["data"]["user"]["isFollowing"], true);
    assert_eq!(viewed["data"]["user"]["profile"]["bio"], "star");

    let anonymous = graphql(
        router(&app),
        None,
        "{ user(username: \"graphstar\") { isFollowing } }",
        json!({}),
    )
    .await;
    assert_eq!(anonymous["data"]["user"]["isFollowing"], false);

    let self_follow = graphql(
        router(&app),
        Some(&a.token),
        "mutation($id: Int!) { followUser(userId: $id) { success errors } }",
        json!({ "id": a.user.id }),
    )
    .await;
    assert_eq!(self_follow["data"]["followUser"]["success"], false);
    assert_eq!(self_follow["data"]["followUser"]["errors"][0], "You cannot follow yourself");
}

#[sqlx::test]
async fn test_repost_over_graphql(pool: SqlitePool) {
    let app = test_app(pool);
    let author = register(&app, "og").await;
    let fan = register(&app, "booster").await;
    let post = app.state.feed.create_post(author.user.id, "boost me", None).await.unwrap();

    let query = "mutation($id: Int!) { repost(postId: $id) { success reposted post { repostsCount } repost { isRepost quotedPost { id } } } }";
    let first = graphql(router(&app), Some(&fan.token), query, json!({ "id": post.id })).await;
    let payload = &first["data"]["repost"];
    assert_eq!(payload["reposted"], true);
    assert_eq!(payload["post"]["repostsCount"], 1);
    assert_eq!(payload["repost"]["isRepost"], true);
    assert_eq!(payload["repost"]["quotedPost"]["id"], post.id);

    let second = graphql(router(&app), Some(&fan.token), query, json!({ "id": post.id })).await;
    assert_eq!(second["data"]["repost"]["reposted"], false);
    assert_eq!(second["data"]["repost"]["post"]["repostsCount"], 0);
    assert!(second["data"]["repost"]["repost"].is_null());
}

const UPDATE_PROFILE: &str = r#"
  mutation UpdateProfile(
    $bio: String
    $date_of_birth: Date
    $location: String
    $profile_picture: String
  ) {
    updateProfile(
      bio: $bio
      dateOfBirth: $date_of_birth
      location: $location
      profilePicture: $profile_picture
    ) {
      success
      errors
      profile {
        bio
        dateOfBirth
        location
        profilePicture
        followersCount
        followingCount
      }
    }
  }
"#;

#[sqlx::test]
async fn test_update_profile_with_date_variable(pool: SqlitePool) {
    let app = test_app(pool);
    let user = register(&app, "datefan").await;

    let result = graphql(
        router(&app),
        Some(&user.token),
        UPDATE_PROFILE,
        json!({ "bio": "hi", "date_of_birth": "1988-12-31", "location": "Accra" }),
    )
    .await;
    assert!(result["errors"].is_null(), "{}", result);
    let payload = &result["data"]["updateProfile"];
    assert_eq!(payload["success"], true);
    assert_eq!(payload["profile"]["dateOfBirth"], "1988-12-31");
    assert_eq!(payload["profile"]["location"], "Accra");
    assert!(payload["profile"]["profilePicture"].is_null());

    let rejected = graphql(
        router(&app),
        Some(&user.token),
        UPDATE_PROFILE,
        json!({ "date_of_birth": "31/12/1988" }),
    )
    .await;
    assert!(!rejected["errors"].is_null());
}
