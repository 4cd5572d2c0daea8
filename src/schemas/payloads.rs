// Mutation payloads. Domain failures land in `errors` with `success: false`.

use async_graphql::SimpleObject;

use crate::entities::{Comment, Post, User, UserProfile};
use crate::error::{AppError, AppResult};
use crate::infrastructure::security::Claims;
use crate::services::{AuthTokens, LikeToggle, RepostToggle};

fn error_list(err: AppError) -> Vec<String> {
    err.log();
    vec![err.message()]
}

/// Collapse a service result into a payload
pub(crate) fn into_payload<T, P>(result: AppResult<T>) -> P
where
    P: From<T> + From<AppError>,
{
    match result {
        Ok(value) => P::from(value),
        Err(err) => P::from(err),
    }
}

macro_rules! payload_errors {
    ($($payload:ty),+ $(,)?) => {
        $(
            impl From<AppError> for $payload {
                fn from(err: AppError) -> Self {
                    Self {
                        success: false,
                        errors: error_list(err),
                        ..Default::default()
                    }
                }
            }
        )+
    };
}

#[derive(SimpleObject, Default)]
pub struct AuthPayload {
    pub success: bool,
    pub errors: Vec<String>,
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    /// Unix timestamp at which the refresh token expires
    pub refresh_expires_in: Option<i64>,
    pub user: Option<User>,
}

impl From<AuthTokens> for AuthPayload {
    fn from(tokens: AuthTokens) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            token: Some(tokens.token),
            refresh_token: Some(tokens.refresh_token),
            refresh_expires_in: Some(tokens.refresh_expires_in),
            user: Some(tokens.user),
        }
    }
}

/// Decoded access token claims
#[derive(SimpleObject, Default)]
pub struct TokenClaims {
    pub user_id: String,
    pub username: String,
    pub exp: i64,
    pub orig_iat: i64,
}

#[derive(SimpleObject, Default)]
pub struct VerifyTokenPayload {
    pub success: bool,
    pub errors: Vec<String>,
    pub payload: Option<TokenClaims>,
}

impl From<Claims> for VerifyTokenPayload {
    fn from(claims: Claims) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            payload: Some(TokenClaims {
                user_id: claims.sub,
                username: claims.username,
                exp: claims.exp,
                orig_iat: claims.orig_iat,
            }),
        }
    }
}

#[derive(SimpleObject, Default)]
pub struct RevokeTokenPayload {
    pub success: bool,
    pub errors: Vec<String>,
    /// Unix timestamp of the revocation
    pub revoked: Option<i64>,
}

impl From<i64> for RevokeTokenPayload {
    fn from(revoked: i64) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            revoked: Some(revoked),
        }
    }
}

#[derive(SimpleObject, Default)]
pub struct MessagePayload {
    pub success: bool,
    pub errors: Vec<String>,
    pub message: Option<String>,
}

impl From<String> for MessagePayload {
    fn from(message: String) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            message: Some(message),
        }
    }
}

#[derive(SimpleObject, Default)]
pub struct PostPayload {
    pub success: bool,
    pub errors: Vec<String>,
    pub post: Option<Post>,
}

impl From<Post> for PostPayload {
    fn from(post: Post) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            post: Some(post),
        }
    }
}

#[derive(SimpleObject, Default)]
pub struct CommentPayload {
    pub success: bool,
    pub errors: Vec<String>,
    pub comment: Option<Comment>,
}

impl From<Comment> for CommentPayload {
    fn from(comment: Comment) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            comment: Some(comment),
        }
    }
}

#[derive(SimpleObject, Default)]
pub struct ToggleLikePayload {
    pub success: bool,
    pub errors: Vec<String>,
    pub post: Option<Post>,
    pub liked: Option<bool>,
}

impl From<LikeToggle> for ToggleLikePayload {
    fn from(toggle: LikeToggle) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            post: Some(toggle.post),
            liked: Some(toggle.liked),
        }
    }
}

#[derive(SimpleObject, Default)]
pub struct RepostPayload {
    pub success: bool,
    pub errors: Vec<String>,
    /// The reposted post with refreshed counters
    pub post: Option<Post>,
    pub reposted: Option<bool>,
    /// The caller's new repost row, absent when the repost was undone
    pub repost: Option<Post>,
}

impl From<RepostToggle> for RepostPayload {
    fn from(toggle: RepostToggle) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            post: Some(toggle.post),
            reposted: Some(toggle.reposted),
            repost: toggle.repost,
        }
    }
}

#[derive(SimpleObject, Default)]
pub struct ProfilePayload {
    pub success: bool,
    pub errors: Vec<String>,
    pub profile: Option<UserProfile>,
}

impl From<UserProfile> for ProfilePayload {
    fn from(profile: UserProfile) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            profile: Some(profile),
        }
    }
}

#[derive(SimpleObject, Default)]
pub struct FollowPayload {
    pub success: bool,
    pub errors: Vec<String>,
    pub is_following: Option<bool>,
}

impl From<bool> for FollowPayload {
    fn from(is_following: bool) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            is_following: Some(is_following),
        }
    }
}

payload_errors!(
    AuthPayload,
    VerifyTokenPayload,
    RevokeTokenPayload,
    MessagePayload,
    PostPayload,
    CommentPayload,
    ToggleLikePayload,
    RepostPayload,
    ProfilePayload,
    FollowPayload,
);
