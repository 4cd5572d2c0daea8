use crate::error::{AppError, AppResult};

pub const PERMISSION_DENIED: &str = "You do not have permission to perform this action";

/// Identity resolved from a valid access token
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub username: String,
}

/// Request-scoped view of who is calling
#[derive(Debug, Clone)]
pub struct ViewerContext {
    pub request_id: String,
    pub user: Option<AuthenticatedUser>,
    /// Why a presented token was not accepted, reported by the auth gate
    pub rejection: Option<String>,
}

impl ViewerContext {
    pub fn anonymous(request_id: String) -> Self {
        Self {
            request_id,
            user: None,
            rejection: None,
        }
    }

    pub fn authenticated_user(user_id: i64, username: String, request_id: String) -> Self {
        Self {
            request_id,
            user: Some(AuthenticatedUser { user_id, username }),
            rejection: None,
        }
    }

    pub fn rejected(request_id: String, reason: String) -> Self {
        Self {
            request_id,
            user: None,
            rejection: Some(reason),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user.as_ref().map(|u| u.user_id)
    }

    /// Auth gate for operations that need a signed-in caller
    pub fn require_user(&self) -> AppResult<&AuthenticatedUser> {
        self.user.as_ref().ok_or_else(|| {
            AppError::Unauthorized(
                self.rejection
                    .clone()
                    .unwrap_or_else(|| PERMISSION_DENIED.to_string()),
            )
        })
    }
}
