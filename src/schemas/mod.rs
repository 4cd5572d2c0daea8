//! GraphQL schema for the feed API
//!
//! - `objects`: field resolvers that join entities together
//! - `payloads`: mutation result types carrying `success`/`errors`
//! - `scalars`: custom scalars such as `Date`
//! - `query` / `mutation`: root operations, split by area and merged
//! - `schema`: assembly and limits

pub mod mutation;
pub mod objects;
pub mod payloads;
pub mod query;
pub mod scalars;
pub mod schema;

pub use schema::{build_schema, FeedSchema};

use async_graphql::{Context, ErrorExtensions};
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::infrastructure::viewer::PERMISSION_DENIED;
use crate::infrastructure::{AuthenticatedUser, ViewerContext};

/// Convert service results into GraphQL field errors with a `code` extension
pub(crate) trait GqlResultExt<T> {
    fn gql(self) -> async_graphql::Result<T>;
}

impl<T> GqlResultExt<T> for AppResult<T> {
    fn gql(self) -> async_graphql::Result<T> {
        self.map_err(|e| e.extend())
    }
}

/// Viewer attached to this request, anonymous when none was provided
pub(crate) fn viewer(ctx: &Context<'_>) -> Arc<ViewerContext> {
    ctx.data_opt::<Arc<ViewerContext>>()
        .cloned()
        .unwrap_or_else(|| Arc::new(ViewerContext::anonymous(String::new())))
}

/// Auth gate: fails the whole operation for anonymous callers
pub(crate) fn require_viewer(ctx: &Context<'_>) -> async_graphql::Result<AuthenticatedUser> {
    match ctx.data_opt::<Arc<ViewerContext>>() {
        Some(vc) => vc.require_user().cloned().gql(),
        None => Err(AppError::Unauthorized(PERMISSION_DENIED.to_string()).extend()),
    }
}

pub(crate) fn parse_id(id: &async_graphql::ID) -> AppResult<i64> {
    id.parse::<i64>()
        .map_err(|_| AppError::Validation(format!("Invalid id: {}", id.as_str())))
}
