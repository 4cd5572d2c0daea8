// HTTP surface - GraphQL endpoint, playground and health check

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    middleware,
    response::{Html, IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::debug;

use crate::{
    app_state::AppState,
    error::AppResult,
    infrastructure::{database, middleware::viewer_context_middleware, Vc},
};

// HTTP Handlers

pub async fn graphql_handler(
    State(state): State<AppState>,
    vc: Vc,
    req: GraphQLRequest,
) -> GraphQLResponse {
    debug!("GraphQL request {} (authenticated: {})", vc.request_id, vc.is_authenticated());
    let request = req.into_inner().data(vc.arc());
    state.schema.execute(request).await.into()
}

pub async fn graphiql_handler() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

pub async fn health_handler(State(state): State<AppState>) -> AppResult<Json<Value>> {
    database::health_check(&state.pool).await?;
    Ok(Json(json!({ "status": "ok" })))
}

// Create application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/graphql", get(graphiql_handler).post(graphql_handler))
        .route("/health", get(health_handler))
        .layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            viewer_context_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
