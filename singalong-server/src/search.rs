use axum::{
    extract::{Query, State},
    routing::get,
    Json,
};
use validator::Validate;

use crate::{
    context::ServerContext,
    errors::{ServerError, ServerResult},
    schemas::SearchParams,
    serialized::{SearchResult, ToSerialized},
    Router,
};

#[utoipa::path(
    get,
    path = "/v1/search",
    tag = "search",
    params(SearchParams),
    responses(
        (
            status = 200,
            description = "Videos matching the query. If the lookup is unavailable, results are empty and a manual search link is included.",
            body = SearchResult
        ),
        (status = 400, description = "The query is missing or too long")
    )
)]
async fn search(
    State(context): State<ServerContext>,
    Query(params): Query<SearchParams>,
) -> ServerResult<Json<SearchResult>> {
    params.validate()?;

    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or(ServerError::MissingField("query"))?;

    let outcome = context.collab.search(query).await;

    Ok(Json(outcome.to_serialized()))
}

pub fn router() -> Router {
    Router::new().route("/", get(search))
}
