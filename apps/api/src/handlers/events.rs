use axum::Json;
use axum::extract::{Extension, Query, State};
use genoshare_core::RequestContext;

use crate::dto::{EventListParams, EventResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_events_handler(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Query(params): Query<EventListParams>,
) -> ApiResult<Json<Vec<EventResponse>>> {
    let events = state
        .event_service
        .list_events(&context, params.into_query()?)
        .await?
        .into_iter()
        .map(EventResponse::from)
        .collect();

    Ok(Json(events))
}
