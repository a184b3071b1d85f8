use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Local;

use dispatch_core::{DateRange, ItemRepository, JobRepository, MetricsQuery, TruckRepository};
use dispatch_store::{default_range, summarize};

use crate::error::ApiError;
use crate::state::AppState;

/// Summary over `from..=to`. Missing bounds default to the last seven days.
pub async fn metrics_summary(
    State(state): State<AppState>,
    Query(query): Query<MetricsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let fallback = default_range(Local::now().date_naive());
    let range = DateRange {
        from: query.from.unwrap_or(fallback.from),
        to: query.to.unwrap_or(fallback.to),
    };
    if range.from > range.to {
        return Err(ApiError::BadRequest(
            "'from' must not be after 'to'".to_string(),
        ));
    }

    let jobs = state.store.jobs.all().await?;
    let trucks = state.store.trucks.list().await?;
    let items = state.store.items.list().await?;
    Ok(Json(summarize(&jobs, &trucks, &items, range)))
}
