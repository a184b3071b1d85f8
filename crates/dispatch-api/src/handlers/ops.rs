//! Ops board actions: complete the current stop group, hand it to a driver.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use tracing::{info, warn};

use dispatch_core::defaults::MOCK_WEBHOOK_MESSAGE;
use dispatch_core::{
    JobAction, JobRepository, JobStatus, MarkCompleteRequest, MarkCompleteResponse,
    SendNextRequest, SendNextResponse, ServerEvent, TruckRepository, UpdateJobRequest,
};
use dispatch_store::{current_group, current_group_open_ids};

use crate::error::ApiError;
use crate::state::AppState;

/// Body POSTed to the driver webhook.
#[derive(Debug, Serialize)]
pub struct StopsPayload {
    pub truck_id: i64,
    pub truck_name: String,
    pub stops: Vec<WebhookStop>,
}

#[derive(Debug, Serialize)]
pub struct WebhookStop {
    pub job_id: i64,
    pub sequence: Option<u32>,
    pub title: String,
    pub address: String,
    pub action_type: JobAction,
}

/// Complete the open stops of the truck's current group.
pub async fn mark_three_complete(
    State(state): State<AppState>,
    Json(body): Json<MarkCompleteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.trucks.fetch(body.truck_id).await?;
    let jobs = state.store.jobs.all().await?;
    let ids = current_group_open_ids(&jobs, body.truck_id, body.date);

    for id in &ids {
        let update = UpdateJobRequest {
            status: Some(JobStatus::Completed),
            ..Default::default()
        };
        let job = state.store.jobs.update(*id, update).await?;
        state.events.emit(ServerEvent::JobUpdated {
            job_id: job.id,
            status: job.status.to_string(),
        });
    }

    info!(truck_id = body.truck_id, completed = ids.len(), "Stop group completed");
    state.events.emit(ServerEvent::StopsCompleted {
        truck_id: body.truck_id,
        completed: ids.len(),
    });
    Ok(Json(MarkCompleteResponse {
        completed: ids.len(),
    }))
}

/// Describe the truck's current group and, when delivery is enabled, POST it
/// to the requested webhook.
pub async fn send_next_three(
    State(state): State<AppState>,
    Json(body): Json<SendNextRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let truck = state.store.trucks.fetch(body.truck_id).await?;
    let jobs = state.store.jobs.all().await?;
    let stops: Vec<WebhookStop> = current_group(&jobs, truck.id, body.date)
        .map(|group| {
            group
                .stops
                .into_iter()
                .filter(|j| !j.is_completed())
                .map(|j| WebhookStop {
                    job_id: j.id,
                    sequence: j.sequence,
                    title: j.title,
                    address: j.location.address,
                    action_type: j.action_type,
                })
                .collect()
        })
        .unwrap_or_default();

    let stop_count = stops.len();
    let webhook = body.webhook.filter(|w| !w.trim().is_empty());
    let (delivered, message) = match webhook {
        Some(url) if state.config.webhook_delivery && stop_count > 0 => {
            let payload = StopsPayload {
                truck_id: truck.id,
                truck_name: truck.truck_name.clone(),
                stops,
            };
            deliver(&state.http, &url, &payload).await?;
            (true, format!("Sent {} stops to {}", stop_count, truck.truck_name))
        }
        _ if stop_count == 0 => (false, "No open stops to send".to_string()),
        _ => (false, MOCK_WEBHOOK_MESSAGE.to_string()),
    };

    info!(truck_id = truck.id, stop_count, delivered, "Next stops sent");
    state.events.emit(ServerEvent::NextStopsSent {
        truck_id: truck.id,
        stop_count,
        delivered,
    });
    Ok(Json(SendNextResponse {
        success: true,
        message,
    }))
}

async fn deliver(
    client: &reqwest::Client,
    url: &str,
    payload: &StopsPayload,
) -> Result<(), ApiError> {
    let result = client
        .post(url)
        .header("X-Dispatch-Event", "ops.next_stops")
        .json(payload)
        .send()
        .await;

    match result {
        Ok(response) if response.status().is_success() => Ok(()),
        Ok(response) => {
            let status = response.status();
            warn!(url, status = status.as_u16(), "Webhook rejected stops");
            Err(ApiError::BadGateway(format!(
                "Webhook delivery failed: HTTP {}",
                status.as_u16()
            )))
        }
        Err(e) => {
            warn!(url, error = %e, "Webhook delivery failed");
            Err(ApiError::BadGateway(format!("Webhook delivery failed: {}", e)))
        }
    }
}
