use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::info;

use dispatch_core::{
    CreateTruckRequest, Envelope, JobRepository, JobStatus, ServerEvent, TruckRepository,
    UpdateTruckRequest,
};

use super::deleted;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn list_trucks(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let trucks = state.store.trucks.list().await?;
    Ok(Json(Envelope::ok(trucks)))
}

pub async fn create_truck(
    State(state): State<AppState>,
    Json(body): Json<CreateTruckRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.truck_name.trim().is_empty() || body.capacity_cu_ft <= 0.0 {
        return Err(ApiError::BadRequest(
            "truck name and a positive capacity are required".to_string(),
        ));
    }
    let truck = state.store.trucks.insert(body).await?;
    state.events.emit(ServerEvent::TruckChanged {
        truck_id: truck.id,
        deleted: false,
    });
    Ok((StatusCode::CREATED, Json(Envelope::ok(truck))))
}

pub async fn update_truck(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateTruckRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let truck = state.store.trucks.update(id, body).await?;
    state.events.emit(ServerEvent::TruckChanged {
        truck_id: truck.id,
        deleted: false,
    });
    Ok(Json(Envelope::ok(truck)))
}

/// Delete a truck. Its unfinished jobs go back to pending.
pub async fn delete_truck(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.trucks.delete(id).await?;

    let mut released = 0usize;
    for mut job in state.store.jobs.all().await? {
        if job.assigned_truck_id != Some(id) || job.is_completed() {
            continue;
        }
        job.assigned_truck_id = None;
        job.assigned_driver_id = None;
        job.assigned_truck = None;
        job.sequence = None;
        if job.status != JobStatus::Deferred {
            job.status = JobStatus::Pending;
        }
        let job = state.store.jobs.save(job).await?;
        state.events.emit(ServerEvent::JobUpdated {
            job_id: job.id,
            status: job.status.to_string(),
        });
        released += 1;
    }

    info!(truck_id = id, released, "Truck deleted");
    state.events.emit(ServerEvent::TruckChanged {
        truck_id: id,
        deleted: true,
    });
    Ok(deleted())
}
