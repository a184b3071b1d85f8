//! Job endpoints, including the canned optimize and routes answers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use dispatch_core::defaults::{JOB_PRIORITY, JOB_PRIORITY_LOWEST};
use dispatch_core::{
    AssignJobRequest, CreateJobRequest, DeferJobRequest, Envelope, JobRepository, JobStatus,
    ListJobsQuery, ServerEvent, TruckRepository, UpdateJobRequest,
};
use dispatch_store::{build_routes, next_sequence, optimize};

use super::deleted;
use crate::error::ApiError;
use crate::state::AppState;

/// Optional service day for optimize and routes.
#[derive(Debug, Default, Deserialize)]
pub struct DayQuery {
    pub date: Option<NaiveDate>,
}

fn check_priority(priority: i32) -> Result<(), ApiError> {
    if (JOB_PRIORITY..=JOB_PRIORITY_LOWEST).contains(&priority) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "priority must be between {} and {}",
            JOB_PRIORITY, JOB_PRIORITY_LOWEST
        )))
    }
}

fn check_create(req: &CreateJobRequest) -> Result<(), ApiError> {
    if req.location.name.trim().is_empty() || req.location.address.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "location name and address are required".to_string(),
        ));
    }
    if req.items.is_empty() {
        return Err(ApiError::BadRequest(
            "at least one item is required".to_string(),
        ));
    }
    check_priority(req.priority)
}

pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<ListJobsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state.store.jobs.list(&query).await?;
    Ok(Json(Envelope::ok(page)))
}

pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let job = state.store.jobs.fetch(id).await?;
    Ok(Json(Envelope::ok(job)))
}

/// Create a job. A job created onto a truck lands at the end of that
/// truck's route for its day.
pub async fn create_job(
    State(state): State<AppState>,
    Json(body): Json<CreateJobRequest>,
) -> Result<impl IntoResponse, ApiError> {
    check_create(&body)?;
    let truck = match body.assigned_truck_id {
        Some(truck_id) => Some(state.store.trucks.fetch(truck_id).await?),
        None => None,
    };

    let mut job = state.store.jobs.insert(body).await?;
    if let Some(truck) = truck {
        let all = state.store.jobs.all().await?;
        let others: Vec<_> = all.into_iter().filter(|j| j.id != job.id).collect();
        job.sequence = Some(next_sequence(&others, truck.id, job.date));
        job.assigned_truck = Some(truck.snapshot());
        job = state.store.jobs.save(job).await?;
    }

    info!(job_id = job.id, date = %job.date, "Job created");
    state.events.emit(ServerEvent::JobCreated {
        job_id: job.id,
        title: job.title.clone(),
    });
    Ok((StatusCode::CREATED, Json(Envelope::ok(job))))
}

pub async fn update_job(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateJobRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(priority) = body.priority {
        check_priority(priority)?;
    }
    let job = state.store.jobs.update(id, body).await?;
    state.events.emit(ServerEvent::JobUpdated {
        job_id: job.id,
        status: job.status.to_string(),
    });
    Ok(Json(Envelope::ok(job)))
}

pub async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.jobs.delete(id).await?;
    state.events.emit(ServerEvent::JobDeleted { job_id: id });
    Ok(deleted())
}

/// Push a job back with a new priority.
pub async fn defer_job(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<DeferJobRequest>,
) -> Result<impl IntoResponse, ApiError> {
    check_priority(body.new_priority)?;
    let update = UpdateJobRequest {
        priority: Some(body.new_priority),
        status: Some(JobStatus::Deferred),
        ..Default::default()
    };
    let job = state.store.jobs.update(id, update).await?;
    state.events.emit(ServerEvent::JobUpdated {
        job_id: job.id,
        status: job.status.to_string(),
    });
    Ok(Json(Envelope::ok(job)))
}

pub async fn complete_job(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let update = UpdateJobRequest {
        status: Some(JobStatus::Completed),
        ..Default::default()
    };
    let job = state.store.jobs.update(id, update).await?;
    state.events.emit(ServerEvent::JobUpdated {
        job_id: job.id,
        status: job.status.to_string(),
    });
    Ok(Json(Envelope::ok(job)))
}

/// Put a job on a truck, appended to that truck's route for the job's day.
pub async fn assign_job(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<AssignJobRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let truck = state.store.trucks.fetch(body.truck_id).await?;
    let mut job = state.store.jobs.fetch(id).await?;
    job.ensure_assignable()?;

    if job.assigned_truck_id != Some(truck.id) {
        let all = state.store.jobs.all().await?;
        let others: Vec<_> = all.into_iter().filter(|j| j.id != id).collect();
        job.sequence = Some(next_sequence(&others, truck.id, job.date));
    }
    job.assigned_truck_id = Some(truck.id);
    job.assigned_driver_id = body.driver_id;
    job.assigned_truck = Some(truck.snapshot());
    job.status = JobStatus::Assigned;
    let job = state.store.jobs.save(job).await?;

    info!(job_id = id, truck_id = truck.id, sequence = ?job.sequence, "Job assigned");
    state.events.emit(ServerEvent::JobUpdated {
        job_id: job.id,
        status: job.status.to_string(),
    });
    Ok(Json(Envelope::ok(job)))
}

/// Deterministic stand-in for the backend optimizer.
pub async fn optimize_jobs(
    State(state): State<AppState>,
    Query(query): Query<DayQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let jobs = state.store.jobs.all().await?;
    let trucks = state.store.trucks.list().await?;
    let outcome = optimize(&jobs, &trucks, query.date);

    for job in outcome.updated {
        state.store.jobs.save(job).await?;
    }

    let response = outcome.response;
    info!(
        total_jobs = response.total_jobs,
        assigned = response.assigned,
        date = ?query.date,
        "Optimize pass finished"
    );
    state.events.emit(ServerEvent::JobsOptimized {
        total_jobs: response.total_jobs,
        assigned: response.assigned,
    });
    Ok(Json(response))
}

pub async fn plan_routes(
    State(state): State<AppState>,
    Query(query): Query<DayQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let jobs = state.store.jobs.all().await?;
    let trucks = state.store.trucks.list().await?;
    Ok(Json(build_routes(&jobs, &trucks, query.date)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_core::{JobAction, Location};

    fn request() -> CreateJobRequest {
        CreateJobRequest {
            title: "Warehouse".to_string(),
            action_type: JobAction::Pickup,
            location: Location {
                name: "Warehouse".to_string(),
                address: "9 Dock Rd".to_string(),
                ..Default::default()
            },
            items: vec![1],
            priority: 2,
            earliest_time: None,
            latest_time: None,
            service_minutes: None,
            notes: None,
            large_truck_only: false,
            curfew_flag: false,
            assigned_truck_id: None,
            assigned_driver_id: None,
            date: None,
        }
    }

    #[test]
    fn test_check_create_accepts_complete_request() {
        assert!(check_create(&request()).is_ok());
    }

    #[test]
    fn test_check_create_requires_address_and_items() {
        let mut req = request();
        req.location.address = "  ".to_string();
        assert!(matches!(check_create(&req), Err(ApiError::BadRequest(_))));

        let mut req = request();
        req.items.clear();
        assert!(matches!(check_create(&req), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_priority_bounds() {
        assert!(check_priority(1).is_ok());
        assert!(check_priority(3).is_ok());
        assert!(check_priority(0).is_err());
        assert!(check_priority(4).is_err());
    }
}
