//! In-memory job repository.

use async_trait::async_trait;
use chrono::{Local, Utc};
use dispatch_core::defaults::{MAX_PAGE_LIMIT, PAGE, PAGE_LIMIT};
use dispatch_core::{
    CreateJobRequest, Error, Job, JobPage, JobRepository, JobStatus, ListJobsQuery, Result,
    UpdateJobRequest,
};
use tracing::debug;

use crate::table::{shared, Shared};

#[derive(Debug, Clone)]
pub struct MemoryJobRepository {
    table: Shared<Job>,
}

impl MemoryJobRepository {
    pub fn new(jobs: Vec<Job>) -> Self {
        Self {
            table: shared(jobs.into_iter().map(|j| (j.id, j))),
        }
    }
}

impl Default for MemoryJobRepository {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

fn apply_update(job: &mut Job, req: UpdateJobRequest) {
    if let Some(v) = req.title {
        job.title = v;
    }
    if let Some(v) = req.action_type {
        job.action_type = v;
    }
    if let Some(v) = req.location {
        job.location = v;
    }
    if let Some(v) = req.items {
        job.items = v;
    }
    if let Some(v) = req.priority {
        job.priority = v;
    }
    if let Some(v) = req.earliest_time {
        job.earliest_time = Some(v);
    }
    if let Some(v) = req.latest_time {
        job.latest_time = Some(v);
    }
    if let Some(v) = req.service_minutes {
        job.service_minutes = Some(v);
    }
    if let Some(v) = req.notes {
        job.notes = Some(v);
    }
    if let Some(v) = req.large_truck_only {
        job.large_truck_only = v;
    }
    if let Some(v) = req.curfew_flag {
        job.curfew_flag = v;
    }
    if let Some(v) = req.status {
        job.status = v;
    }
    if let Some(v) = req.sequence {
        job.sequence = Some(v);
    }
    if let Some(v) = req.date {
        job.date = v;
    }
}

#[async_trait]
impl JobRepository for MemoryJobRepository {
    async fn list(&self, query: &ListJobsQuery) -> Result<JobPage> {
        let page = query.page.unwrap_or(PAGE).max(1);
        let limit = query.limit.unwrap_or(PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);
        let offset = (page - 1).saturating_mul(limit);

        let table = self.table.read().await;
        let matching: Vec<&Job> = table
            .values()
            .filter(|j| query.date.map_or(true, |d| j.date == d))
            .collect();
        let total = matching.len();
        let jobs = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        debug!(total, page, limit, date = ?query.date, "Listed jobs");
        Ok(JobPage {
            total,
            page,
            limit,
            jobs,
        })
    }

    async fn all(&self) -> Result<Vec<Job>> {
        Ok(self.table.read().await.to_vec())
    }

    async fn fetch(&self, id: i64) -> Result<Job> {
        self.table
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(Error::JobNotFound(id))
    }

    async fn insert(&self, req: CreateJobRequest) -> Result<Job> {
        let now = Utc::now();
        let mut table = self.table.write().await;
        let id = table.allocate_id();
        let status = if req.assigned_truck_id.is_some() {
            JobStatus::Assigned
        } else {
            JobStatus::Pending
        };
        let job = Job {
            id,
            title: req.title,
            action_type: req.action_type,
            location: req.location,
            items: req.items,
            priority: req.priority,
            earliest_time: req.earliest_time,
            latest_time: req.latest_time,
            service_minutes: req.service_minutes,
            notes: req.notes,
            large_truck_only: req.large_truck_only,
            curfew_flag: req.curfew_flag,
            assigned_truck_id: req.assigned_truck_id,
            assigned_driver_id: req.assigned_driver_id,
            assigned_truck: None,
            status,
            sequence: None,
            date: req.date.unwrap_or_else(|| Local::now().date_naive()),
            created_at: now,
            updated_at: now,
        };
        table.put(id, job.clone());
        debug!(job_id = id, date = %job.date, "Inserted job");
        Ok(job)
    }

    async fn update(&self, id: i64, req: UpdateJobRequest) -> Result<Job> {
        let mut table = self.table.write().await;
        let job = table.get_mut(id).ok_or(Error::JobNotFound(id))?;
        apply_update(job, req);
        job.updated_at = Utc::now();
        Ok(job.clone())
    }

    async fn save(&self, mut job: Job) -> Result<Job> {
        let mut table = self.table.write().await;
        if table.get(job.id).is_none() {
            return Err(Error::JobNotFound(job.id));
        }
        job.updated_at = Utc::now();
        table.put(job.id, job.clone());
        Ok(job)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.table
            .write()
            .await
            .remove(id)
            .map(|_| debug!(job_id = id, "Deleted job"))
            .ok_or(Error::JobNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dispatch_core::{JobAction, Location};

    fn request(title: &str, date: Option<NaiveDate>) -> CreateJobRequest {
        CreateJobRequest {
            title: title.to_string(),
            action_type: JobAction::Dropoff,
            location: Location {
                name: title.to_string(),
                address: "1 Main St".to_string(),
                ..Default::default()
            },
            items: vec![1],
            priority: 1,
            earliest_time: None,
            latest_time: None,
            service_minutes: None,
            notes: None,
            large_truck_only: false,
            curfew_flag: false,
            assigned_truck_id: None,
            assigned_driver_id: None,
            date,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, d).unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_ids_and_defaults() {
        let repo = MemoryJobRepository::default();
        let a = repo.insert(request("A", Some(day(4)))).await.unwrap();
        let b = repo.insert(request("B", None)).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(a.status, JobStatus::Pending);
        assert_eq!(b.date, Local::now().date_naive());
    }

    #[tokio::test]
    async fn test_list_filters_by_date_and_pages() {
        let repo = MemoryJobRepository::default();
        for i in 0..5 {
            repo.insert(request(&format!("J{}", i), Some(day(4)))).await.unwrap();
        }
        repo.insert(request("Other", Some(day(5)))).await.unwrap();

        let page = repo
            .list(&ListJobsQuery {
                date: Some(day(4)),
                page: Some(2),
                limit: Some(2),
            })
            .await
            .unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.page, 2);
        let titles: Vec<&str> = page.jobs.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["J2", "J3"]);

        let all = repo.list(&ListJobsQuery::default()).await.unwrap();
        assert_eq!(all.total, 6);
        assert_eq!(all.limit, PAGE_LIMIT);
    }

    #[tokio::test]
    async fn test_list_clamps_extreme_paging() {
        let repo = MemoryJobRepository::default();
        for i in 0..3 {
            repo.insert(request(&format!("J{}", i), Some(day(4)))).await.unwrap();
        }

        let far = repo
            .list(&ListJobsQuery {
                date: None,
                page: Some(usize::MAX),
                limit: Some(usize::MAX),
            })
            .await
            .unwrap();
        assert_eq!(far.total, 3);
        assert_eq!(far.limit, MAX_PAGE_LIMIT);
        assert!(far.jobs.is_empty());

        let first = repo
            .list(&ListJobsQuery {
                date: None,
                page: Some(0),
                limit: Some(usize::MAX),
            })
            .await
            .unwrap();
        assert_eq!(first.page, 1);
        assert_eq!(first.jobs.len(), 3);
    }

    #[tokio::test]
    async fn test_update_applies_only_present_fields() {
        let repo = MemoryJobRepository::default();
        let job = repo.insert(request("A", Some(day(4)))).await.unwrap();
        let updated = repo
            .update(
                job.id,
                UpdateJobRequest {
                    status: Some(JobStatus::InProgress),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, JobStatus::InProgress);
        assert_eq!(updated.title, "A");
        assert!(updated.updated_at >= job.updated_at);
    }

    #[tokio::test]
    async fn test_missing_job_errors() {
        let repo = MemoryJobRepository::default();
        assert!(matches!(
            repo.fetch(9).await.unwrap_err(),
            Error::JobNotFound(9)
        ));
        assert!(repo.delete(9).await.is_err());
        assert!(repo
            .update(9, UpdateJobRequest::default())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_delete_removes_job() {
        let repo = MemoryJobRepository::default();
        let job = repo.insert(request("A", Some(day(4)))).await.unwrap();
        repo.delete(job.id).await.unwrap();
        assert!(repo.all().await.unwrap().is_empty());
    }
}
