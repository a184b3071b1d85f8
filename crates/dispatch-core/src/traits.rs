//! Repository traits for the backend records.
//!
//! The fixture server talks to its store only through these traits so the
//! in-memory repositories can be swapped without touching the handlers.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// JOB REPOSITORY
// =============================================================================

#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Page through jobs, optionally restricted to one service day.
    /// Jobs are ordered by id.
    async fn list(&self, query: &ListJobsQuery) -> Result<JobPage>;

    /// Every job, regardless of day.
    async fn all(&self) -> Result<Vec<Job>>;

    async fn fetch(&self, id: i64) -> Result<Job>;

    /// Insert a new job. A missing `date` means today.
    async fn insert(&self, req: CreateJobRequest) -> Result<Job>;

    /// Apply a partial update.
    async fn update(&self, id: i64, req: UpdateJobRequest) -> Result<Job>;

    /// Overwrite a whole record (used by fixture planning steps).
    async fn save(&self, job: Job) -> Result<Job>;

    async fn delete(&self, id: i64) -> Result<()>;
}

// =============================================================================
// TRUCK REPOSITORY
// =============================================================================

#[async_trait]
pub trait TruckRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Truck>>;

    async fn fetch(&self, id: i64) -> Result<Truck>;

    async fn insert(&self, req: CreateTruckRequest) -> Result<Truck>;

    async fn update(&self, id: i64, req: UpdateTruckRequest) -> Result<Truck>;

    async fn delete(&self, id: i64) -> Result<()>;
}

// =============================================================================
// INVENTORY REPOSITORIES
// =============================================================================

#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Item>>;

    async fn fetch(&self, id: i64) -> Result<Item>;

    async fn insert(&self, req: CreateItemRequest) -> Result<Item>;

    async fn update(&self, id: i64, req: UpdateItemRequest) -> Result<Item>;

    async fn delete(&self, id: i64) -> Result<()>;

    /// Clear `category_id` on every item filed under one of `category_ids`.
    /// Returns the number of items touched.
    async fn uncategorize(&self, category_ids: &[i64]) -> Result<usize>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Category>>;

    async fn fetch(&self, id: i64) -> Result<Category>;

    /// Insert a category. A `parent_id` that does not exist is rejected.
    async fn insert(&self, req: CreateCategoryRequest) -> Result<Category>;

    /// Apply a partial update. Re-parenting under itself or a descendant is
    /// rejected.
    async fn update(&self, id: i64, req: UpdateCategoryRequest) -> Result<Category>;

    /// Delete a category and everything nested beneath it. Returns the ids
    /// removed, the requested id first.
    async fn delete_subtree(&self, id: i64) -> Result<Vec<i64>>;
}
