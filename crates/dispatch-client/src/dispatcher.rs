//! Client, cache and notifier combined into the dashboard's actions.
//!
//! Reads go through the [`QueryCache`]. Mutations validate their input,
//! call the backend, invalidate the affected query scopes and emit a
//! notice either way. Nothing is retried and nothing is applied
//! optimistically; the next read refetches.

use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};

use dispatch_core::{
    build_ops_board, AssignJobRequest, Category, CategoryDraft, CategoryWithItems, Error,
    InventoryTree, Item, ItemDraft, Job, JobDraft, JobOptimize, JobPage, MarkCompleteResponse,
    Metrics, MetricsQuery, PlannerState, Result, RoutePlan, SendNextRequest, SendNextResponse, Truck, TruckDraft, TruckStops, UpdateCategoryRequest,
    UpdateItemRequest, UpdateJobRequest, UpdateTruckRequest,
};

use crate::api::ApiClient;
use crate::cache::{Cached, QueryCache, QueryKey, QueryScope};
use crate::config::{ClientConfig, FeatureFlags};
use crate::notifier::Notifier;

/// Message shown when the "send next 3" action is switched off.
pub const SEND_DISABLED_MESSAGE: &str = "Sending stops is disabled";

const JOB_SCOPES: &[QueryScope] = &[QueryScope::Jobs];
const TRUCK_SCOPES: &[QueryScope] = &[QueryScope::Trucks];
/// Deleting a truck sends its open jobs back to pending.
const TRUCK_DELETE_SCOPES: &[QueryScope] = &[QueryScope::Trucks, QueryScope::Jobs];
const ITEM_SCOPES: &[QueryScope] = &[QueryScope::Items, QueryScope::CategoriesWithItems];
const CATEGORY_SCOPES: &[QueryScope] = &[
    QueryScope::Categories,
    QueryScope::CategoriesWithItems,
    QueryScope::Items,
];

pub struct Dispatcher {
    client: ApiClient,
    cache: QueryCache,
    notifier: Arc<dyn Notifier>,
    flags: FeatureFlags,
    webhook_url: String,
}

impl Dispatcher {
    pub fn new(client: ApiClient, notifier: Arc<dyn Notifier>, config: &ClientConfig) -> Self {
        Self {
            client,
            cache: QueryCache::new(),
            notifier,
            flags: config.feature_flags,
            webhook_url: config.webhook_next3_url.clone(),
        }
    }

    pub fn from_config(config: &ClientConfig, notifier: Arc<dyn Notifier>) -> Result<Self> {
        Ok(Self::new(ApiClient::new(config)?, notifier, config))
    }

    /// Replace the default cache, e.g. with one that has a staleness window.
    pub fn with_cache(mut self, cache: QueryCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn flags(&self) -> FeatureFlags {
        self.flags
    }

    async fn cached<T, F, Fut>(
        &self,
        key: QueryKey,
        unwrap: fn(Cached) -> Option<T>,
        wrap: fn(T) -> Cached,
        fetch: F,
    ) -> Result<T>
    where
        T: Clone,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(hit) = self.cache.get(&key).and_then(unwrap) {
            debug!(?key, "Cache hit");
            return Ok(hit);
        }
        let ticket = self.cache.begin(key);
        let value = fetch().await?;
        self.cache.complete(key, ticket, wrap(value.clone()));
        Ok(value)
    }

    async fn mutate<T, Fut>(
        &self,
        action: &str,
        scopes: &[QueryScope],
        success: impl FnOnce(&T) -> String,
        call: Fut,
    ) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        match call.await {
            Ok(value) => {
                for scope in scopes {
                    self.cache.invalidate(*scope);
                }
                self.notifier.success(&success(&value));
                Ok(value)
            }
            Err(e) => {
                warn!(action, error = %e, "Mutation failed");
                self.notifier
                    .error(&format!("Failed to {}: {}", action, e.user_message()));
                Err(e)
            }
        }
    }

    fn reject(&self, err: Error) -> Error {
        self.notifier.error(&err.user_message());
        err
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// Every job for `date` (all days when `None`), across all pages.
    pub async fn jobs(&self, date: Option<NaiveDate>) -> Result<JobPage> {
        self.cached(
            QueryKey::Jobs(date),
            |c| match c {
                Cached::Jobs(v) => Some(v),
                _ => None,
            },
            Cached::Jobs,
            || self.client.list_all_jobs(date),
        )
        .await
    }

    pub async fn trucks(&self) -> Result<Vec<Truck>> {
        self.cached(
            QueryKey::Trucks,
            |c| match c {
                Cached::Trucks(v) => Some(v),
                _ => None,
            },
            Cached::Trucks,
            || self.client.list_trucks(),
        )
        .await
    }

    pub async fn items(&self) -> Result<Vec<Item>> {
        self.cached(
            QueryKey::Items,
            |c| match c {
                Cached::Items(v) => Some(v),
                _ => None,
            },
            Cached::Items,
            || self.client.list_items(),
        )
        .await
    }

    pub async fn categories(&self) -> Result<Vec<Category>> {
        self.cached(
            QueryKey::Categories,
            |c| match c {
                Cached::Categories(v) => Some(v),
                _ => None,
            },
            Cached::Categories,
            || self.client.list_categories(),
        )
        .await
    }

    pub async fn categories_with_items(&self) -> Result<Vec<CategoryWithItems>> {
        self.cached(
            QueryKey::CategoriesWithItems,
            |c| match c {
                Cached::CategoriesWithItems(v) => Some(v),
                _ => None,
            },
            Cached::CategoriesWithItems,
            || self.client.categories_with_items(),
        )
        .await
    }

    pub async fn metrics(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Metrics> {
        let query = MetricsQuery { from, to };
        self.cached(
            QueryKey::Metrics(from, to),
            |c| match c {
                Cached::Metrics(v) => Some(v),
                _ => None,
            },
            Cached::Metrics,
            || self.client.metrics(&query),
        )
        .await
    }

    /// Every truck with its 3-stop groups for `date`.
    pub async fn ops_board(&self, date: NaiveDate) -> Result<Vec<TruckStops>> {
        let trucks = self.trucks().await?;
        let page = self.jobs(Some(date)).await?;
        Ok(build_ops_board(&trucks, &page.jobs))
    }

    pub async fn inventory_tree(&self) -> Result<InventoryTree> {
        let categories = self.categories().await?;
        let items = self.items().await?;
        Ok(InventoryTree::build(&categories, &items))
    }

    // =========================================================================
    // JOB MUTATIONS
    // =========================================================================

    /// Validate `draft` against the planner's day, then create the job.
    /// A draft that fails validation never reaches the backend.
    pub async fn create_job(&self, state: &mut PlannerState, draft: &JobDraft) -> Result<Job> {
        let request = state.prepare_job(draft).map_err(|e| self.reject(e))?;
        self.mutate(
            "create job",
            JOB_SCOPES,
            |_| "Job created successfully".to_string(),
            self.client.create_job(&request),
        )
        .await
    }

    pub async fn update_job(&self, id: i64, req: &UpdateJobRequest) -> Result<Job> {
        self.mutate(
            "update job",
            JOB_SCOPES,
            |_| "Job updated".to_string(),
            self.client.update_job(id, req),
        )
        .await
    }

    pub async fn delete_job(&self, id: i64) -> Result<()> {
        self.mutate(
            "delete job",
            JOB_SCOPES,
            |_| "Job deleted".to_string(),
            self.client.delete_job(id),
        )
        .await
    }

    pub async fn defer_job(&self, id: i64, new_priority: i32) -> Result<Job> {
        self.mutate(
            "defer job",
            JOB_SCOPES,
            |_| "Job deferred".to_string(),
            self.client.defer_job(id, new_priority),
        )
        .await
    }

    pub async fn complete_job(&self, id: i64) -> Result<Job> {
        self.mutate(
            "complete job",
            JOB_SCOPES,
            |_| "Job completed".to_string(),
            self.client.complete_job(id),
        )
        .await
    }

    pub async fn assign_job(&self, id: i64, req: &AssignJobRequest) -> Result<Job> {
        self.mutate(
            "assign job",
            JOB_SCOPES,
            |_| "Job assigned".to_string(),
            self.client.assign_job(id, req),
        )
        .await
    }

    /// Run the backend optimizer and keep its answer in planner state.
    pub async fn optimize(&self, state: &mut PlannerState) -> Result<JobOptimize> {
        let result = self
            .mutate(
                "optimize jobs",
                JOB_SCOPES,
                |r: &JobOptimize| format!("Assigned {} of {} jobs", r.assigned, r.total_jobs),
                self.client.optimize_jobs(),
            )
            .await?;
        state.record_optimize(result.clone());
        Ok(result)
    }

    pub async fn routes(&self) -> Result<RoutePlan> {
        self.client.plan_routes().await.map_err(|e| {
            self.notifier
                .error(&format!("Failed to plan routes: {}", e.user_message()));
            e
        })
    }

    // =========================================================================
    // OPS
    // =========================================================================

    pub async fn mark_three_complete(
        &self,
        truck_id: i64,
        date: Option<NaiveDate>,
    ) -> Result<MarkCompleteResponse> {
        self.mutate(
            "mark stops",
            JOB_SCOPES,
            |r: &MarkCompleteResponse| format!("Marked {} stops as complete", r.completed),
            self.client.mark_three_complete(truck_id, date),
        )
        .await
    }

    /// Send the truck's current group to the configured webhook.
    pub async fn send_next_three(
        &self,
        truck_id: i64,
        date: Option<NaiveDate>,
    ) -> Result<SendNextResponse> {
        if !self.flags.whatsapp_stub {
            return Err(self.reject(Error::Validation(SEND_DISABLED_MESSAGE.to_string())));
        }
        let req = SendNextRequest {
            truck_id,
            webhook: Some(self.webhook_url.clone()),
            date,
        };
        self.mutate(
            "send",
            &[],
            |r: &SendNextResponse| r.message.clone(),
            self.client.send_next_three(&req),
        )
        .await
    }

    // =========================================================================
    // FLEET & INVENTORY MUTATIONS
    // =========================================================================

    pub async fn create_truck(&self, draft: &TruckDraft) -> Result<Truck> {
        let request = draft.validate().map_err(|e| self.reject(e))?;
        self.mutate(
            "create truck",
            TRUCK_SCOPES,
            |_| "Truck created".to_string(),
            self.client.create_truck(&request),
        )
        .await
    }

    pub async fn update_truck(&self, id: i64, req: &UpdateTruckRequest) -> Result<Truck> {
        self.mutate(
            "update truck",
            TRUCK_SCOPES,
            |_| "Truck updated".to_string(),
            self.client.update_truck(id, req),
        )
        .await
    }

    pub async fn delete_truck(&self, id: i64) -> Result<()> {
        self.mutate(
            "delete truck",
            TRUCK_DELETE_SCOPES,
            |_| "Truck deleted".to_string(),
            self.client.delete_truck(id),
        )
        .await
    }

    pub async fn create_item(&self, draft: &ItemDraft) -> Result<Item> {
        let request = draft.validate().map_err(|e| self.reject(e))?;
        self.mutate(
            "create item",
            ITEM_SCOPES,
            |_| "Item created".to_string(),
            self.client.create_item(&request),
        )
        .await
    }

    pub async fn update_item(&self, id: i64, req: &UpdateItemRequest) -> Result<Item> {
        self.mutate(
            "update item",
            ITEM_SCOPES,
            |_| "Item updated".to_string(),
            self.client.update_item(id, req),
        )
        .await
    }

    pub async fn delete_item(&self, id: i64) -> Result<()> {
        self.mutate(
            "delete item",
            ITEM_SCOPES,
            |_| "Item deleted".to_string(),
            self.client.delete_item(id),
        )
        .await
    }

    pub async fn create_category(&self, draft: &CategoryDraft) -> Result<Category> {
        let request = draft.validate().map_err(|e| self.reject(e))?;
        self.mutate(
            "create category",
            CATEGORY_SCOPES,
            |_| "Category created".to_string(),
            self.client.create_category(&request),
        )
        .await
    }

    pub async fn update_category(&self, id: i64, req: &UpdateCategoryRequest) -> Result<Category> {
        self.mutate(
            "update category",
            CATEGORY_SCOPES,
            |_| "Category updated".to_string(),
            self.client.update_category(id, req),
        )
        .await
    }

    /// Deletes the category's sub-tree; its items become uncategorized.
    pub async fn delete_category(&self, id: i64) -> Result<()> {
        self.mutate(
            "delete category",
            CATEGORY_SCOPES,
            |_| "Category deleted".to_string(),
            self.client.delete_category(id),
        )
        .await
    }
}
