//! Typed HTTP client for the dispatch backend.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use dispatch_core::defaults::{MAX_PAGE_LIMIT, PAGE};
use dispatch_core::{
    AssignJobRequest, Category, CategoryWithItems, CreateCategoryRequest, CreateItemRequest,
    CreateJobRequest, CreateTruckRequest, DeferJobRequest, Envelope, Error, ErrorBody, Item, Job,
    JobOptimize, JobPage, ListJobsQuery, MarkCompleteRequest, MarkCompleteResponse, Metrics,
    MetricsQuery, Result, RoutePlan, SendNextRequest, SendNextResponse, Truck,
    UpdateCategoryRequest, UpdateItemRequest, UpdateJobRequest, UpdateTruckRequest,
};

use crate::config::ClientConfig;

/// One method per backend endpoint.
///
/// Resource endpoints answer `{success, data}` and are unwrapped here;
/// optimize, routes, ops and metrics answers are returned as-is.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(base_url = %config.base_url, "Initializing dispatch API client");

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Client against `base_url` with default settings.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Self::new(&ClientConfig {
            base_url: base_url.into(),
            ..Default::default()
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, url)
    }

    /// Send and check status; non-2xx becomes [`Error::Api`].
    async fn execute(&self, req: RequestBuilder) -> Result<Response> {
        let response = req.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(parsed) => parsed.error,
            Err(_) if !body.trim().is_empty() => body,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string(),
        };
        warn!(status = status.as_u16(), error = %message, "Backend returned error");
        Err(Error::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let response = self.execute(req).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn send_data<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let envelope: Envelope<T> = self.send(req).await?;
        Ok(envelope.data)
    }

    async fn send_empty(&self, req: RequestBuilder) -> Result<()> {
        self.execute(req).await?;
        Ok(())
    }

    fn with_json<B: Serialize>(&self, method: Method, path: &str, body: &B) -> RequestBuilder {
        self.request(method, path).json(body)
    }

    // =========================================================================
    // JOBS
    // =========================================================================

    pub async fn list_jobs(&self, query: &ListJobsQuery) -> Result<JobPage> {
        debug!(date = ?query.date, "Listing jobs");
        self.send_data(self.request(Method::GET, "/api/jobs").query(query))
            .await
    }

    /// Every job for `date`, following pages until the listing is exhausted.
    /// The merged page reports page 1 with all jobs in it.
    pub async fn list_all_jobs(&self, date: Option<NaiveDate>) -> Result<JobPage> {
        let mut query = ListJobsQuery {
            date,
            page: Some(PAGE),
            limit: Some(MAX_PAGE_LIMIT),
        };
        let mut jobs = Vec::new();
        loop {
            let page = self.list_jobs(&query).await?;
            let fetched = page.jobs.len();
            jobs.extend(page.jobs);
            if fetched == 0 || jobs.len() >= page.total {
                debug!(total = page.total, pages = page.page, "Fetched every job page");
                return Ok(JobPage {
                    total: page.total,
                    page: PAGE,
                    limit: jobs.len(),
                    jobs,
                });
            }
            query.page = Some(page.page + 1);
        }
    }

    pub async fn get_job(&self, id: i64) -> Result<Job> {
        self.send_data(self.request(Method::GET, &format!("/api/jobs/{}", id)))
            .await
    }

    pub async fn create_job(&self, req: &CreateJobRequest) -> Result<Job> {
        self.send_data(self.with_json(Method::POST, "/api/jobs", req))
            .await
    }

    pub async fn update_job(&self, id: i64, req: &UpdateJobRequest) -> Result<Job> {
        self.send_data(self.with_json(Method::PATCH, &format!("/api/jobs/{}", id), req))
            .await
    }

    pub async fn delete_job(&self, id: i64) -> Result<()> {
        self.send_empty(self.request(Method::DELETE, &format!("/api/jobs/{}", id)))
            .await
    }

    pub async fn defer_job(&self, id: i64, new_priority: i32) -> Result<Job> {
        let body = DeferJobRequest { new_priority };
        self.send_data(self.with_json(Method::POST, &format!("/api/jobs/{}/defer", id), &body))
            .await
    }

    pub async fn complete_job(&self, id: i64) -> Result<Job> {
        self.send_data(self.request(Method::POST, &format!("/api/jobs/{}/complete", id)))
            .await
    }

    pub async fn assign_job(&self, id: i64, req: &AssignJobRequest) -> Result<Job> {
        self.send_data(self.with_json(Method::POST, &format!("/api/jobs/{}/assign", id), req))
            .await
    }

    /// Opaque backend optimization over the open jobs.
    pub async fn optimize_jobs(&self) -> Result<JobOptimize> {
        self.send(self.request(Method::POST, "/api/jobs/optimize"))
            .await
    }

    pub async fn plan_routes(&self) -> Result<RoutePlan> {
        self.send(self.request(Method::POST, "/api/jobs/routes"))
            .await
    }

    // =========================================================================
    // TRUCKS
    // =========================================================================

    pub async fn list_trucks(&self) -> Result<Vec<Truck>> {
        self.send_data(self.request(Method::GET, "/api/trucks"))
            .await
    }

    pub async fn create_truck(&self, req: &CreateTruckRequest) -> Result<Truck> {
        self.send_data(self.with_json(Method::POST, "/api/trucks", req))
            .await
    }

    pub async fn update_truck(&self, id: i64, req: &UpdateTruckRequest) -> Result<Truck> {
        self.send_data(self.with_json(Method::PATCH, &format!("/api/trucks/{}", id), req))
            .await
    }

    pub async fn delete_truck(&self, id: i64) -> Result<()> {
        self.send_empty(self.request(Method::DELETE, &format!("/api/trucks/{}", id)))
            .await
    }

    // =========================================================================
    // INVENTORY
    // =========================================================================

    pub async fn list_items(&self) -> Result<Vec<Item>> {
        self.send_data(self.request(Method::GET, "/api/items"))
            .await
    }

    pub async fn create_item(&self, req: &CreateItemRequest) -> Result<Item> {
        self.send_data(self.with_json(Method::POST, "/api/items", req))
            .await
    }

    pub async fn update_item(&self, id: i64, req: &UpdateItemRequest) -> Result<Item> {
        self.send_data(self.with_json(Method::PATCH, &format!("/api/items/{}", id), req))
            .await
    }

    pub async fn delete_item(&self, id: i64) -> Result<()> {
        self.send_empty(self.request(Method::DELETE, &format!("/api/items/{}", id)))
            .await
    }

    pub async fn categories_with_items(&self) -> Result<Vec<CategoryWithItems>> {
        self.send_data(self.request(Method::GET, "/api/items/categoriesWithItems"))
            .await
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        self.send_data(self.request(Method::GET, "/api/categories"))
            .await
    }

    pub async fn create_category(&self, req: &CreateCategoryRequest) -> Result<Category> {
        self.send_data(self.with_json(Method::POST, "/api/categories", req))
            .await
    }

    pub async fn update_category(&self, id: i64, req: &UpdateCategoryRequest) -> Result<Category> {
        self.send_data(self.with_json(Method::PATCH, &format!("/api/categories/{}", id), req))
            .await
    }

    pub async fn delete_category(&self, id: i64) -> Result<()> {
        self.send_empty(self.request(Method::DELETE, &format!("/api/categories/{}", id)))
            .await
    }

    // =========================================================================
    // OPS & METRICS
    // =========================================================================

    pub async fn mark_three_complete(
        &self,
        truck_id: i64,
        date: Option<NaiveDate>,
    ) -> Result<MarkCompleteResponse> {
        let body = MarkCompleteRequest { truck_id, date };
        self.send(self.with_json(Method::POST, "/ops/mark-3-complete", &body))
            .await
    }

    pub async fn send_next_three(&self, req: &SendNextRequest) -> Result<SendNextResponse> {
        self.send(self.with_json(Method::POST, "/ops/send-next-3", req))
            .await
    }

    pub async fn metrics(&self, query: &MetricsQuery) -> Result<Metrics> {
        self.send(self.request(Method::GET, "/metrics/summary").query(query))
            .await
    }

    /// Whether the backend answers its health probe.
    pub async fn health_check(&self) -> Result<bool> {
        let response = self
            .request(Method::GET, "/health")
            .timeout(Duration::from_secs(5))
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => Ok(true),
            Ok(resp) => {
                warn!(status = %resp.status(), "Backend health check failed");
                Ok(false)
            }
            Err(e) => {
                warn!(error = %e, "Backend health check failed");
                Ok(false)
            }
        }
    }
}
