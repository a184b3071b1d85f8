//! OpenAPI document served at `/openapi.json`.

use utoipa::OpenApi;

use dispatch_core::{
    AssignJobRequest, Category, CategoryWithItems, CreateCategoryRequest, CreateItemRequest,
    CreateJobRequest, CreateTruckRequest, DateRange, DeferJobRequest, ErrorBody, HeatPoint, Item,
    Job, JobAction, JobAssignment, JobOptimize, JobPage, JobStatus, Location,
    MarkCompleteRequest, MarkCompleteResponse, Metrics, RoutePlan, RouteStop, SendNextRequest,
    SendNextResponse, Truck, TruckRoute, TruckSnapshot, TruckStatus, TruckType, TruckUtilization,
    UpdateCategoryRequest, UpdateItemRequest, UpdateJobRequest, UpdateTruckRequest,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Dispatch Board Fixture API",
        description = "In-memory stand-in for the dispatch backend: jobs, fleet, inventory, ops and metrics"
    ),
    components(schemas(
        Job, JobAction, JobStatus, Location, TruckSnapshot, JobPage,
        CreateJobRequest, UpdateJobRequest, DeferJobRequest, AssignJobRequest,
        JobOptimize, JobAssignment, RoutePlan, TruckRoute, RouteStop,
        Truck, TruckType, TruckStatus, CreateTruckRequest, UpdateTruckRequest,
        Item, CreateItemRequest, UpdateItemRequest,
        Category, CategoryWithItems, CreateCategoryRequest, UpdateCategoryRequest,
        MarkCompleteRequest, MarkCompleteResponse, SendNextRequest, SendNextResponse,
        Metrics, DateRange, TruckUtilization, HeatPoint, ErrorBody
    )),
    tags(
        (name = "Jobs", description = "Job planning, optimize and routes"),
        (name = "Fleet", description = "Trucks"),
        (name = "Inventory", description = "Items and categories"),
        (name = "Ops", description = "Three-stop check-ins"),
        (name = "Metrics", description = "Dashboard summary"),
        (name = "System", description = "Health and events")
    )
)]
pub struct ApiDoc;
