//! dispatch: command-line dashboard for planning, ops and inventory.
//!
//! Planner state (selected day, saved locations, inventory selection, last
//! optimize result) lives in a local JSON file and is written back after
//! every command that changes it.

use std::process::ExitCode;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use dispatch_client::{ClientConfig, ConsoleNotifier, Dispatcher};
use dispatch_core::{
    parse_date, AssignJobRequest, CategoryDraft, InventoryTree, ItemDraft,
    JobAction, JobDraft, JobStatus, NewSavedLocation, NodeKey, PlannerState, SelectionState,
    TruckDraft, TruckStatus, UpdateCategoryRequest, UpdateItemRequest, UpdateJobRequest,
    UpdateTruckRequest,
};
use dispatch_store::LocalStateFile;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dispatch")]
#[command(author, version, about = "Dispatch board for daily pickups and dropoffs")]
#[command(propagate_version = true)]
struct Cli {
    /// Backend base URL (overrides DISPATCH_API_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Planner state file (overrides DISPATCH_STATE_PATH)
    #[arg(long, global = true)]
    state: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or move the selected day
    Date {
        #[command(subcommand)]
        action: Option<DateAction>,
    },
    /// Plan and manage jobs
    Jobs {
        #[command(subcommand)]
        action: JobsAction,
    },
    /// Ask the backend to assign open jobs to trucks
    Optimize,
    /// Show the computed route for each truck
    Routes,
    /// Three-stop operations view
    Ops {
        #[command(subcommand)]
        action: OpsAction,
    },
    /// Manage the truck fleet
    Trucks {
        #[command(subcommand)]
        action: TrucksAction,
    },
    /// Manage inventory items
    Items {
        #[command(subcommand)]
        action: ItemsAction,
    },
    /// Manage item categories
    Categories {
        #[command(subcommand)]
        action: CategoriesAction,
    },
    /// Browse the inventory tree and pick items for the next job
    Tree {
        #[command(subcommand)]
        action: TreeAction,
    },
    /// Saved pickup/dropoff locations
    Locations {
        #[command(subcommand)]
        action: LocationsAction,
    },
    /// Summary metrics for a date range
    Metrics {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
    /// Check that the backend is reachable
    Health,
}

#[derive(Subcommand)]
enum DateAction {
    Next,
    Prev,
    Today,
    Set { date: String },
}

#[derive(Subcommand)]
enum JobsAction {
    /// Jobs for the selected day
    List {
        /// List every day instead
        #[arg(long)]
        all: bool,
    },
    Show {
        id: i64,
    },
    /// Create a job on the selected day using the selected inventory items
    Create(CreateJobArgs),
    Update {
        id: i64,
        #[arg(long)]
        priority: Option<i32>,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        #[arg(long)]
        notes: Option<String>,
    },
    Delete {
        id: i64,
    },
    Defer {
        id: i64,
        /// New priority (1 = High, 3 = Low)
        #[arg(long, default_value_t = 3)]
        priority: i32,
    },
    Complete {
        id: i64,
    },
    Assign {
        id: i64,
        truck: i64,
        #[arg(long)]
        driver: Option<i64>,
    },
}

#[derive(Args)]
struct CreateJobArgs {
    /// Location name
    #[arg(long, default_value = "")]
    name: String,
    #[arg(long, default_value = "")]
    address: String,
    /// Use a saved location by id instead of --name/--address
    #[arg(long)]
    saved: Option<String>,
    #[arg(long, value_enum, default_value_t = ActionArg::Pickup)]
    action: ActionArg,
    /// Item ids; defaults to the inventory tree selection
    #[arg(long, value_delimiter = ',')]
    items: Vec<i64>,
    #[arg(long, default_value = "1")]
    priority: String,
    /// Earliest time (HH:MM or RFC 3339)
    #[arg(long, default_value = "")]
    earliest: String,
    #[arg(long, default_value = "")]
    latest: String,
    #[arg(long, default_value = "")]
    service_minutes: String,
    #[arg(long, default_value = "")]
    notes: String,
    #[arg(long)]
    large_truck_only: bool,
    #[arg(long)]
    curfew: bool,
}

#[derive(Subcommand)]
enum OpsAction {
    /// Every truck with its stop groups for the selected day
    Board,
    /// Complete the truck's current group
    Mark { truck: i64 },
    /// Send the truck's current group to the driver
    Send { truck: i64 },
}

#[derive(Subcommand)]
enum TrucksAction {
    List,
    Create {
        name: String,
        capacity: String,
        #[arg(long, default_value = "")]
        max_weight: String,
        #[arg(long, default_value = "")]
        length: String,
        #[arg(long, default_value = "")]
        width: String,
        #[arg(long, default_value = "")]
        height: String,
        #[arg(long)]
        large: bool,
        #[arg(long, default_value = "")]
        driver: String,
    },
    Update {
        id: i64,
        #[arg(long, value_enum)]
        status: Option<TruckStatusArg>,
        #[arg(long)]
        driver: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
enum ItemsAction {
    List,
    Create {
        name: String,
        #[arg(long, default_value = "")]
        sku: String,
        #[arg(long, default_value = "")]
        weight: String,
        #[arg(long, default_value = "")]
        length: String,
        #[arg(long, default_value = "")]
        width: String,
        #[arg(long, default_value = "")]
        height: String,
        #[arg(long)]
        large_truck: bool,
        #[arg(long)]
        category: Option<i64>,
    },
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<i64>,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
enum CategoriesAction {
    /// Category hierarchy
    List,
    Create {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        parent: Option<i64>,
    },
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        parent: Option<i64>,
    },
    /// Delete a category and its sub-categories
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
enum TreeAction {
    Show {
        /// Only items matching this text, with their categories
        #[arg(long)]
        filter: Option<String>,
    },
    Expand { category: i64 },
    /// Toggle one item
    Item { id: i64 },
    /// Select or deselect everything under a category
    Category { id: i64 },
    Clear,
}

#[derive(Subcommand)]
enum LocationsAction {
    List {
        #[arg(long)]
        search: Option<String>,
    },
    Add {
        name: String,
        address: String,
        #[arg(long)]
        star: bool,
    },
    Star {
        id: String,
    },
    Remove {
        id: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ActionArg {
    Pickup,
    Dropoff,
}

impl From<ActionArg> for JobAction {
    fn from(a: ActionArg) -> Self {
        match a {
            ActionArg::Pickup => JobAction::Pickup,
            ActionArg::Dropoff => JobAction::Dropoff,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Pending,
    Assigned,
    InProgress,
    Completed,
    Deferred,
}

impl From<StatusArg> for JobStatus {
    fn from(s: StatusArg) -> Self {
        match s {
            StatusArg::Pending => JobStatus::Pending,
            StatusArg::Assigned => JobStatus::Assigned,
            StatusArg::InProgress => JobStatus::InProgress,
            StatusArg::Completed => JobStatus::Completed,
            StatusArg::Deferred => JobStatus::Deferred,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum TruckStatusArg {
    Available,
    InTransit,
    Maintenance,
    Unavailable,
}

impl From<TruckStatusArg> for TruckStatus {
    fn from(s: TruckStatusArg) -> Self {
        match s {
            TruckStatusArg::Available => TruckStatus::Available,
            TruckStatusArg::InTransit => TruckStatus::InTransit,
            TruckStatusArg::Maintenance => TruckStatus::Maintenance,
            TruckStatusArg::Unavailable => TruckStatus::Unavailable,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.base_url {
        config.base_url = url;
    }
    if let Some(path) = cli.state {
        config.state_path = path;
    }

    let state_file = LocalStateFile::new(&config.state_path);
    let mut state = state_file.load().await?;
    let before = state.clone();

    let dispatcher = Dispatcher::from_config(&config, Arc::new(ConsoleNotifier))?;

    let outcome = execute(&dispatcher, &mut state, cli.command).await;
    persist(&state_file, &state, &before, outcome).await
}

/// Write the planner state back when it changed, even if the command
/// failed after touching it. The command's own error wins.
async fn persist(
    state_file: &LocalStateFile,
    state: &PlannerState,
    before: &PlannerState,
    outcome: anyhow::Result<()>,
) -> anyhow::Result<()> {
    if state != before {
        if let Err(e) = state_file.save(state).await {
            if outcome.is_ok() {
                return Err(e.into());
            }
            warn!(error = %e, "Failed to save planner state");
        }
    }
    outcome
}

async fn execute(
    dispatcher: &Dispatcher,
    state: &mut PlannerState,
    command: Commands,
) -> anyhow::Result<()> {
    match command {
        Commands::Date { action } => cmd_date(state, action)?,
        Commands::Jobs { action } => cmd_jobs(dispatcher, state, action).await?,
        Commands::Optimize => {
            let result = dispatcher.optimize(state).await?;
            for a in &result.assignments {
                println!(
                    "#{:<4} {:<30} -> {} ({}) score {}",
                    a.job_id, a.job_title, a.assigned_truck, a.driver, a.score
                );
            }
        }
        Commands::Routes => {
            let plan = dispatcher.routes().await?;
            for route in &plan.routes {
                println!(
                    "{} ({:.1} mi, {} stops)",
                    route.truck_name,
                    route.distance_miles,
                    route.stops.len()
                );
                for stop in &route.stops {
                    println!(
                        "  {}. [{}] {} - {}",
                        stop.sequence, stop.action_type, stop.title, stop.address
                    );
                }
                println!("  {}", route.maps_url);
            }
        }
        Commands::Ops { action } => cmd_ops(dispatcher, state, action).await?,
        Commands::Trucks { action } => cmd_trucks(dispatcher, action).await?,
        Commands::Items { action } => cmd_items(dispatcher, action).await?,
        Commands::Categories { action } => cmd_categories(dispatcher, action).await?,
        Commands::Tree { action } => cmd_tree(dispatcher, state, action).await?,
        Commands::Locations { action } => cmd_locations(state, action)?,
        Commands::Metrics { from, to } => {
            let from = from.as_deref().map(parse_date).transpose()?;
            let to = to.as_deref().map(parse_date).transpose()?;
            let m = dispatcher.metrics(from, to).await?;
            println!("Range:           {} .. {}", m.date_range.from, m.date_range.to);
            println!("Jobs completed:  {}", m.jobs_completed);
            println!("Jobs deferred:   {}", m.jobs_deferred);
            println!("On time:         {:.1}%", m.on_time_percentage);
            println!("Avg service:     {:.0} min", m.avg_service_time_minutes);
            println!("Avg drive:       {:.0} min", m.avg_drive_time_minutes);
            for u in &m.utilization_by_truck {
                println!("  {:<20} {:>5.1}%", u.truck_name, u.utilization);
            }
            if dispatcher.flags().heatmap {
                println!("Heatmap points:  {}", m.heatmap_data.len());
            }
        }
        Commands::Health => {
            if dispatcher.client().health_check().await? {
                println!("Backend at {} is healthy", dispatcher.client().base_url());
            } else {
                anyhow::bail!("backend at {} is not healthy", dispatcher.client().base_url());
            }
        }
    }
    Ok(())
}

fn cmd_date(state: &mut PlannerState, action: Option<DateAction>) -> anyhow::Result<()> {
    match action {
        None => {}
        Some(DateAction::Next) => state.date.go_to_next_day(),
        Some(DateAction::Prev) => state.date.go_to_prev_day(),
        Some(DateAction::Today) => state.date.go_to_today(),
        Some(DateAction::Set { date }) => state.date.set_str(&date)?,
    }
    println!("{}", state.date);
    Ok(())
}

async fn cmd_jobs(
    dispatcher: &Dispatcher,
    state: &mut PlannerState,
    action: JobsAction,
) -> anyhow::Result<()> {
    match action {
        JobsAction::List { all } => {
            let date: Option<NaiveDate> = if all { None } else { Some(state.date.date()) };
            let page = dispatcher.jobs(date).await?;
            println!("{} job(s)", page.total);
            for job in &page.jobs {
                println!(
                    "#{:<4} {} {:<8} {:<28} {:<7} {:<11} truck {}",
                    job.id,
                    job.date,
                    job.action_type,
                    job.title,
                    job.priority_label(),
                    job.status,
                    job.assigned_truck
                        .as_ref()
                        .map(|t| t.truck_name.as_str())
                        .unwrap_or("-"),
                );
            }
        }
        JobsAction::Show { id } => {
            let job = dispatcher.client().get_job(id).await?;
            println!("{}", serde_json::to_string_pretty(&job)?);
        }
        JobsAction::Create(args) => {
            let location = match args.saved.as_deref() {
                Some(id) => Some(
                    state
                        .use_location(id)
                        .ok_or_else(|| anyhow::anyhow!("no saved location {}", id))?,
                ),
                None => None,
            };
            let items = if args.items.is_empty() {
                state.selected_items()
            } else {
                args.items
            };
            let draft = JobDraft {
                location_name: location
                    .as_ref()
                    .map(|l| l.name.clone())
                    .unwrap_or(args.name),
                address: location
                    .as_ref()
                    .map(|l| l.address.clone())
                    .unwrap_or(args.address),
                action: args.action.into(),
                items,
                priority: args.priority,
                earliest: args.earliest,
                latest: args.latest,
                service_minutes: args.service_minutes,
                notes: args.notes,
                large_truck_only: args.large_truck_only,
                curfew_flag: args.curfew,
                location,
            };
            let job = dispatcher.create_job(state, &draft).await?;
            state.selection.clear_selection();
            println!("Created job #{} for {}", job.id, job.date);
        }
        JobsAction::Update {
            id,
            priority,
            status,
            notes,
        } => {
            let req = UpdateJobRequest {
                priority,
                status: status.map(Into::into),
                notes,
                ..Default::default()
            };
            dispatcher.update_job(id, &req).await?;
        }
        JobsAction::Delete { id } => dispatcher.delete_job(id).await?,
        JobsAction::Defer { id, priority } => {
            dispatcher.defer_job(id, priority).await?;
        }
        JobsAction::Complete { id } => {
            dispatcher.complete_job(id).await?;
        }
        JobsAction::Assign { id, truck, driver } => {
            let req = AssignJobRequest {
                truck_id: truck,
                driver_id: driver,
            };
            dispatcher.assign_job(id, &req).await?;
        }
    }
    Ok(())
}

async fn cmd_ops(
    dispatcher: &Dispatcher,
    state: &PlannerState,
    action: OpsAction,
) -> anyhow::Result<()> {
    match action {
        OpsAction::Board => {
            let board = dispatcher.ops_board(state.date.date()).await?;
            for entry in &board {
                println!(
                    "{} [{}] driver {}",
                    entry.truck.truck_name,
                    entry.truck.current_status,
                    entry.truck.driver.as_deref().unwrap_or("-")
                );
                if !entry.has_stops() {
                    println!("  No stops assigned");
                    continue;
                }
                for group in &entry.groups {
                    let marker = if group.is_current {
                        "current"
                    } else if group.is_completed {
                        "done"
                    } else {
                        "upcoming"
                    };
                    println!("  Group {} ({})", group.group_number, marker);
                    for stop in &group.stops {
                        let check = if stop.is_completed() { "x" } else { " " };
                        println!(
                            "    [{}] {}. {} - {}",
                            check,
                            stop.sequence_key(),
                            stop.title,
                            stop.location.address
                        );
                    }
                }
                if entry.all_completed() {
                    println!("  All stops completed");
                }
            }
        }
        OpsAction::Mark { truck } => {
            dispatcher
                .mark_three_complete(truck, Some(state.date.date()))
                .await?;
        }
        OpsAction::Send { truck } => {
            dispatcher
                .send_next_three(truck, Some(state.date.date()))
                .await?;
        }
    }
    Ok(())
}

async fn cmd_trucks(dispatcher: &Dispatcher, action: TrucksAction) -> anyhow::Result<()> {
    match action {
        TrucksAction::List => {
            for t in dispatcher.trucks().await? {
                println!(
                    "#{:<3} {:<20} {:<5} {:>7.0} cu ft  {:<11} {}",
                    t.id,
                    t.truck_name,
                    t.truck_type,
                    t.capacity_cu_ft,
                    t.current_status,
                    t.driver.as_deref().unwrap_or("-")
                );
            }
        }
        TrucksAction::Create {
            name,
            capacity,
            max_weight,
            length,
            width,
            height,
            large,
            driver,
        } => {
            let draft = TruckDraft {
                name,
                capacity,
                max_weight,
                length,
                width,
                height,
                is_large: large,
                driver,
            };
            dispatcher.create_truck(&draft).await?;
        }
        TrucksAction::Update {
            id,
            status,
            driver,
            active,
        } => {
            let req = UpdateTruckRequest {
                current_status: status.map(Into::into),
                driver,
                is_active: active,
                ..Default::default()
            };
            dispatcher.update_truck(id, &req).await?;
        }
        TrucksAction::Delete { id } => dispatcher.delete_truck(id).await?,
    }
    Ok(())
}

async fn cmd_items(dispatcher: &Dispatcher, action: ItemsAction) -> anyhow::Result<()> {
    match action {
        ItemsAction::List => {
            for item in dispatcher.items().await? {
                println!(
                    "#{:<3} {:<28} {:<10} {}",
                    item.id,
                    item.name,
                    item.sku.as_deref().unwrap_or("-"),
                    if item.requires_large_truck { "large truck" } else { "" }
                );
            }
        }
        ItemsAction::Create {
            name,
            sku,
            weight,
            length,
            width,
            height,
            large_truck,
            category,
        } => {
            let draft = ItemDraft {
                name,
                sku,
                weight,
                length,
                width,
                height,
                notes: String::new(),
                requires_large_truck: large_truck,
                category_id: category,
            };
            dispatcher.create_item(&draft).await?;
        }
        ItemsAction::Update { id, name, category } => {
            let req = UpdateItemRequest {
                name,
                category_id: category,
                ..Default::default()
            };
            dispatcher.update_item(id, &req).await?;
        }
        ItemsAction::Delete { id } => dispatcher.delete_item(id).await?,
    }
    Ok(())
}

async fn cmd_categories(dispatcher: &Dispatcher, action: CategoriesAction) -> anyhow::Result<()> {
    match action {
        CategoriesAction::List => {
            let categories = dispatcher.categories().await?;
            let tree = InventoryTree::build(&categories, &[]);
            for (id, name, depth) in tree.flatten_categories() {
                println!("{}#{} {}", "  ".repeat(depth), id, name);
            }
        }
        CategoriesAction::Create {
            name,
            description,
            parent,
        } => {
            let draft = CategoryDraft {
                name,
                description,
                parent_id: parent,
            };
            dispatcher.create_category(&draft).await?;
        }
        CategoriesAction::Update {
            id,
            name,
            description,
            parent,
        } => {
            let req = UpdateCategoryRequest {
                name,
                description,
                parent_id: parent,
            };
            dispatcher.update_category(id, &req).await?;
        }
        CategoriesAction::Delete { id } => dispatcher.delete_category(id).await?,
    }
    Ok(())
}

async fn cmd_tree(
    dispatcher: &Dispatcher,
    state: &mut PlannerState,
    action: TreeAction,
) -> anyhow::Result<()> {
    let tree = dispatcher.inventory_tree().await?;
    state.selection.retain_known(&tree);

    let filter = match action {
        TreeAction::Show { filter } => filter,
        TreeAction::Expand { category } => {
            state.selection.toggle_expand(&tree, category);
            None
        }
        TreeAction::Item { id } => {
            if !tree.contains(NodeKey::Item(id)) {
                anyhow::bail!("no item {} in the inventory tree", id);
            }
            state.selection.toggle_item(&tree, id);
            None
        }
        TreeAction::Category { id } => {
            if !tree.contains(NodeKey::Category(id)) {
                anyhow::bail!("no category {} in the inventory tree", id);
            }
            state.selection.toggle_category(&tree, id);
            None
        }
        TreeAction::Clear => {
            state.selection.clear_selection();
            None
        }
    };

    let rows = match filter.as_deref() {
        Some(q) if !q.trim().is_empty() => state.selection.filtered_rows(&tree, q),
        _ => state.selection.visible_rows(&tree),
    };
    for row in rows {
        let check = match row.state {
            SelectionState::Checked => "[x]",
            SelectionState::Partial => "[-]",
            SelectionState::Unchecked => "[ ]",
        };
        let fold = match (row.has_children, row.expanded) {
            (true, true) => "v ",
            (true, false) => "> ",
            (false, _) => "  ",
        };
        let id = match row.key {
            NodeKey::Category(id) | NodeKey::Item(id) => id,
        };
        println!("{}{}{} {} (#{})", "  ".repeat(row.depth), fold, check, row.name, id);
    }
    println!("{} item(s) selected", state.selection.selected_count());
    Ok(())
}

fn cmd_locations(state: &mut PlannerState, action: LocationsAction) -> anyhow::Result<()> {
    match action {
        LocationsAction::List { search } => {
            let list = match search.as_deref() {
                Some(q) => state.locations.search(q),
                None => state.locations.sorted(),
            };
            for loc in list {
                println!(
                    "{} {:<24} {}  ({})",
                    if loc.is_starred { "*" } else { " " },
                    loc.name,
                    loc.address,
                    loc.id
                );
            }
        }
        LocationsAction::Add {
            name,
            address,
            star,
        } => {
            let added = state.locations.add(NewSavedLocation {
                name: name.clone(),
                address,
                is_starred: star,
                ..Default::default()
            });
            match added {
                Some(id) => println!("Saved {} ({})", name, id),
                None => println!("A location named {} already exists", name),
            }
        }
        LocationsAction::Star { id } => match state.locations.toggle_star(&id) {
            Some(true) => println!("Starred"),
            Some(false) => println!("Unstarred"),
            None => anyhow::bail!("no saved location {}", id),
        },
        LocationsAction::Remove { id } => {
            if state.locations.remove(&id).is_none() {
                anyhow::bail!("no saved location {}", id);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remembered(name: &str) -> PlannerState {
        let mut state = PlannerState::default();
        state.locations.add(NewSavedLocation {
            name: name.to_string(),
            address: "9 Dock Rd".to_string(),
            ..Default::default()
        });
        state
    }

    #[tokio::test]
    async fn test_failed_command_still_saves_changed_state() {
        let dir = tempfile::tempdir().unwrap();
        let file = LocalStateFile::new(dir.path().join("state.json"));
        let state = remembered("Warehouse");

        let outcome = persist(
            &file,
            &state,
            &PlannerState::default(),
            Err(anyhow::anyhow!("backend unavailable")),
        )
        .await;

        let err = outcome.unwrap_err();
        assert_eq!(err.to_string(), "backend unavailable");
        let saved = file.load().await.unwrap();
        assert_eq!(saved.locations.len(), 1);
    }

    #[tokio::test]
    async fn test_unchanged_state_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let file = LocalStateFile::new(&path);
        let state = PlannerState::default();

        persist(&file, &state, &state.clone(), Ok(())).await.unwrap();
        assert!(!path.exists());
    }
}
