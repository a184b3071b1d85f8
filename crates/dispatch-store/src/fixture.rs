//! Canned answers for the planning endpoints of the fixture server.
//!
//! None of this is an optimizer. Assignment is a deterministic round-robin
//! so the client can be exercised end to end against predictable data.

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use dispatch_core::defaults::{
    CUBIC_INCHES_PER_FOOT, EARTH_RADIUS_MILES, METRICS_AVG_DRIVE_MINUTES,
    METRICS_AVG_SERVICE_MINUTES, METRICS_ON_TIME_PERCENTAGE,
};
use dispatch_core::{
    group_stops, DateRange, HeatPoint, Item, Job, JobAssignment, JobOptimize, JobStatus, Metrics,
    RoutePlan, RouteStop, StopGroup, Truck, TruckRoute, TruckUtilization,
};
use tracing::debug;

const MAPS_DIR_URL: &str = "https://www.google.com/maps/dir/";

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn in_scope(job: &Job, date: Option<NaiveDate>) -> bool {
    date.map_or(true, |d| job.date == d)
}

fn coords(job: &Job) -> Option<(f64, f64)> {
    let (lat, lng) = (job.location.latitude, job.location.longitude);
    (lat != 0.0 || lng != 0.0).then_some((lat, lng))
}

/// Great-circle distance in miles.
pub fn haversine_miles(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lat1, lng1) = (a.0.to_radians(), a.1.to_radians());
    let (lat2, lng2) = (b.0.to_radians(), b.1.to_radians());
    let dlat = lat2 - lat1;
    let dlng = lng2 - lng1;
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * h.sqrt().asin()
}

// =============================================================================
// OPTIMIZE
// =============================================================================

/// Outcome of a canned optimize pass: the jobs that changed plus the
/// response body.
#[derive(Debug, Clone)]
pub struct OptimizeOutcome {
    pub updated: Vec<Job>,
    pub response: JobOptimize,
}

/// Deal open jobs round-robin onto dispatchable trucks.
///
/// Open jobs are unassigned and neither completed nor deferred. They are
/// taken in (priority, earliest time, id) order; large-truck-only jobs skip
/// small trucks. Each assignment gets the next sequence number on its truck
/// for that service day. Jobs no truck can take stay pending.
pub fn optimize(jobs: &[Job], trucks: &[Truck], date: Option<NaiveDate>) -> OptimizeOutcome {
    let fleet: Vec<&Truck> = trucks.iter().filter(|t| t.is_dispatchable()).collect();

    let mut open: Vec<&Job> = jobs
        .iter()
        .filter(|j| in_scope(j, date))
        .filter(|j| {
            j.assigned_truck_id.is_none()
                && !matches!(j.status, JobStatus::Completed | JobStatus::Deferred)
        })
        .collect();
    open.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            // Jobs without a window go after windowed ones.
            .then_with(|| match (a.earliest_time, b.earliest_time) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            })
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut next_sequence: HashMap<(i64, NaiveDate), u32> = HashMap::new();
    for job in jobs {
        if let Some(truck_id) = job.assigned_truck_id {
            let slot = next_sequence.entry((truck_id, job.date)).or_insert(0);
            *slot = (*slot).max(job.sequence_key());
        }
    }

    let mut updated = Vec::new();
    let mut assignments = Vec::new();
    let mut cursor = 0usize;

    for job in &open {
        let pick = (0..fleet.len())
            .map(|offset| (cursor + offset) % fleet.len())
            .find(|&idx| !job.large_truck_only || fleet[idx].is_large());
        let Some(idx) = pick else {
            debug!(job_id = job.id, "No truck can take job");
            continue;
        };
        cursor = idx + 1;
        let truck = fleet[idx];

        let slot = next_sequence.entry((truck.id, job.date)).or_insert(0);
        *slot += 1;

        let mut assigned = (*job).clone();
        assigned.assigned_truck_id = Some(truck.id);
        assigned.assigned_truck = Some(truck.snapshot());
        assigned.status = JobStatus::Assigned;
        assigned.sequence = Some(*slot);

        assignments.push(JobAssignment {
            job_id: job.id,
            job_title: job.title.clone(),
            assigned_truck: truck.truck_name.clone(),
            driver: truck
                .driver
                .clone()
                .unwrap_or_else(|| "Unassigned".to_string()),
            score: format!("{:.2}", f64::from(4 - job.priority.clamp(1, 3)) / 3.0),
        });
        updated.push(assigned);
    }

    debug!(
        open = open.len(),
        assigned = assignments.len(),
        trucks = fleet.len(),
        "Canned optimize pass"
    );
    OptimizeOutcome {
        updated,
        response: JobOptimize {
            success: true,
            total_jobs: open.len(),
            assigned: assignments.len(),
            assignments,
        },
    }
}

// =============================================================================
// ROUTES
// =============================================================================

fn maps_url(points: &[(f64, f64)]) -> String {
    let path: Vec<String> = points
        .iter()
        .map(|(lat, lng)| format!("{:.6},{:.6}", lat, lng))
        .collect();
    format!("{}{}", MAPS_DIR_URL, path.join("/"))
}

/// One route per truck that has open assigned stops, in truck order.
///
/// Stops follow the route sequence. Distance runs from the truck's last
/// known position through every stop with coordinates.
pub fn build_routes(jobs: &[Job], trucks: &[Truck], date: Option<NaiveDate>) -> RoutePlan {
    let scoped: Vec<Job> = jobs
        .iter()
        .filter(|j| in_scope(j, date) && !j.is_completed())
        .cloned()
        .collect();

    let routes = trucks
        .iter()
        .filter_map(|truck| {
            let stops: Vec<Job> = group_stops(&scoped, truck.id)
                .into_iter()
                .flat_map(|g| g.stops)
                .collect();
            if stops.is_empty() {
                return None;
            }

            let mut points = Vec::new();
            if let (Some(lat), Some(lng)) = (truck.last_known_lat, truck.last_known_lng) {
                points.push((lat, lng));
            }
            points.extend(stops.iter().filter_map(coords));
            let distance: f64 = points
                .windows(2)
                .map(|w| haversine_miles(w[0], w[1]))
                .sum();

            Some(TruckRoute {
                truck_id: truck.id,
                truck_name: truck.truck_name.clone(),
                distance_miles: round1(distance),
                stops: stops
                    .iter()
                    .enumerate()
                    .map(|(i, job)| RouteStop {
                        sequence: job.sequence.unwrap_or(i as u32 + 1),
                        job_id: job.id,
                        title: job.title.clone(),
                        address: job.location.address.clone(),
                        lat: job.location.latitude,
                        lng: job.location.longitude,
                        action_type: job.action_type,
                    })
                    .collect(),
                maps_url: maps_url(&points),
            })
        })
        .collect();

    RoutePlan {
        success: true,
        routes,
    }
}

// =============================================================================
// OPS
// =============================================================================

/// Service day whose stops the ops actions work on: `date` when given,
/// otherwise the earliest day on which the truck still has open stops.
fn ops_day(jobs: &[Job], truck_id: i64, date: Option<NaiveDate>) -> Option<NaiveDate> {
    date.or_else(|| {
        jobs.iter()
            .filter(|j| j.assigned_truck_id == Some(truck_id) && !j.is_completed())
            .map(|j| j.date)
            .min()
    })
}

/// The truck's current stop group on the ops day.
pub fn current_group(jobs: &[Job], truck_id: i64, date: Option<NaiveDate>) -> Option<StopGroup> {
    let day = ops_day(jobs, truck_id, date)?;
    let day_jobs: Vec<Job> = jobs.iter().filter(|j| j.date == day).cloned().collect();
    group_stops(&day_jobs, truck_id)
        .into_iter()
        .find(|g| g.is_current)
}

/// Ids of the not-yet-completed stops in a truck's current group.
pub fn current_group_open_ids(jobs: &[Job], truck_id: i64, date: Option<NaiveDate>) -> Vec<i64> {
    current_group(jobs, truck_id, date)
        .map(|g| {
            g.stops
                .iter()
                .filter(|j| !j.is_completed())
                .map(|j| j.id)
                .collect()
        })
        .unwrap_or_default()
}

/// Next free route position on `truck_id` for `date`.
pub fn next_sequence(jobs: &[Job], truck_id: i64, date: NaiveDate) -> u32 {
    jobs.iter()
        .filter(|j| j.assigned_truck_id == Some(truck_id) && j.date == date)
        .map(Job::sequence_key)
        .max()
        .unwrap_or(0)
        + 1
}

// =============================================================================
// METRICS
// =============================================================================

/// Seven days ending today.
pub fn default_range(today: NaiveDate) -> DateRange {
    DateRange {
        from: today.checked_sub_days(Days::new(6)).unwrap_or(today),
        to: today,
    }
}

/// Summary metrics over `range` (inclusive).
///
/// Utilization is the volume of items on a truck's assigned jobs over its
/// capacity, capped at 100. On-time and average durations are constants.
pub fn summarize(jobs: &[Job], trucks: &[Truck], items: &[Item], range: DateRange) -> Metrics {
    let scoped: Vec<&Job> = jobs
        .iter()
        .filter(|j| j.date >= range.from && j.date <= range.to)
        .collect();

    let volume_cu_ft: HashMap<i64, f64> = items
        .iter()
        .filter_map(|i| i.volume_cu_in().map(|v| (i.id, v / CUBIC_INCHES_PER_FOOT)))
        .collect();

    let utilization_by_truck = trucks
        .iter()
        .map(|truck| {
            let loaded: f64 = scoped
                .iter()
                .filter(|j| j.assigned_truck_id == Some(truck.id))
                .flat_map(|j| j.items.iter())
                .filter_map(|id| volume_cu_ft.get(id))
                .sum();
            let pct = if truck.capacity_cu_ft > 0.0 {
                (loaded / truck.capacity_cu_ft * 100.0).min(100.0)
            } else {
                0.0
            };
            TruckUtilization {
                truck_name: truck.truck_name.clone(),
                utilization: round1(pct),
            }
        })
        .collect();

    let heatmap_data = scoped
        .iter()
        .filter_map(|j| {
            coords(j).map(|(lat, lng)| HeatPoint {
                lat,
                lng,
                weight: f64::from(4 - j.priority.clamp(1, 3)),
            })
        })
        .collect();

    Metrics {
        date_range: range,
        utilization_by_truck,
        jobs_completed: scoped.iter().filter(|j| j.is_completed()).count(),
        jobs_deferred: scoped
            .iter()
            .filter(|j| j.status == JobStatus::Deferred)
            .count(),
        on_time_percentage: METRICS_ON_TIME_PERCENTAGE,
        avg_service_time_minutes: METRICS_AVG_SERVICE_MINUTES,
        avg_drive_time_minutes: METRICS_AVG_DRIVE_MINUTES,
        heatmap_data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::Seed;
    use chrono::{TimeZone, Utc};
    use dispatch_core::{JobAction, Location, TruckStatus, TruckType};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 4).unwrap()
    }

    fn job(id: i64, priority: i32) -> Job {
        let now = Utc::now();
        Job {
            id,
            title: format!("Job {}", id),
            action_type: JobAction::Dropoff,
            location: Location {
                name: format!("Job {}", id),
                address: format!("{} Main St", id),
                latitude: 33.7 + id as f64 / 100.0,
                longitude: -84.4,
                ..Default::default()
            },
            items: vec![],
            priority,
            earliest_time: None,
            latest_time: None,
            service_minutes: None,
            notes: None,
            large_truck_only: false,
            curfew_flag: false,
            assigned_truck_id: None,
            assigned_driver_id: None,
            assigned_truck: None,
            status: JobStatus::Pending,
            sequence: None,
            date: day(),
            created_at: now,
            updated_at: now,
        }
    }

    fn truck(id: i64, truck_type: TruckType) -> Truck {
        let now = Utc::now();
        Truck {
            id,
            truck_name: format!("T{}", id),
            capacity_cu_ft: 100.0,
            max_weight_lbs: None,
            length_ft: 0.0,
            width_ft: 0.0,
            height_ft: 0.0,
            truck_type,
            current_status: TruckStatus::Available,
            last_known_lat: Some(33.7),
            last_known_lng: Some(-84.4),
            restricted_load_types: vec![],
            driver: Some(format!("Driver {}", id)),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_haversine_known_distance() {
        // Atlanta to Marietta is roughly 16 miles.
        let d = haversine_miles((33.7490, -84.3880), (33.9526, -84.5499));
        assert!((d - 16.9).abs() < 1.0, "got {}", d);
        assert_eq!(haversine_miles((1.0, 1.0), (1.0, 1.0)), 0.0);
    }

    #[test]
    fn test_optimize_round_robin_by_priority() {
        let jobs = vec![job(1, 3), job(2, 1), job(3, 2), job(4, 1)];
        let trucks = vec![truck(1, TruckType::Large), truck(2, TruckType::Small)];
        let out = optimize(&jobs, &trucks, Some(day()));

        let order: Vec<(i64, i64)> = out
            .updated
            .iter()
            .map(|j| (j.id, j.assigned_truck_id.unwrap()))
            .collect();
        assert_eq!(order, vec![(2, 1), (4, 2), (3, 1), (1, 2)]);
        assert_eq!(out.response.total_jobs, 4);
        assert_eq!(out.response.assigned, 4);
        assert!(out.updated.iter().all(|j| j.status == JobStatus::Assigned));
        let seqs: Vec<u32> = out.updated.iter().map(|j| j.sequence.unwrap()).collect();
        assert_eq!(seqs, vec![1, 1, 2, 2]);
        assert_eq!(out.response.assignments[0].driver, "Driver 1");
        assert_eq!(out.response.assignments[0].score, "1.00");
    }

    #[test]
    fn test_optimize_earliest_time_breaks_priority_ties() {
        let mut late = job(1, 1);
        late.earliest_time = Some(Utc.with_ymd_and_hms(2026, 5, 4, 15, 0, 0).unwrap());
        let mut early = job(2, 1);
        early.earliest_time = Some(Utc.with_ymd_and_hms(2026, 5, 4, 8, 0, 0).unwrap());
        let out = optimize(&[late, early, job(3, 1)], &[truck(1, TruckType::Small)], None);
        let ids: Vec<i64> = out.updated.iter().map(|j| j.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_optimize_large_only_skips_small_trucks() {
        let mut big = job(1, 1);
        big.large_truck_only = true;
        let out = optimize(&[big], &[truck(1, TruckType::Small)], None);
        assert!(out.updated.is_empty());
        assert_eq!(out.response.total_jobs, 1);
        assert_eq!(out.response.assigned, 0);

        let mut big = job(1, 1);
        big.large_truck_only = true;
        let out = optimize(
            &[big],
            &[truck(1, TruckType::Small), truck(2, TruckType::Large)],
            None,
        );
        assert_eq!(out.updated[0].assigned_truck_id, Some(2));
    }

    #[test]
    fn test_optimize_skips_closed_jobs_and_continues_sequences() {
        let mut done = job(1, 1);
        done.status = JobStatus::Completed;
        let mut deferred = job(2, 1);
        deferred.status = JobStatus::Deferred;
        let mut existing = job(3, 1);
        existing.assigned_truck_id = Some(1);
        existing.status = JobStatus::Assigned;
        existing.sequence = Some(4);

        let mut parked = truck(9, TruckType::Large);
        parked.current_status = TruckStatus::Maintenance;

        let out = optimize(
            &[done, deferred, existing, job(4, 2)],
            &[parked, truck(1, TruckType::Large)],
            Some(day()),
        );
        assert_eq!(out.response.total_jobs, 1);
        assert_eq!(out.updated[0].id, 4);
        assert_eq!(out.updated[0].assigned_truck_id, Some(1));
        assert_eq!(out.updated[0].sequence, Some(5));
    }

    #[test]
    fn test_routes_follow_sequence_and_link_maps() {
        let mut a = job(1, 1);
        a.assigned_truck_id = Some(1);
        a.sequence = Some(2);
        let mut b = job(2, 1);
        b.assigned_truck_id = Some(1);
        b.sequence = Some(1);
        let mut done = job(3, 1);
        done.assigned_truck_id = Some(1);
        done.sequence = Some(3);
        done.status = JobStatus::Completed;

        let plan = build_routes(
            &[a, b, done],
            &[truck(1, TruckType::Large), truck(2, TruckType::Small)],
            None,
        );
        assert!(plan.success);
        assert_eq!(plan.routes.len(), 1);
        let route = &plan.routes[0];
        let ids: Vec<i64> = route.stops.iter().map(|s| s.job_id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert!(route.distance_miles > 0.0);
        assert!(route.maps_url.starts_with(MAPS_DIR_URL));
        assert_eq!(route.maps_url.matches('/').count(), 5 + 2);
    }

    #[test]
    fn test_current_group_open_ids() {
        let mut jobs: Vec<Job> = (1..=5)
            .map(|i| {
                let mut j = job(i, 1);
                j.assigned_truck_id = Some(1);
                j.sequence = Some(i as u32);
                j
            })
            .collect();
        assert_eq!(current_group_open_ids(&jobs, 1, None), vec![1, 2, 3]);

        jobs[0].status = JobStatus::Completed;
        assert_eq!(current_group_open_ids(&jobs, 1, None), vec![2, 3]);

        for j in jobs.iter_mut().take(3) {
            j.status = JobStatus::Completed;
        }
        assert_eq!(current_group_open_ids(&jobs, 1, Some(day())), vec![4, 5]);
        assert!(current_group_open_ids(&jobs, 2, None).is_empty());
    }

    #[test]
    fn test_ops_day_defaults_to_earliest_open_day() {
        let tomorrow = day().succ_opt().unwrap();
        let mut jobs: Vec<Job> = (1..=4)
            .map(|i| {
                let mut j = job(i, 1);
                j.assigned_truck_id = Some(1);
                j.sequence = Some(i as u32);
                j
            })
            .collect();
        jobs[0].status = JobStatus::Completed;
        jobs[3].date = tomorrow;
        jobs[3].sequence = Some(1);

        assert_eq!(current_group_open_ids(&jobs, 1, None), vec![2, 3]);
        assert_eq!(current_group_open_ids(&jobs, 1, Some(tomorrow)), vec![4]);
        assert!(current_group_open_ids(&jobs, 1, day().pred_opt()).is_empty());
    }

    #[test]
    fn test_next_sequence_is_per_truck_and_day() {
        let mut jobs: Vec<Job> = (1..=3).map(|i| job(i, 1)).collect();
        jobs[0].assigned_truck_id = Some(1);
        jobs[0].sequence = Some(4);
        jobs[1].assigned_truck_id = Some(1);
        jobs[1].sequence = Some(2);
        jobs[2].assigned_truck_id = Some(2);
        jobs[2].sequence = Some(9);

        assert_eq!(next_sequence(&jobs, 1, day()), 5);
        assert_eq!(next_sequence(&jobs, 3, day()), 1);
        assert_eq!(next_sequence(&jobs, 1, day().succ_opt().unwrap()), 1);
    }

    #[test]
    fn test_summarize_counts_and_caps_utilization() {
        let seed = Seed::embedded().unwrap();
        let first = seed.jobs.iter().map(|j| j.date).min().unwrap();
        let metrics = summarize(
            &seed.jobs,
            &seed.trucks,
            &seed.items,
            DateRange {
                from: first,
                to: first,
            },
        );
        assert_eq!(metrics.jobs_completed, 2);
        assert_eq!(metrics.jobs_deferred, 1);
        assert_eq!(metrics.utilization_by_truck.len(), seed.trucks.len());
        assert!(metrics
            .utilization_by_truck
            .iter()
            .all(|u| (0.0..=100.0).contains(&u.utilization)));
        assert_eq!(metrics.on_time_percentage, METRICS_ON_TIME_PERCENTAGE);
        assert!(!metrics.heatmap_data.is_empty());
    }

    #[test]
    fn test_summarize_empty_range() {
        let seed = Seed::embedded().unwrap();
        let metrics = summarize(
            &seed.jobs,
            &seed.trucks,
            &seed.items,
            default_range(NaiveDate::from_ymd_opt(2000, 1, 7).unwrap()),
        );
        assert_eq!(metrics.jobs_completed, 0);
        assert!(metrics.heatmap_data.is_empty());
        assert!(metrics
            .utilization_by_truck
            .iter()
            .all(|u| u.utilization == 0.0));
        assert_eq!(
            metrics.date_range.from,
            NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
        );
    }
}
