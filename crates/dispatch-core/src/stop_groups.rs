//! Three-stop cadence grouping.
//!
//! A truck's jobs are sorted by route sequence and cut into batches of
//! [`STOP_GROUP_SIZE`]. Groups are derived on every read and never stored, so
//! a re-fetch that changes sequence numbers moves the group boundaries.

use serde::Serialize;

use crate::defaults::STOP_GROUP_SIZE;
use crate::models::{Job, Truck};

/// A batch of up to three sequential stops for one truck.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopGroup {
    /// 1-based position of the group in the route.
    pub group_number: usize,
    pub stops: Vec<Job>,
    /// True iff every stop in the group is completed.
    pub is_completed: bool,
    /// True for the first group that is not completed.
    pub is_current: bool,
}

/// Cut an already-sorted stop list into groups.
///
/// The first incomplete group is flagged current. An empty list yields no
/// groups.
pub fn chunk_stops(sorted: &[Job]) -> Vec<StopGroup> {
    let mut groups: Vec<StopGroup> = sorted
        .chunks(STOP_GROUP_SIZE)
        .enumerate()
        .map(|(i, chunk)| StopGroup {
            group_number: i + 1,
            stops: chunk.to_vec(),
            is_completed: chunk.iter().all(Job::is_completed),
            is_current: false,
        })
        .collect();

    if let Some(current) = groups.iter_mut().find(|g| !g.is_completed) {
        current.is_current = true;
    }
    groups
}

/// Group the jobs assigned to `truck_id`.
///
/// Jobs are stable-sorted by sequence (missing sequence sorts as 0), so jobs
/// sharing a sequence number keep their input order.
pub fn group_stops(jobs: &[Job], truck_id: i64) -> Vec<StopGroup> {
    let mut truck_jobs: Vec<Job> = jobs
        .iter()
        .filter(|j| j.assigned_truck_id == Some(truck_id))
        .cloned()
        .collect();
    truck_jobs.sort_by_key(Job::sequence_key);

    let groups = chunk_stops(&truck_jobs);
    tracing::trace!(truck_id, group_count = groups.len(), "Grouped stops");
    groups
}

/// One truck and its stop groups, as shown on the ops board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TruckStops {
    pub truck: Truck,
    pub groups: Vec<StopGroup>,
}

impl TruckStops {
    pub fn has_stops(&self) -> bool {
        !self.groups.is_empty()
    }

    pub fn current_group(&self) -> Option<&StopGroup> {
        self.groups.iter().find(|g| g.is_current)
    }

    /// True when there is at least one group and every group is completed.
    pub fn all_completed(&self) -> bool {
        self.has_stops() && self.groups.iter().all(|g| g.is_completed)
    }
}

/// Build the ops board: one entry per truck, in input order.
pub fn build_ops_board(trucks: &[Truck], jobs: &[Job]) -> Vec<TruckStops> {
    trucks
        .iter()
        .map(|truck| TruckStops {
            truck: truck.clone(),
            groups: group_stops(jobs, truck.id),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JobAction, JobStatus, Location, TruckStatus, TruckType};
    use chrono::{NaiveDate, Utc};

    fn job(id: i64, truck: Option<i64>, sequence: Option<u32>) -> Job {
        let now = Utc::now();
        Job {
            id,
            title: format!("Stop {}", id),
            action_type: JobAction::Dropoff,
            location: Location::default(),
            items: vec![],
            priority: 2,
            earliest_time: None,
            latest_time: None,
            service_minutes: None,
            notes: None,
            large_truck_only: false,
            curfew_flag: false,
            assigned_truck_id: truck,
            assigned_driver_id: None,
            assigned_truck: None,
            status: JobStatus::Assigned,
            sequence,
            date: NaiveDate::from_ymd_opt(2026, 5, 4).unwrap(),
            created_at: now,
            updated_at: now,
        }
    }

    fn truck(id: i64) -> Truck {
        let now = Utc::now();
        Truck {
            id,
            truck_name: format!("T{}", id),
            capacity_cu_ft: 800.0,
            max_weight_lbs: None,
            length_ft: 20.0,
            width_ft: 8.0,
            height_ft: 8.0,
            truck_type: TruckType::Large,
            current_status: TruckStatus::Available,
            last_known_lat: None,
            last_known_lng: None,
            restricted_load_types: vec![],
            driver: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn ids(group: &StopGroup) -> Vec<i64> {
        group.stops.iter().map(|j| j.id).collect()
    }

    #[test]
    fn test_empty_input_yields_no_groups() {
        assert!(group_stops(&[], 1).is_empty());
        assert!(chunk_stops(&[]).is_empty());
    }

    #[test]
    fn test_group_count_is_ceiling_of_n_over_three() {
        for n in 0..=10u32 {
            let jobs: Vec<Job> = (1..=n).map(|i| job(i as i64, Some(1), Some(i))).collect();
            let groups = group_stops(&jobs, 1);
            let expected = (n as usize).div_ceil(3);
            assert_eq!(groups.len(), expected, "n = {}", n);
            for (i, g) in groups.iter().enumerate() {
                if i + 1 < groups.len() {
                    assert_eq!(g.stops.len(), 3);
                } else {
                    let rem = n as usize % 3;
                    assert_eq!(g.stops.len(), if rem == 0 { 3 } else { rem });
                }
            }
        }
    }

    #[test]
    fn test_seven_jobs_scenario() {
        let mut jobs: Vec<Job> = (1..=7).map(|i| job(i, Some(1), Some(i as u32))).collect();
        let groups = group_stops(&jobs, 1);
        assert_eq!(groups.len(), 3);
        assert_eq!(ids(&groups[0]), vec![1, 2, 3]);
        assert_eq!(ids(&groups[1]), vec![4, 5, 6]);
        assert_eq!(ids(&groups[2]), vec![7]);
        assert!(groups.iter().all(|g| !g.is_completed));
        assert!(groups[0].is_current);

        for j in jobs.iter_mut().take(3) {
            j.status = JobStatus::Completed;
        }
        let groups = group_stops(&jobs, 1);
        assert!(groups[0].is_completed);
        assert!(!groups[1].is_completed);
        assert!(!groups[2].is_completed);
        assert!(!groups[0].is_current);
        assert!(groups[1].is_current);
        assert!(!groups[2].is_current);
    }

    #[test]
    fn test_sorts_by_sequence_and_filters_by_truck() {
        let jobs = vec![
            job(10, Some(1), Some(3)),
            job(11, Some(2), Some(1)),
            job(12, Some(1), Some(1)),
            job(13, None, Some(2)),
            job(14, Some(1), Some(2)),
        ];
        let groups = group_stops(&jobs, 1);
        assert_eq!(groups.len(), 1);
        assert_eq!(ids(&groups[0]), vec![12, 14, 10]);
    }

    #[test]
    fn test_missing_sequence_sorts_first_and_ties_are_stable() {
        let jobs = vec![
            job(1, Some(1), Some(2)),
            job(2, Some(1), None),
            job(3, Some(1), Some(2)),
            job(4, Some(1), Some(0)),
        ];
        let groups = group_stops(&jobs, 1);
        assert_eq!(ids(&groups[0]), vec![2, 4, 1]);
        assert_eq!(ids(&groups[1]), vec![3]);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let jobs = vec![job(1, Some(1), Some(2)), job(2, Some(1), Some(1))];
        let before = jobs.clone();
        let _ = group_stops(&jobs, 1);
        assert_eq!(jobs, before);
    }

    #[test]
    fn test_ops_board_keeps_truck_order() {
        let trucks = vec![truck(2), truck(1)];
        let jobs = vec![job(1, Some(1), Some(1))];
        let board = build_ops_board(&trucks, &jobs);
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].truck.id, 2);
        assert!(!board[0].has_stops());
        assert!(board[0].current_group().is_none());
        assert!(!board[0].all_completed());
        assert!(board[1].has_stops());
        assert_eq!(board[1].current_group().map(|g| g.group_number), Some(1));
    }

    #[test]
    fn test_all_completed_board_has_no_current_group() {
        let mut jobs = vec![job(1, Some(1), Some(1)), job(2, Some(1), Some(2))];
        for j in &mut jobs {
            j.status = JobStatus::Completed;
        }
        let board = build_ops_board(&[truck(1)], &jobs);
        assert!(board[0].all_completed());
        assert!(board[0].current_group().is_none());
    }
}
