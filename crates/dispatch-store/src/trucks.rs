//! In-memory truck repository.

use async_trait::async_trait;
use chrono::Utc;
use dispatch_core::{
    CreateTruckRequest, Error, Result, Truck, TruckRepository, UpdateTruckRequest,
};
use tracing::debug;

use crate::table::{shared, Shared};

#[derive(Debug, Clone)]
pub struct MemoryTruckRepository {
    table: Shared<Truck>,
}

impl MemoryTruckRepository {
    pub fn new(trucks: Vec<Truck>) -> Self {
        Self {
            table: shared(trucks.into_iter().map(|t| (t.id, t))),
        }
    }
}

impl Default for MemoryTruckRepository {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl TruckRepository for MemoryTruckRepository {
    async fn list(&self) -> Result<Vec<Truck>> {
        Ok(self.table.read().await.to_vec())
    }

    async fn fetch(&self, id: i64) -> Result<Truck> {
        self.table
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(Error::TruckNotFound(id))
    }

    async fn insert(&self, req: CreateTruckRequest) -> Result<Truck> {
        if req.capacity_cu_ft.is_nan() || req.capacity_cu_ft <= 0.0 {
            return Err(Error::InvalidInput(
                "capacityCuFt must be greater than 0".to_string(),
            ));
        }
        let now = Utc::now();
        let mut table = self.table.write().await;
        let id = table.allocate_id();
        let truck = Truck {
            id,
            truck_name: req.truck_name,
            capacity_cu_ft: req.capacity_cu_ft,
            max_weight_lbs: req.max_weight_lbs,
            length_ft: req.length_ft,
            width_ft: req.width_ft,
            height_ft: req.height_ft,
            truck_type: req.truck_type,
            current_status: req.current_status,
            last_known_lat: None,
            last_known_lng: None,
            restricted_load_types: req.restricted_load_types,
            driver: req.driver,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        table.put(id, truck.clone());
        debug!(truck_id = id, truck_type = %truck.truck_type, "Inserted truck");
        Ok(truck)
    }

    async fn update(&self, id: i64, req: UpdateTruckRequest) -> Result<Truck> {
        let mut table = self.table.write().await;
        let truck = table.get_mut(id).ok_or(Error::TruckNotFound(id))?;
        if let Some(v) = req.truck_name {
            truck.truck_name = v;
        }
        if let Some(v) = req.capacity_cu_ft {
            truck.capacity_cu_ft = v;
        }
        if let Some(v) = req.max_weight_lbs {
            truck.max_weight_lbs = Some(v);
        }
        if let Some(v) = req.truck_type {
            truck.truck_type = v;
        }
        if let Some(v) = req.current_status {
            truck.current_status = v;
        }
        if let Some(v) = req.last_known_lat {
            truck.last_known_lat = Some(v);
        }
        if let Some(v) = req.last_known_lng {
            truck.last_known_lng = Some(v);
        }
        if let Some(v) = req.driver {
            truck.driver = Some(v);
        }
        if let Some(v) = req.is_active {
            truck.is_active = v;
        }
        truck.updated_at = Utc::now();
        Ok(truck.clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.table
            .write()
            .await
            .remove(id)
            .map(|_| debug!(truck_id = id, "Deleted truck"))
            .ok_or(Error::TruckNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_core::{TruckStatus, TruckType};

    fn request(name: &str, capacity: f64) -> CreateTruckRequest {
        CreateTruckRequest {
            truck_name: name.to_string(),
            capacity_cu_ft: capacity,
            max_weight_lbs: None,
            length_ft: 0.0,
            width_ft: 0.0,
            height_ft: 0.0,
            truck_type: TruckType::Small,
            current_status: TruckStatus::Available,
            restricted_load_types: vec![],
            driver: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_update() {
        let repo = MemoryTruckRepository::default();
        let truck = repo.insert(request("Box 1", 400.0)).await.unwrap();
        assert!(truck.is_active);

        let updated = repo
            .update(
                truck.id,
                UpdateTruckRequest {
                    current_status: Some(TruckStatus::Maintenance),
                    driver: Some("Sam".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.current_status, TruckStatus::Maintenance);
        assert_eq!(updated.driver.as_deref(), Some("Sam"));
        assert!(!updated.is_dispatchable());
    }

    #[tokio::test]
    async fn test_rejects_non_positive_capacity() {
        let repo = MemoryTruckRepository::default();
        let err = repo.insert(request("Box 1", 0.0)).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_unknown_truck() {
        let repo = MemoryTruckRepository::default();
        assert!(matches!(
            repo.fetch(3).await.unwrap_err(),
            Error::TruckNotFound(3)
        ));
        assert!(repo.delete(3).await.is_err());
    }
}
