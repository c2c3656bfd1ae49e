use std::sync::Arc;
use tracing::{debug, info};

use super::classify_write;
use crate::domain::{
    normalize_grid_name, same_grid_name, FleetError, FleetResult, NewSolarGrid, Page,
    PageRequest, SolarGrid,
};
use crate::repo::{NetworkStore, SolarGridStore};

/// Create, lookup and uniqueness rules for solar grids.
///
/// Every write restamps `power_output` from the age, so callers never set it.
/// The name pre-check here is an early exit; the store's own uniqueness guard
/// is what holds under concurrent writers.
#[derive(Clone)]
pub struct GridRegistry {
    grids: Arc<dyn SolarGridStore>,
    networks: Arc<dyn NetworkStore>,
}

impl GridRegistry {
    pub fn new(grids: Arc<dyn SolarGridStore>, networks: Arc<dyn NetworkStore>) -> Self {
        Self { grids, networks }
    }

    /// The name is trimmed; a blank or overlong name is `InvalidInput`.
    pub async fn create(&self, name: &str, age: u32, network_id: i64) -> FleetResult<SolarGrid> {
        let name = normalize_grid_name(name)?;
        if self.grids.exists_by_name_ignore_case(&name).await? {
            return Err(FleetError::grid_name_taken(&name));
        }
        if self.networks.find_by_id(network_id).await?.is_none() {
            return Err(FleetError::network_not_found(network_id));
        }

        let grid = self
            .grids
            .insert(NewSolarGrid::new(name, age, network_id))
            .await
            .map_err(classify_write)?;
        info!(
            grid_id = grid.id,
            network_id,
            age,
            power_output_kw = grid.power_output,
            "solar grid created"
        );
        Ok(grid)
    }

    pub async fn update(&self, id: i64, name: &str, age: u32) -> FleetResult<SolarGrid> {
        let name = normalize_grid_name(name)?;
        let mut grid = self.find_by_id(id).await?;

        if !same_grid_name(&name, &grid.name) && self.grids.exists_by_name_ignore_case(&name).await? {
            return Err(FleetError::grid_name_taken(&name));
        }

        grid.name = name;
        grid.set_age(age);
        self.grids.update(&grid).await.map_err(classify_write)?;
        info!(grid_id = id, age, power_output_kw = grid.power_output, "solar grid updated");
        Ok(grid)
    }

    pub async fn find_by_id(&self, id: i64) -> FleetResult<SolarGrid> {
        self.grids
            .find_by_id(id)
            .await?
            .ok_or_else(|| FleetError::grid_not_found(id))
    }

    pub async fn find_by_name(&self, name: &str) -> FleetResult<Option<SolarGrid>> {
        Ok(self.grids.find_by_name_ignore_case(name).await?)
    }

    pub async fn find_by_network_id(&self, network_id: i64) -> FleetResult<Vec<SolarGrid>> {
        if self.networks.find_by_id(network_id).await?.is_none() {
            return Err(FleetError::network_not_found(network_id));
        }
        Ok(self.grids.find_all_by_network(network_id).await?)
    }

    /// Grids across every network of the owner. `NotFound` when the owner has no network.
    pub async fn find_by_owner(&self, owner_id: i64) -> FleetResult<Vec<SolarGrid>> {
        let networks = self.networks.find_all_by_owner(owner_id).await?;
        if networks.is_empty() {
            return Err(FleetError::no_networks_for(owner_id));
        }

        let mut grids = Vec::new();
        for network in &networks {
            grids.extend(self.grids.find_all_by_network(network.id).await?);
        }
        debug!(owner_id, networks = networks.len(), grids = grids.len(), "owner grids loaded");
        Ok(grids)
    }

    pub async fn find_all(&self, request: PageRequest) -> FleetResult<Page<SolarGrid>> {
        Ok(self.grids.find_page(request).await?)
    }

    pub async fn delete_by_id(&self, id: i64) -> FleetResult<()> {
        if !self.grids.delete(id).await? {
            return Err(FleetError::grid_not_found(id));
        }
        info!(grid_id = id, "solar grid deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{compute_output, NewNetwork};
    use crate::repo::{MemoryStore, MockNetworkStore, MockSolarGridStore, UniqueViolation};

    async fn registry() -> (GridRegistry, i64) {
        let store = Arc::new(MemoryStore::default());
        let network = NetworkStore::insert(store.as_ref(), NewNetwork::new("ada", 1))
            .await
            .unwrap();
        (GridRegistry::new(store.clone(), store), network.id)
    }

    #[tokio::test]
    async fn test_create_then_read_back() {
        let (registry, network_id) = registry().await;
        let created = registry.create("Harbour", 250, network_id).await.unwrap();
        let found = registry.find_by_id(created.id).await.unwrap();

        assert_eq!(found.name, "Harbour");
        assert_eq!(found.power_output, compute_output(250));
        assert_eq!(found.network_id, network_id);
    }

    #[tokio::test]
    async fn test_duplicate_name_differing_in_case() {
        let (registry, network_id) = registry().await;
        registry.create("Harbour", 250, network_id).await.unwrap();

        let err = registry.create("hArBoUr", 10, network_id).await.unwrap_err();
        assert!(matches!(err, FleetError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_create_in_missing_network() {
        let (registry, _) = registry().await;
        let err = registry.create("Harbour", 250, 77).await.unwrap_err();
        assert!(matches!(err, FleetError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_recomputes_output() {
        let (registry, network_id) = registry().await;
        let created = registry.create("Harbour", 20, network_id).await.unwrap();
        assert_eq!(created.power_output, 0.0);

        let updated = registry.update(created.id, "Harbour East", 500).await.unwrap();
        assert_eq!(updated.name, "Harbour East");
        assert_eq!(updated.power_output, compute_output(500));
        assert_eq!(registry.find_by_id(created.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_keeping_name_with_new_case() {
        let (registry, network_id) = registry().await;
        let created = registry.create("Harbour", 20, network_id).await.unwrap();
        let updated = registry.update(created.id, "HARBOUR", 90).await.unwrap();
        assert_eq!(updated.name, "HARBOUR");
    }

    #[tokio::test]
    async fn test_update_into_taken_name() {
        let (registry, network_id) = registry().await;
        registry.create("Harbour", 20, network_id).await.unwrap();
        let other = registry.create("Dunes", 20, network_id).await.unwrap();

        let err = registry.update(other.id, "harbour", 90).await.unwrap_err();
        assert!(matches!(err, FleetError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_blank_or_overlong_names_are_invalid() {
        let (registry, network_id) = registry().await;
        for name in [String::new(), "   ".to_string(), "x".repeat(501)] {
            let err = registry.create(&name, 100, network_id).await.unwrap_err();
            assert!(matches!(err, FleetError::InvalidInput(_)), "{name:?}");
        }

        let created = registry.create("  Harbour  ", 100, network_id).await.unwrap();
        assert_eq!(created.name, "Harbour");
        let err = registry.update(created.id, " ", 100).await.unwrap_err();
        assert!(matches!(err, FleetError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_missing_ids() {
        let (registry, _) = registry().await;
        assert!(matches!(registry.find_by_id(3).await, Err(FleetError::NotFound(_))));
        assert!(matches!(registry.update(3, "x", 1).await, Err(FleetError::NotFound(_))));
        assert!(matches!(registry.delete_by_id(3).await, Err(FleetError::NotFound(_))));
        assert!(matches!(
            registry.find_by_network_id(3).await,
            Err(FleetError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_find_by_owner_spans_networks() {
        let store = Arc::new(MemoryStore::default());
        let first = NetworkStore::insert(store.as_ref(), NewNetwork::new("ada", 1)).await.unwrap();
        let second = NetworkStore::insert(store.as_ref(), NewNetwork::new("ada", 1)).await.unwrap();
        NetworkStore::insert(store.as_ref(), NewNetwork::new("bob", 2)).await.unwrap();
        let registry = GridRegistry::new(store.clone(), store);

        registry.create("A", 100, first.id).await.unwrap();
        registry.create("B", 100, second.id).await.unwrap();

        assert_eq!(registry.find_by_owner(1).await.unwrap().len(), 2);
        assert!(registry.find_by_owner(2).await.unwrap().is_empty());
        assert!(matches!(registry.find_by_owner(3).await, Err(FleetError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_store_unique_violation_is_already_exists() {
        let mut grids = MockSolarGridStore::new();
        grids.expect_exists_by_name_ignore_case().returning(|_| Ok(false));
        grids.expect_insert().returning(|grid| {
            Err(UniqueViolation {
                field: "name",
                value: grid.name,
            }
            .into())
        });
        let mut networks = MockNetworkStore::new();
        networks
            .expect_find_by_id()
            .returning(|id| Ok(Some(NewNetwork::new("ada", 1).into_network(id))));

        let registry = GridRegistry::new(Arc::new(grids), Arc::new(networks));
        let err = registry.create("Harbour", 100, 1).await.unwrap_err();
        assert!(matches!(err, FleetError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_store_failure_is_storage_error() {
        let mut grids = MockSolarGridStore::new();
        grids
            .expect_exists_by_name_ignore_case()
            .returning(|_| Err(anyhow::anyhow!("connection reset")));
        let registry = GridRegistry::new(Arc::new(grids), Arc::new(MockNetworkStore::new()));

        let err = registry.create("Harbour", 100, 1).await.unwrap_err();
        assert!(matches!(err, FleetError::Storage(_)));
    }
}
