use std::sync::Arc;
use tracing::info;

use crate::domain::{
    normalize_network_name, FleetError, FleetResult, Network, NewNetwork, Page, PageRequest,
};
use crate::repo::{NetworkStore, UserStore};

#[derive(Clone)]
pub struct NetworkRegistry {
    networks: Arc<dyn NetworkStore>,
    users: Arc<dyn UserStore>,
}

impl NetworkRegistry {
    pub fn new(networks: Arc<dyn NetworkStore>, users: Arc<dyn UserStore>) -> Self {
        Self { networks, users }
    }

    pub async fn create(&self, name: &str, owner_id: i64) -> FleetResult<Network> {
        let name = normalize_network_name(name)?;
        if self.users.find_by_id(owner_id).await?.is_none() {
            return Err(FleetError::user_not_found(owner_id));
        }
        let network = self.networks.insert(NewNetwork::new(name, owner_id)).await?;
        info!(network_id = network.id, owner_id, name = %network.name, "network created");
        Ok(network)
    }

    pub async fn find_by_id(&self, id: i64) -> FleetResult<Network> {
        self.networks
            .find_by_id(id)
            .await?
            .ok_or_else(|| FleetError::network_not_found(id))
    }

    /// Fails with `NotFound` when the owner has no network at all.
    pub async fn find_all_by_owner(&self, owner_id: i64) -> FleetResult<Vec<Network>> {
        let networks = self.networks.find_all_by_owner(owner_id).await?;
        if networks.is_empty() {
            return Err(FleetError::no_networks_for(owner_id));
        }
        Ok(networks)
    }

    pub async fn find_all(&self, request: PageRequest) -> FleetResult<Page<Network>> {
        Ok(self.networks.find_page(request).await?)
    }

    pub async fn delete_by_id(&self, id: i64) -> FleetResult<()> {
        if !self.networks.delete(id).await? {
            return Err(FleetError::network_not_found(id));
        }
        info!(network_id = id, "network deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Role, User};
    use crate::repo::MemoryStore;

    fn registry() -> NetworkRegistry {
        let store = Arc::new(MemoryStore::with_users([User {
            id: 1,
            username: "ada".into(),
            token: "t-1".into(),
            roles: vec![Role::User],
        }]));
        NetworkRegistry::new(store.clone(), store)
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let registry = registry();
        let created = registry.create("Amsterdam", 1).await.unwrap();
        let found = registry.find_by_id(created.id).await.unwrap();
        assert_eq!(found, created);
        assert_eq!(found.owner_id, 1);
    }

    #[tokio::test]
    async fn test_names_need_not_be_unique() {
        let registry = registry();
        registry.create("Amsterdam", 1).await.unwrap();
        registry.create("Amsterdam", 1).await.unwrap();
        assert_eq!(registry.find_all_by_owner(1).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_for_unknown_owner() {
        let err = registry().create("Amsterdam", 99).await.unwrap_err();
        assert!(matches!(err, FleetError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_blank_or_overlong_network_names() {
        let registry = registry();
        assert!(matches!(
            registry.create("  ", 1).await,
            Err(FleetError::InvalidInput(_))
        ));
        assert!(matches!(
            registry.create(&"n".repeat(51), 1).await,
            Err(FleetError::InvalidInput(_))
        ));
        assert_eq!(registry.create(" Utrecht ", 1).await.unwrap().name, "Utrecht");
    }

    #[tokio::test]
    async fn test_owner_without_networks() {
        let err = registry().find_all_by_owner(1).await.unwrap_err();
        assert!(matches!(err, FleetError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_network() {
        let registry = registry();
        assert!(matches!(
            registry.delete_by_id(5).await,
            Err(FleetError::NotFound(_))
        ));

        let created = registry.create("Utrecht", 1).await.unwrap();
        registry.delete_by_id(created.id).await.unwrap();
        assert!(registry.find_by_id(created.id).await.is_err());
    }
}
