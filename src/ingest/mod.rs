//! Batch ingestion: one network per batch, one grid per element.
//!
//! Ingestion is best-effort. An element that is malformed or whose name is
//! taken is recorded in the report and the batch carries on; a storage
//! failure aborts the batch.

pub mod descriptor;
pub mod history;

pub use descriptor::{parse_loose_batch, BatchElement, GridDescriptor, GridSpec};
pub use history::{HistoryImport, HistoryReport};

use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

use crate::domain::{compute_output, Caller, FleetResult, Network, SolarGrid};
use crate::registry::{GridRegistry, NetworkRegistry};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridSummary {
    pub id: i64,
    pub name: String,
    pub age: u32,
    pub power_output: f64,
}

impl From<&SolarGrid> for GridSummary {
    fn from(grid: &SolarGrid) -> Self {
        Self {
            id: grid.id,
            name: grid.name.clone(),
            age: grid.age,
            power_output: grid.power_output,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedElement {
    /// Position in the submitted batch.
    pub index: usize,
    pub name: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestionReport {
    pub network_id: i64,
    pub network_name: String,
    /// Aggregate output in kW of the created grids.
    pub total_output: f64,
    pub created: Vec<GridSummary>,
    pub rejected: Vec<RejectedElement>,
}

impl IngestionReport {
    fn new(network: &Network) -> Self {
        Self {
            network_id: network.id,
            network_name: network.name.clone(),
            total_output: 0.0,
            created: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

impl fmt::Display for IngestionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Produced: {:.2} kWh", self.total_output)?;
        writeln!(f, "Network:")?;
        for grid in &self.created {
            writeln!(f, "{} in use for {} days", grid.name, grid.age)?;
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct IngestionPipeline {
    networks: NetworkRegistry,
    grids: GridRegistry,
}

impl IngestionPipeline {
    pub fn new(networks: NetworkRegistry, grids: GridRegistry) -> Self {
        Self { networks, grids }
    }

    /// Ingests an uploaded document of loosely typed elements.
    pub async fn ingest_document(
        &self,
        caller: &Caller,
        raw: &[u8],
        elapsed_days: Option<u32>,
    ) -> FleetResult<IngestionReport> {
        let batch = parse_loose_batch(raw)?;
        self.ingest(caller, batch, elapsed_days).await
    }

    pub async fn ingest_descriptors(
        &self,
        caller: &Caller,
        descriptors: Vec<GridDescriptor>,
        elapsed_days: Option<u32>,
    ) -> FleetResult<IngestionReport> {
        let batch = descriptors.into_iter().map(BatchElement::from).collect();
        self.ingest(caller, batch, elapsed_days).await
    }

    /// Creates a network named after the caller and one grid per element.
    ///
    /// With `elapsed_days` set, every created grid contributes
    /// `compute_output(elapsed_days)` to the total instead of its stored output.
    pub async fn ingest(
        &self,
        caller: &Caller,
        batch: Vec<BatchElement>,
        elapsed_days: Option<u32>,
    ) -> FleetResult<IngestionReport> {
        let network = self.networks.create(&caller.username, caller.id).await?;
        info!(
            network_id = network.id,
            owner_id = caller.id,
            elements = batch.len(),
            elapsed_days,
            "ingesting solar grid batch"
        );

        let mut report = IngestionReport::new(&network);
        for (index, element) in batch.into_iter().enumerate() {
            let name = element.name;
            match self.admit(element.parsed, network.id).await {
                Ok(grid) => {
                    report.total_output += match elapsed_days {
                        Some(days) => compute_output(days),
                        None => grid.power_output,
                    };
                    report.created.push(GridSummary::from(&grid));
                }
                Err(err) if err.is_element_local() => {
                    warn!(index, error = %err, "batch element rejected");
                    report.rejected.push(RejectedElement {
                        index,
                        name,
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        info!(
            network_id = network.id,
            created = report.created.len(),
            rejected = report.rejected.len(),
            total_output_kw = report.total_output,
            "batch ingested"
        );
        Ok(report)
    }

    async fn admit(
        &self,
        parsed: FleetResult<GridDescriptor>,
        network_id: i64,
    ) -> FleetResult<SolarGrid> {
        let spec = parsed?.into_spec()?;
        self.grids.create(&spec.name, spec.age, network_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FleetError, Role, User};
    use crate::repo::{MemoryStore, MockSolarGridStore, Repositories};
    use std::sync::Arc;

    fn ada() -> User {
        User {
            id: 1,
            username: "ada".into(),
            token: "t-1".into(),
            roles: vec![Role::User],
        }
    }

    fn caller() -> Caller {
        Caller {
            id: 1,
            username: "ada".into(),
            roles: vec![Role::User],
        }
    }

    fn pipeline() -> (IngestionPipeline, GridRegistry) {
        let repos = Repositories::from_memory(Arc::new(MemoryStore::with_users([ada()])));
        let networks = NetworkRegistry::new(repos.networks.clone(), repos.users.clone());
        let grids = GridRegistry::new(repos.grids.clone(), repos.networks.clone());
        (IngestionPipeline::new(networks, grids.clone()), grids)
    }

    fn sample_batch() -> Vec<GridDescriptor> {
        vec![GridDescriptor::new("A", 100), GridDescriptor::new("B", 30)]
    }

    #[tokio::test]
    async fn test_total_from_stored_outputs() {
        let (pipeline, _) = pipeline();
        let report = pipeline
            .ingest_descriptors(&caller(), sample_batch(), None)
            .await
            .unwrap();

        assert_eq!(report.created.len(), 2);
        assert_eq!(report.network_name, "ada");
        assert!((report.total_output - (compute_output(100) + compute_output(30))).abs() < 1e-9);
        assert!((report.total_output - compute_output(100)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_total_with_elapsed_days_override() {
        let (pipeline, _) = pipeline();
        let report = pipeline
            .ingest_descriptors(&caller(), sample_batch(), Some(200))
            .await
            .unwrap();

        assert!((report.total_output - 2.0 * compute_output(200)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_grids_land_in_one_network() {
        let (pipeline, grids) = pipeline();
        let report = pipeline
            .ingest_descriptors(&caller(), sample_batch(), None)
            .await
            .unwrap();

        let stored = grids.find_by_network_id(report.network_id).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(grids.find_by_owner(1).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_name_is_rejected_per_element() {
        let (pipeline, _) = pipeline();
        let batch = vec![
            GridDescriptor::new("A", 100),
            GridDescriptor::new("a", 400),
            GridDescriptor::new("C", 365),
        ];
        let report = pipeline.ingest_descriptors(&caller(), batch, None).await.unwrap();

        let created: Vec<&str> = report.created.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(created, vec!["A", "C"]);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].index, 1);
        assert_eq!(report.rejected[0].name.as_deref(), Some("a"));
        assert!((report.total_output - (compute_output(100) + compute_output(365))).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_overlong_name_is_rejected_per_element() {
        let (pipeline, _) = pipeline();
        let batch = vec![
            GridDescriptor::new("A", 100),
            GridDescriptor::new("x".repeat(501), 200),
            GridDescriptor::new("C", 365),
        ];
        let report = pipeline.ingest_descriptors(&caller(), batch, None).await.unwrap();

        assert_eq!(report.created.len(), 2);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].index, 1);
    }

    #[tokio::test]
    async fn test_network_created_when_every_element_is_rejected() {
        let (pipeline, grids) = pipeline();
        let raw = br#"[{"name": "A"}, {"age": 4}, 7]"#;
        let report = pipeline.ingest_document(&caller(), raw, None).await.unwrap();

        assert!(report.created.is_empty());
        assert_eq!(report.rejected.len(), 3);
        assert_eq!(report.total_output, 0.0);
        assert!(grids
            .find_by_network_id(report.network_id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_aborts_the_batch() {
        let memory = Arc::new(MemoryStore::with_users([ada()]));
        let mut grids = MockSolarGridStore::new();
        grids.expect_exists_by_name_ignore_case().returning(|_| Ok(false));
        let mut inserted: i64 = 0;
        grids.expect_insert().times(2).returning(move |grid| {
            inserted += 1;
            if inserted == 1 {
                Ok(grid.into_grid(inserted))
            } else {
                Err(anyhow::anyhow!("disk full"))
            }
        });
        let pipeline = IngestionPipeline::new(
            NetworkRegistry::new(memory.clone(), memory.clone()),
            GridRegistry::new(Arc::new(grids), memory),
        );

        let batch = vec![
            GridDescriptor::new("A", 100),
            GridDescriptor::new("B", 200),
            GridDescriptor::new("C", 300),
        ];
        let err = pipeline
            .ingest_descriptors(&caller(), batch, None)
            .await
            .unwrap_err();
        assert!(matches!(err, FleetError::Storage(_)));
    }

    #[tokio::test]
    async fn test_document_with_malformed_age() {
        let (pipeline, _) = pipeline();
        let raw = br#"[{"Name": "A", "AGE": 100, "site": "north"}, {"name": "B", "age": "ten"}, {"name": "C"}]"#;
        let report = pipeline.ingest_document(&caller(), raw, None).await.unwrap();

        assert_eq!(report.created.len(), 1);
        assert_eq!(report.rejected.len(), 2);
        assert_eq!(report.rejected[0].name.as_deref(), Some("B"));
        assert_eq!(report.rejected[1].name.as_deref(), Some("C"));
    }

    #[tokio::test]
    async fn test_document_that_is_not_an_array() {
        let (pipeline, grids) = pipeline();
        let err = pipeline
            .ingest_document(&caller(), br#"{"name": "A"}"#, None)
            .await
            .unwrap_err();
        assert!(matches!(err, FleetError::InvalidInput(_)));
        assert!(grids.find_by_owner(1).await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_caller_cannot_ingest() {
        let (pipeline, _) = pipeline();
        let stranger = Caller {
            id: 42,
            username: "mallory".into(),
            roles: vec![Role::User],
        };
        let err = pipeline
            .ingest_descriptors(&stranger, sample_batch(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, FleetError::NotFound(_)));
    }

    #[test]
    fn test_report_summary() {
        let report = IngestionReport {
            network_id: 1,
            network_name: "ada".into(),
            total_output: 19.99726,
            created: vec![GridSummary {
                id: 1,
                name: "A".into(),
                age: 100,
                power_output: 19.99726,
            }],
            rejected: vec![],
        };
        assert_eq!(
            report.to_string(),
            "Produced: 20.00 kWh\nNetwork:\nA in use for 100 days\n"
        );
    }
}
