//! Solar fleet service: solar grids grouped into networks, owned by users, with
//! age-based output simulation and batch ingestion.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod domain;
pub mod ingest;
pub mod registry;
pub mod repo;
pub mod simulation;
pub mod telemetry;
