#![cfg(feature = "db")]

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use tracing::info;

use super::{NetworkStore, SolarGridStore, StateStore, UniqueViolation};
use crate::domain::{
    Network, NewNetwork, NewSolarGrid, NewState, Page, PageRequest, SolarGrid, State,
};

pub struct PgStore {
    pub pool: PgPool,
}

impl PgStore {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .context("Failed to connect to PostgreSQL")?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;
        info!(max_connections, "PostgreSQL pool ready");
        Ok(Self { pool })
    }
}

#[derive(Debug, FromRow)]
struct NetworkRow {
    id: i64,
    name: String,
    owner_id: i64,
}

impl From<NetworkRow> for Network {
    fn from(row: NetworkRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            owner_id: row.owner_id,
        }
    }
}

#[derive(Debug, FromRow)]
struct SolarGridRow {
    id: i64,
    name: String,
    age: i32,
    power_output: f64,
    created_at: DateTime<Utc>,
    network_id: i64,
}

impl TryFrom<SolarGridRow> for SolarGrid {
    type Error = anyhow::Error;

    fn try_from(row: SolarGridRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            name: row.name,
            age: u32::try_from(row.age).context("negative grid age in database")?,
            power_output: row.power_output,
            created_at: row.created_at,
            network_id: row.network_id,
        })
    }
}

#[derive(Debug, FromRow)]
struct StateRow {
    id: i64,
    solar_grid_id: i64,
    age: i32,
    power_output: f64,
    is_first_state: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<StateRow> for State {
    type Error = anyhow::Error;

    fn try_from(row: StateRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            grid_id: row.solar_grid_id,
            age: u32::try_from(row.age).context("negative state age in database")?,
            power_output: row.power_output,
            is_first_state: row.is_first_state,
            created_at: row.created_at,
        })
    }
}

fn db_age(age: u32) -> Result<i32> {
    i32::try_from(age).context("age does not fit the database column")
}

/// Turns a unique index violation on the grid name into [`UniqueViolation`].
fn grid_write_error(err: sqlx::Error, name: &str) -> anyhow::Error {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => UniqueViolation {
            field: "name",
            value: name.to_string(),
        }
        .into(),
        _ => anyhow::Error::new(err).context("Failed to write solar grid"),
    }
}

async fn count(pool: &PgPool, table: &str) -> Result<usize> {
    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await?;
    Ok(usize::try_from(total)?)
}

fn limits(request: PageRequest) -> (i64, i64) {
    let request = request.clamped();
    (request.size as i64, request.offset() as i64)
}

#[async_trait]
impl NetworkStore for PgStore {
    async fn insert(&self, network: NewNetwork) -> Result<Network> {
        let row: NetworkRow = sqlx::query_as(
            r#"
            INSERT INTO networks (name, owner_id)
            VALUES ($1, $2)
            RETURNING id, name, owner_id
            "#,
        )
        .bind(&network.name)
        .bind(network.owner_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert network")?;
        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Network>> {
        let row: Option<NetworkRow> =
            sqlx::query_as("SELECT id, name, owner_id FROM networks WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Into::into))
    }

    async fn find_all_by_owner(&self, owner_id: i64) -> Result<Vec<Network>> {
        let rows: Vec<NetworkRow> = sqlx::query_as(
            "SELECT id, name, owner_id FROM networks WHERE owner_id = $1 ORDER BY id ASC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_page(&self, request: PageRequest) -> Result<Page<Network>> {
        let (limit, offset) = limits(request);
        let rows: Vec<NetworkRow> = sqlx::query_as(
            "SELECT id, name, owner_id FROM networks ORDER BY id ASC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        let request = request.clamped();
        Ok(Page {
            items: rows.into_iter().map(Into::into).collect(),
            page: request.page,
            size: request.size,
            total: count(&self.pool, "networks").await?,
        })
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM networks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

const GRID_COLUMNS: &str = "id, name, age, power_output, created_at, network_id";

#[async_trait]
impl SolarGridStore for PgStore {
    async fn insert(&self, grid: NewSolarGrid) -> Result<SolarGrid> {
        let row: SolarGridRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO solar_grids (name, age, power_output, created_at, network_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {GRID_COLUMNS}
            "#
        ))
        .bind(&grid.name)
        .bind(db_age(grid.age)?)
        .bind(grid.power_output)
        .bind(grid.created_at)
        .bind(grid.network_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| grid_write_error(e, &grid.name))?;
        row.try_into()
    }

    async fn update(&self, grid: &SolarGrid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE solar_grids
            SET name = $2, age = $3, power_output = $4
            WHERE id = $1
            "#,
        )
        .bind(grid.id)
        .bind(&grid.name)
        .bind(db_age(grid.age)?)
        .bind(grid.power_output)
        .execute(&self.pool)
        .await
        .map_err(|e| grid_write_error(e, &grid.name))?;
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<SolarGrid>> {
        let row: Option<SolarGridRow> =
            sqlx::query_as(&format!("SELECT {GRID_COLUMNS} FROM solar_grids WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn find_by_name_ignore_case(&self, name: &str) -> Result<Option<SolarGrid>> {
        let row: Option<SolarGridRow> = sqlx::query_as(&format!(
            "SELECT {GRID_COLUMNS} FROM solar_grids WHERE lower(name) = lower($1)"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn exists_by_name_ignore_case(&self, name: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM solar_grids WHERE lower(name) = lower($1))",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn find_all_by_network(&self, network_id: i64) -> Result<Vec<SolarGrid>> {
        let rows: Vec<SolarGridRow> = sqlx::query_as(&format!(
            "SELECT {GRID_COLUMNS} FROM solar_grids WHERE network_id = $1 ORDER BY id ASC"
        ))
        .bind(network_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_page(&self, request: PageRequest) -> Result<Page<SolarGrid>> {
        let (limit, offset) = limits(request);
        let rows: Vec<SolarGridRow> = sqlx::query_as(&format!(
            "SELECT {GRID_COLUMNS} FROM solar_grids ORDER BY id ASC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        let request = request.clamped();
        Ok(Page {
            items: rows
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<_>>()?,
            page: request.page,
            size: request.size,
            total: count(&self.pool, "solar_grids").await?,
        })
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM solar_grids WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

const STATE_COLUMNS: &str = "id, solar_grid_id, age, power_output, is_first_state, created_at";

#[async_trait]
impl StateStore for PgStore {
    async fn insert(&self, state: NewState) -> Result<State> {
        let row: StateRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO states (solar_grid_id, age, power_output, is_first_state, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {STATE_COLUMNS}
            "#
        ))
        .bind(state.grid_id)
        .bind(db_age(state.age)?)
        .bind(state.power_output)
        .bind(state.is_first_state)
        .bind(state.created_at)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert state")?;
        row.try_into()
    }

    async fn update(&self, state: &State) -> Result<()> {
        sqlx::query("UPDATE states SET age = $2, power_output = $3 WHERE id = $1")
            .bind(state.id)
            .bind(db_age(state.age)?)
            .bind(state.power_output)
            .execute(&self.pool)
            .await
            .context("Failed to update state")?;
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<State>> {
        let row: Option<StateRow> =
            sqlx::query_as(&format!("SELECT {STATE_COLUMNS} FROM states WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn find_all_by_grid(&self, grid_id: i64) -> Result<Vec<State>> {
        let rows: Vec<StateRow> = sqlx::query_as(&format!(
            "SELECT {STATE_COLUMNS} FROM states WHERE solar_grid_id = $1 ORDER BY id ASC"
        ))
        .bind(grid_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_page(&self, request: PageRequest) -> Result<Page<State>> {
        let (limit, offset) = limits(request);
        let rows: Vec<StateRow> = sqlx::query_as(&format!(
            "SELECT {STATE_COLUMNS} FROM states ORDER BY id ASC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        let request = request.clamped();
        Ok(Page {
            items: rows
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<_>>()?,
            page: request.page,
            size: request.size,
            total: count(&self.pool, "states").await?,
        })
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM states WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
