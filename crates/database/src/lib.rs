use std::env;

use async_trait::async_trait;
use batches::database::{DistanceRepo, Result, StudyAreaRepo, WorkFilter, WorkRowSource};
use log::info;
use model::{DistanceRecord, StudyArea, WorkRow};
use queries::convert_error;
use sqlx::postgres::PgPoolOptions;

pub mod data_model;
pub mod queries;

pub struct DatabaseConnectionInfo {
    pub username: String,
    pub password: String,
    pub hostname: String,
    pub port: u16,
    pub database: String,
}

impl DatabaseConnectionInfo {
    pub fn from_env() -> Option<Self> {
        let username = env::var("DATABASE_USER").ok()?;
        let password = env::var("DATABASE_PASSWORD").ok()?;
        let hostname = env::var("DATABASE_HOST").ok()?;
        let port: u16 = env::var("DATABASE_PORT").ok()?.parse().ok()?;
        let database = env::var("DATABASE_NAME").ok()?;
        Some(Self {
            username,
            password,
            hostname,
            port,
            database,
        })
    }

    pub fn postgres_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.hostname, self.port, self.database
        )
    }
}

#[derive(Clone)]
pub struct PgDatabase {
    connection: sqlx::PgPool,
}

impl PgDatabase {
    /// Opens a pool of at most `max_connections` connections to `url`.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect(url)
            .await
            .map_err(convert_error)?;
        info!("connected to postgres with up to {max_connections} connections");
        Ok(Self { connection: pool })
    }

    /// The work rows of one study area, readable in pages.
    pub fn work_rows(&self, study_area_id: i32, filter: WorkFilter) -> PgWorkRowSource {
        PgWorkRowSource {
            pool: self.connection.clone(),
            study_area_id,
            filter,
        }
    }
}

#[async_trait]
impl StudyAreaRepo for PgDatabase {
    async fn study_area_by_name(&self, name: &str) -> Result<Option<StudyArea>> {
        queries::study_area::get_by_name(&self.connection, name).await
    }
}

#[async_trait]
impl DistanceRepo for PgDatabase {
    async fn insert_distances(&self, records: &[DistanceRecord]) -> Result<u64> {
        queries::distance::insert(&self.connection, records).await
    }
}

pub struct PgWorkRowSource {
    pool: sqlx::PgPool,
    study_area_id: i32,
    filter: WorkFilter,
}

#[async_trait]
impl WorkRowSource for PgWorkRowSource {
    async fn count(&self) -> Result<u64> {
        queries::work_row::count(&self.pool, self.study_area_id, &self.filter).await
    }

    async fn page(&self, start: u64, limit: u64) -> Result<Vec<WorkRow>> {
        queries::work_row::page(&self.pool, self.study_area_id, &self.filter, start, limit).await
    }
}
