//! Storage layer for the school risk & forecasting pipeline.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub mod bootstrap;
pub mod budget_repository;
pub mod district_repository;
pub mod error;
pub mod forecast_repository;
pub mod infra_repository;
pub mod model_artifact_repository;
pub mod priority_repository;
pub mod proposal_repository;
pub mod school_repository;
pub mod teacher_repository;
pub mod trend_repository;

pub use bootstrap::bootstrap as bootstrap_schema;
pub use budget_repository::BudgetRepository;
pub use district_repository::DistrictRepository;
pub use error::StorageError;
pub use forecast_repository::ForecastRepository;
pub use infra_repository::InfrastructureRepository;
pub use model_artifact_repository::ModelArtifactRepository;
pub use priority_repository::PriorityRepository;
pub use proposal_repository::{GapRow, ProposalRepository};
pub use school_repository::{EnrolmentRepository, SchoolRepository};
pub use teacher_repository::TeacherRepository;
pub use trend_repository::TrendRepository;

/// Create a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool, StorageError> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(StorageError::Connection)
}

/// Check database connectivity.
pub async fn check_connection(pool: &PgPool) -> Result<(), StorageError> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(StorageError::Query)?;
    Ok(())
}
