use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};
use tracing::debug;

use crate::common::{DatabaseError, DatabaseResult};

/// Readiness check for `/ready`: runs `SELECT 1` on a pooled connection.
///
/// Pool exhaustion and a dead server both surface as
/// [`DatabaseError::HealthCheckFailed`].
pub async fn check_health(db: &DatabaseConnection) -> DatabaseResult<()> {
    debug!("Running PostgreSQL readiness check");

    let stmt = Statement::from_string(DatabaseBackend::Postgres, "SELECT 1".to_owned());
    db.query_one_raw(stmt)
        .await
        .map_err(|e| DatabaseError::HealthCheckFailed(format!("PostgreSQL: {}", e)))?;

    Ok(())
}
