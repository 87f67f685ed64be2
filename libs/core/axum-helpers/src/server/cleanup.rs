//! Connection cleanup helpers for graceful shutdown.

use tracing::{error, info};

/// Close a SeaORM PostgreSQL connection, logging the outcome.
///
/// # Example
/// ```ignore
/// use axum_helpers::server::close_postgres;
///
/// close_postgres(db, "catalog").await;
/// ```
pub async fn close_postgres(db: sea_orm::DatabaseConnection, name: &str) {
    match db.close().await {
        Ok(_) => info!("PostgreSQL connection '{}' closed successfully", name),
        Err(e) => error!("Error closing PostgreSQL connection '{}': {}", name, e),
    }
}

/// Runs named cleanup tasks concurrently and waits for all of them.
///
/// # Example
/// ```ignore
/// let mut cleanup = CleanupCoordinator::new();
/// cleanup.add_task("postgres", async move { close_postgres(db, "catalog").await });
/// cleanup.run().await;
/// ```
pub struct CleanupCoordinator {
    tasks: Vec<(&'static str, tokio::task::JoinHandle<()>)>,
}

impl CleanupCoordinator {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// The task is spawned immediately and tracked for completion.
    pub fn add_task<F>(&mut self, name: &'static str, task: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(task);
        self.tasks.push((name, handle));
    }

    /// A panicking task is logged and does not stop the others.
    pub async fn run(self) {
        info!("Running {} cleanup tasks", self.tasks.len());

        for (name, handle) in self.tasks {
            match handle.await {
                Ok(_) => info!("Cleanup task '{}' completed successfully", name),
                Err(e) => error!("Cleanup task '{}' failed: {}", name, e),
            }
        }

        info!("All cleanup tasks completed");
    }
}

impl Default for CleanupCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
