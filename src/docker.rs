//! Container runtime preflight
//!
//! The harness builds and runs instance containers, so a missing or
//! unreachable Docker daemon must fail the run before any artifact is
//! written or the harness is invoked.

use async_trait::async_trait;
use bollard::Docker;
use tracing::info;

use crate::error::ValidationError;

/// Reachability probe for the container runtime backing the harness.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Probe the runtime; an error means validation cannot proceed.
    async fn ping(&self) -> Result<(), ValidationError>;
}

/// Probe backed by the local Docker daemon.
#[derive(Debug, Default)]
pub struct DockerRuntime;

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn ping(&self) -> Result<(), ValidationError> {
        let docker = Docker::connect_with_local_defaults().map_err(|e| {
            ValidationError::EnvironmentUnavailable {
                reason: e.to_string(),
            }
        })?;

        docker
            .ping()
            .await
            .map_err(|e| ValidationError::EnvironmentUnavailable {
                reason: e.to_string(),
            })?;

        info!("Connected to Docker daemon");
        Ok(())
    }
}
