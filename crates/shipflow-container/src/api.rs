//! Dockerデーモンのコンテナ系プリミティブ
//!
//! 本番実装は `bollard::Docker`、テストではモックに差し替えます。

// Bollard 0.19.4 の非推奨APIを一時的に使用
#![allow(deprecated)]

use bollard::Docker;
use bollard::container::{Config, CreateContainerOptions};
use bollard::errors::Error as DockerError;
use bollard::models::{ContainerCreateResponse, ContainerInspectResponse};

/// コンテナ操作のプリミティブ
#[allow(async_fn_in_trait)]
pub trait ContainerApi {
    async fn create_container(
        &self,
        options: CreateContainerOptions<String>,
        config: Config<String>,
    ) -> Result<ContainerCreateResponse, DockerError>;

    async fn start_container(&self, id: &str) -> Result<(), DockerError>;

    async fn stop_container(&self, id: &str, timeout_secs: i64) -> Result<(), DockerError>;

    async fn remove_container(&self, id: &str, remove_volumes: bool) -> Result<(), DockerError>;

    async fn inspect_container(&self, id: &str) -> Result<ContainerInspectResponse, DockerError>;
}

impl ContainerApi for Docker {
    async fn create_container(
        &self,
        options: CreateContainerOptions<String>,
        config: Config<String>,
    ) -> Result<ContainerCreateResponse, DockerError> {
        Docker::create_container(self, Some(options), config).await
    }

    async fn start_container(&self, id: &str) -> Result<(), DockerError> {
        Docker::start_container(
            self,
            id,
            None::<bollard::query_parameters::StartContainerOptions>,
        )
        .await
    }

    async fn stop_container(&self, id: &str, timeout_secs: i64) -> Result<(), DockerError> {
        Docker::stop_container(
            self,
            id,
            Some(bollard::container::StopContainerOptions { t: timeout_secs }),
        )
        .await
    }

    async fn remove_container(&self, id: &str, remove_volumes: bool) -> Result<(), DockerError> {
        Docker::remove_container(
            self,
            id,
            Some(bollard::container::RemoveContainerOptions {
                v: remove_volumes,
                ..Default::default()
            }),
        )
        .await
    }

    async fn inspect_container(&self, id: &str) -> Result<ContainerInspectResponse, DockerError> {
        Docker::inspect_container(self, id, None::<bollard::container::InspectContainerOptions>)
            .await
    }
}
