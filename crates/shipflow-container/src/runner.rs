//! コンテナの作成と起動
//!
//! イメージが無ければpullし、コンテナを作成・起動してハンドルを
//! 返します。作成・起動の失敗は型付きエラーとして呼び出し側に
//! 返します。

use crate::api::ContainerApi;
use crate::converter::spec_to_container_config;
use crate::error::{ContainerError, ContainerResult};
use crate::handle::ContainerHandle;
use crate::spec::ContainerSpec;
use shipflow_image::{ImageApi, ImagePuller};

pub struct ContainerRunner<C>
where
    C: ContainerApi + ImageApi + Clone,
{
    api: C,
}

impl<C> ContainerRunner<C>
where
    C: ContainerApi + ImageApi + Clone,
{
    pub fn new(api: C) -> Self {
        Self { api }
    }

    /// コンテナを作成して起動
    ///
    /// イメージがローカルに無い場合は先にpullします。pullに失敗した
    /// 場合はコンテナ作成を試みません。
    pub async fn run(&self, spec: &ContainerSpec) -> ContainerResult<ContainerHandle<C>> {
        let puller = ImagePuller::new(self.api.clone());

        let exists = puller
            .has_image(&spec.image)
            .await
            .map_err(|e| ContainerError::DockerApi(e.to_string()))?;

        if !exists {
            tracing::info!(image = %spec.image, "Image not found locally, pulling");
            if let Err(e) = puller.pull(&spec.image).await {
                return Err(ContainerError::ImageUnavailable {
                    image: spec.image.clone(),
                    message: e.to_string(),
                });
            }
        }

        let (config, options) = spec_to_container_config(spec);

        let created = self
            .api
            .create_container(options, config)
            .await
            .map_err(|e| ContainerError::CreateFailed {
                container: spec.name.clone(),
                message: e.to_string(),
            })?;

        tracing::info!(id = %created.id, name = %spec.name, "Container created");

        self.api
            .start_container(&created.id)
            .await
            .map_err(|e| ContainerError::StartFailed {
                container: spec.name.clone(),
                message: e.to_string(),
            })?;

        tracing::info!(id = %created.id, "Container started");

        Ok(ContainerHandle::new(self.api.clone(), created.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::HostBinding;
    use bollard::models::ImageSummary;

    use crate::testing::MockRuntime;

    fn nginx_spec() -> ContainerSpec {
        ContainerSpec::new(
            "app",
            "nginx:1.25",
            vec![],
            HostBinding {
                protocol_port: "80/tcp".to_string(),
                host_ip: "0.0.0.0".to_string(),
                host_port: "8080".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_run_pulls_when_image_absent() {
        // ローカルにイメージが無い: pull -> create -> start の順
        let mock = MockRuntime::default();
        let runner = ContainerRunner::new(mock.clone());

        let handle = runner.run(&nginx_spec()).await.unwrap();
        assert_eq!(handle.id(), "mock-container-id");

        let events = mock.inner.events.lock().unwrap();
        assert_eq!(events.as_slice(), ["list", "pull", "create", "start"]);

        // タグはlatestに落ちる
        let pulls = mock.inner.pull_calls.lock().unwrap();
        assert_eq!(pulls[0].from_image, "nginx");
        assert_eq!(pulls[0].tag, "latest");

        // ポート設定の確認
        let created = mock.inner.created.lock().unwrap();
        let (options, config) = &created[0];
        assert_eq!(options.name, "app");
        assert!(config.exposed_ports.as_ref().unwrap().contains_key("80/tcp"));
        let bindings = config
            .host_config
            .as_ref()
            .unwrap()
            .port_bindings
            .as_ref()
            .unwrap();
        let binding = bindings.get("80/tcp").unwrap().as_ref().unwrap();
        assert_eq!(binding[0].host_port, Some("8080".to_string()));
    }

    #[tokio::test]
    async fn test_run_skips_pull_when_image_present() {
        let mock = MockRuntime::default();
        *mock.inner.images.lock().unwrap() = vec![ImageSummary::default()];

        let runner = ContainerRunner::new(mock.clone());
        runner.run(&nginx_spec()).await.unwrap();

        // イメージがあればpullは一切呼ばれない
        assert!(mock.inner.pull_calls.lock().unwrap().is_empty());

        let events = mock.inner.events.lock().unwrap();
        assert_eq!(events.as_slice(), ["list", "create", "start"]);
    }

    #[tokio::test]
    async fn test_run_pull_failure_does_not_create() {
        let mock = MockRuntime::default();
        *mock.inner.pull_error.lock().unwrap() = Some("manifest unknown".to_string());

        let runner = ContainerRunner::new(mock.clone());
        let result = runner.run(&nginx_spec()).await;

        assert!(matches!(
            result,
            Err(ContainerError::ImageUnavailable { .. })
        ));
        assert!(mock.inner.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_create_failure_is_returned_not_fatal() {
        let mock = MockRuntime::default();
        *mock.inner.images.lock().unwrap() = vec![ImageSummary::default()];
        *mock.inner.create_error.lock().unwrap() = Some("invalid host config".to_string());

        let runner = ContainerRunner::new(mock.clone());
        let result = runner.run(&nginx_spec()).await;

        assert!(matches!(result, Err(ContainerError::CreateFailed { .. })));
        assert!(mock.inner.started.lock().unwrap().is_empty());

        // 失敗後も同じランナーで後続の呼び出しができる
        let retried = runner.run(&nginx_spec()).await;
        assert!(retried.is_ok());
    }

    #[tokio::test]
    async fn test_run_start_failure_is_returned() {
        let mock = MockRuntime::default();
        *mock.inner.images.lock().unwrap() = vec![ImageSummary::default()];
        *mock.inner.start_error.lock().unwrap() = Some("port is already allocated".to_string());

        let runner = ContainerRunner::new(mock.clone());
        let result = runner.run(&nginx_spec()).await;

        assert!(matches!(result, Err(ContainerError::StartFailed { .. })));
    }
}
