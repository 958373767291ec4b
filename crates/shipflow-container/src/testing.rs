//! テスト用モックランタイム
//!
//! イメージ系・コンテナ系の両プリミティブを実装し、呼び出し順序と
//! パラメータを記録します。

// Bollard 0.19.4 の非推奨APIを一時的に使用
#![allow(deprecated)]

use bollard::auth::DockerCredentials;
use bollard::container::{Config, CreateContainerOptions};
use bollard::errors::Error as DockerError;
use bollard::image::{
    BuildImageOptions, CreateImageOptions, ListImagesOptions, PushImageOptions, TagImageOptions,
};
use bollard::models::{
    BuildInfo, ContainerCreateResponse, ContainerInspectResponse, CreateImageInfo, ImageSummary,
    PushImageInfo,
};
use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};
use std::sync::{Arc, Mutex};

use crate::api::ContainerApi;
use shipflow_image::ImageApi;

#[derive(Clone, Default)]
pub struct MockRuntime {
    pub inner: Arc<MockState>,
}

#[derive(Default)]
pub struct MockState {
    /// 操作の発生順
    pub events: Mutex<Vec<&'static str>>,
    pub images: Mutex<Vec<ImageSummary>>,
    pub pull_calls: Mutex<Vec<CreateImageOptions<'static, String>>>,
    pub pull_error: Mutex<Option<String>>,
    pub created: Mutex<Vec<(CreateContainerOptions<String>, Config<String>)>>,
    pub create_error: Mutex<Option<String>>,
    pub started: Mutex<Vec<String>>,
    pub start_error: Mutex<Option<String>>,
    pub stopped: Mutex<Vec<(String, i64)>>,
    pub stop_error: Mutex<Option<String>>,
    pub removed: Mutex<Vec<(String, bool)>>,
    pub remove_error: Mutex<Option<String>>,
    pub inspect_response: Mutex<Option<ContainerInspectResponse>>,
}

fn server_error(message: &str) -> DockerError {
    DockerError::DockerResponseServerError {
        status_code: 500,
        message: message.to_string(),
    }
}

impl ImageApi for MockRuntime {
    fn build_image(
        &self,
        _options: BuildImageOptions<String>,
        _context: Vec<u8>,
    ) -> BoxStream<'_, Result<BuildInfo, DockerError>> {
        self.inner.events.lock().unwrap().push("build");
        stream::iter(vec![]).boxed()
    }

    async fn tag_image(
        &self,
        _image: &str,
        _options: TagImageOptions<String>,
    ) -> Result<(), DockerError> {
        self.inner.events.lock().unwrap().push("tag");
        Ok(())
    }

    fn push_image(
        &self,
        _image: &str,
        _options: PushImageOptions<String>,
        _credentials: Option<DockerCredentials>,
    ) -> BoxStream<'_, Result<PushImageInfo, DockerError>> {
        self.inner.events.lock().unwrap().push("push");
        stream::iter(vec![]).boxed()
    }

    fn create_image(
        &self,
        options: CreateImageOptions<'static, String>,
        _credentials: Option<DockerCredentials>,
    ) -> BoxStream<'_, Result<CreateImageInfo, DockerError>> {
        self.inner.events.lock().unwrap().push("pull");
        self.inner.pull_calls.lock().unwrap().push(options);
        match self.inner.pull_error.lock().unwrap().as_ref() {
            Some(message) => stream::iter(vec![Err(server_error(message))]).boxed(),
            None => stream::iter(vec![]).boxed(),
        }
    }

    async fn list_images(
        &self,
        _options: ListImagesOptions<String>,
    ) -> Result<Vec<ImageSummary>, DockerError> {
        self.inner.events.lock().unwrap().push("list");
        Ok(self.inner.images.lock().unwrap().clone())
    }

    async fn remove_image(&self, _image: &str) -> Result<(), DockerError> {
        self.inner.events.lock().unwrap().push("remove_image");
        Ok(())
    }
}

impl ContainerApi for MockRuntime {
    async fn create_container(
        &self,
        options: CreateContainerOptions<String>,
        config: Config<String>,
    ) -> Result<ContainerCreateResponse, DockerError> {
        self.inner.events.lock().unwrap().push("create");
        if let Some(message) = self.inner.create_error.lock().unwrap().take() {
            return Err(server_error(&message));
        }
        self.inner.created.lock().unwrap().push((options, config));
        Ok(ContainerCreateResponse {
            id: "mock-container-id".to_string(),
            warnings: vec![],
        })
    }

    async fn start_container(&self, id: &str) -> Result<(), DockerError> {
        self.inner.events.lock().unwrap().push("start");
        if let Some(message) = self.inner.start_error.lock().unwrap().take() {
            return Err(server_error(&message));
        }
        self.inner.started.lock().unwrap().push(id.to_string());
        Ok(())
    }

    async fn stop_container(&self, id: &str, timeout_secs: i64) -> Result<(), DockerError> {
        self.inner.events.lock().unwrap().push("stop");
        if let Some(message) = self.inner.stop_error.lock().unwrap().take() {
            return Err(server_error(&message));
        }
        self.inner
            .stopped
            .lock()
            .unwrap()
            .push((id.to_string(), timeout_secs));
        Ok(())
    }

    async fn remove_container(&self, id: &str, remove_volumes: bool) -> Result<(), DockerError> {
        self.inner.events.lock().unwrap().push("remove");
        if let Some(message) = self.inner.remove_error.lock().unwrap().take() {
            return Err(server_error(&message));
        }
        self.inner
            .removed
            .lock()
            .unwrap()
            .push((id.to_string(), remove_volumes));
        Ok(())
    }

    async fn inspect_container(&self, _id: &str) -> Result<ContainerInspectResponse, DockerError> {
        self.inner.events.lock().unwrap().push("inspect");
        match self.inner.inspect_response.lock().unwrap().clone() {
            Some(response) => Ok(response),
            None => Ok(ContainerInspectResponse::default()),
        }
    }
}
