//! Dockerデーモンのイメージ系プリミティブ
//!
//! コンポーネントはすべてこのトレイト越しにデーモンへアクセスします。
//! 本番実装は `bollard::Docker`、テストではモックに差し替えます。

// Bollard 0.19.4 の非推奨APIを一時的に使用
#![allow(deprecated)]

use bollard::Docker;
use bollard::auth::DockerCredentials;
use bollard::errors::Error as DockerError;
use bollard::image::{
    BuildImageOptions, CreateImageOptions, ListImagesOptions, PushImageOptions, TagImageOptions,
};
use bollard::models::{BuildInfo, CreateImageInfo, ImageSummary, PushImageInfo};
use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use http_body_util::{Either, Full};

/// イメージ操作のプリミティブ
#[allow(async_fn_in_trait)]
pub trait ImageApi {
    /// ビルドコンテキストを送信してイメージをビルド
    fn build_image(
        &self,
        options: BuildImageOptions<String>,
        context: Vec<u8>,
    ) -> BoxStream<'_, Result<BuildInfo, DockerError>>;

    /// 既存イメージにタグを付与
    async fn tag_image(
        &self,
        image: &str,
        options: TagImageOptions<String>,
    ) -> Result<(), DockerError>;

    /// イメージをレジストリにプッシュ
    fn push_image(
        &self,
        image: &str,
        options: PushImageOptions<String>,
        credentials: Option<DockerCredentials>,
    ) -> BoxStream<'_, Result<PushImageInfo, DockerError>>;

    /// レジストリからイメージを取得
    fn create_image(
        &self,
        options: CreateImageOptions<'static, String>,
        credentials: Option<DockerCredentials>,
    ) -> BoxStream<'_, Result<CreateImageInfo, DockerError>>;

    /// ローカルイメージの一覧を取得
    async fn list_images(
        &self,
        options: ListImagesOptions<String>,
    ) -> Result<Vec<ImageSummary>, DockerError>;

    /// ローカルイメージを削除
    async fn remove_image(&self, image: &str) -> Result<(), DockerError>;
}

impl ImageApi for Docker {
    fn build_image(
        &self,
        options: BuildImageOptions<String>,
        context: Vec<u8>,
    ) -> BoxStream<'_, Result<BuildInfo, DockerError>> {
        let body = Full::new(Bytes::from(context));
        Docker::build_image(self, options, None, Some(Either::Left(body))).boxed()
    }

    async fn tag_image(
        &self,
        image: &str,
        options: TagImageOptions<String>,
    ) -> Result<(), DockerError> {
        Docker::tag_image(self, image, Some(options)).await
    }

    fn push_image(
        &self,
        image: &str,
        options: PushImageOptions<String>,
        credentials: Option<DockerCredentials>,
    ) -> BoxStream<'_, Result<PushImageInfo, DockerError>> {
        Docker::push_image(self, image, Some(options), credentials).boxed()
    }

    fn create_image(
        &self,
        options: CreateImageOptions<'static, String>,
        credentials: Option<DockerCredentials>,
    ) -> BoxStream<'_, Result<CreateImageInfo, DockerError>> {
        Docker::create_image(self, Some(options), None, credentials).boxed()
    }

    async fn list_images(
        &self,
        options: ListImagesOptions<String>,
    ) -> Result<Vec<ImageSummary>, DockerError> {
        Docker::list_images(self, Some(options)).await
    }

    async fn remove_image(&self, image: &str) -> Result<(), DockerError> {
        Docker::remove_image(self, image, None::<bollard::query_parameters::RemoveImageOptions>, None)
            .await
            .map(|_| ())
    }
}
