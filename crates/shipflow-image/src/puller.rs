//! イメージの存在確認とpull
//!
//! コンテナ起動前のpull-if-absentで使われます。

use crate::api::ImageApi;
use crate::error::{ImageError, ImageResult};
use crate::reference::ImageReference;
use futures_util::StreamExt;
use std::collections::HashMap;

pub struct ImagePuller<C: ImageApi> {
    api: C,
}

impl<C: ImageApi> ImagePuller<C> {
    pub fn new(api: C) -> Self {
        Self { api }
    }

    /// イメージがローカルに存在するか確認
    ///
    /// 参照でフィルタした一覧が空でなければ存在とみなします。
    pub async fn has_image(&self, reference: &str) -> ImageResult<bool> {
        let mut filters = HashMap::new();
        filters.insert("reference".to_string(), vec![reference.to_string()]);

        #[allow(deprecated)]
        let options = bollard::image::ListImagesOptions::<String> {
            all: false,
            filters,
            ..Default::default()
        };

        let images = self.api.list_images(options).await?;
        Ok(!images.is_empty())
    }

    /// イメージを匿名アクセスでpull
    ///
    /// タグは常に `latest` を要求します。参照にタグが含まれていても
    /// 使われません。
    pub async fn pull(&self, reference: &str) -> ImageResult<()> {
        let parsed = ImageReference::parse(reference);

        println!("  ↓ イメージをダウンロード中: {}", parsed.repository);

        #[allow(deprecated)]
        let options = bollard::image::CreateImageOptions::<String> {
            from_image: parsed.repository.clone(),
            tag: "latest".to_string(),
            ..Default::default()
        };

        let mut stream = self.api.create_image(options, None);

        while let Some(info) = stream.next().await {
            match info {
                Ok(bollard::models::CreateImageInfo {
                    status: Some(status),
                    progress: Some(progress),
                    ..
                }) => {
                    // 進捗を表示（同じ行に上書き）
                    print!("\r  ↓ {}: {}", status, progress);
                    use std::io::Write;
                    std::io::stdout().flush().ok();
                }
                Ok(bollard::models::CreateImageInfo {
                    status: Some(status),
                    ..
                }) => {
                    print!("\r  ↓ {}                    ", status);
                    use std::io::Write;
                    std::io::stdout().flush().ok();
                }
                Err(e) => {
                    println!();
                    return Err(ImageError::PullFailed(e.to_string()));
                }
                _ => {}
            }
        }

        println!();
        tracing::info!(image = %parsed.repository, "Pull complete");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{MockImageApi, server_error};
    use bollard::models::ImageSummary;

    #[tokio::test]
    async fn test_has_image_true_when_filtered_list_nonempty() {
        let mock = MockImageApi::default();
        *mock.images.lock().unwrap() = vec![ImageSummary::default()];

        let puller = ImagePuller::new(mock);
        assert!(puller.has_image("nginx:1.25").await.unwrap());

        // referenceフィルタで問い合わせている
        let filters = puller.api.list_filters.lock().unwrap();
        assert_eq!(
            filters[0].get("reference").unwrap(),
            &vec!["nginx:1.25".to_string()]
        );
    }

    #[tokio::test]
    async fn test_has_image_false_when_filtered_list_empty() {
        let puller = ImagePuller::new(MockImageApi::default());
        assert!(!puller.has_image("nginx:1.25").await.unwrap());
    }

    #[tokio::test]
    async fn test_pull_always_requests_latest() {
        // 参照にタグがあってもlatestでpullされる
        let puller = ImagePuller::new(MockImageApi::default());
        puller.pull("nginx:1.25").await.unwrap();

        let calls = puller.api.pull_calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].from_image, "nginx");
        assert_eq!(calls[0].tag, "latest");
    }

    #[tokio::test]
    async fn test_pull_failure_surfaces_error() {
        let mock = MockImageApi::default();
        *mock.pull_items.lock().unwrap() = vec![Err(server_error("manifest unknown"))];

        let puller = ImagePuller::new(mock);
        let result = puller.pull("nginx").await;

        assert!(matches!(result, Err(ImageError::PullFailed(_))));
    }
}
