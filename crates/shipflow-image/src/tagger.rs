use crate::api::ImageApi;
use crate::error::{ImageError, ImageResult};
use crate::reference::ImageReference;
use std::time::Duration;

/// タグ操作のデッドライン（秒）
pub const TAG_TIMEOUT_SECS: u64 = 120;

pub struct ImageTagger<C: ImageApi> {
    api: C,
}

impl<C: ImageApi> ImageTagger<C> {
    pub fn new(api: C) -> Self {
        Self { api }
    }

    /// 既存イメージに `repository:tag` を付与
    ///
    /// 同名のタグが既にある場合はデーモン側で上書きされます。
    pub async fn tag(&self, source: &str, target: &str) -> ImageResult<()> {
        let reference = ImageReference::parse(target);

        #[allow(deprecated)]
        let options = bollard::image::TagImageOptions::<String> {
            repo: reference.repository.clone(),
            tag: reference.tag.clone(),
        };

        let tag_call = self.api.tag_image(source, options);

        match tokio::time::timeout(Duration::from_secs(TAG_TIMEOUT_SECS), tag_call).await {
            Ok(Ok(())) => {
                tracing::info!(source = %source, target = %reference, "Tagged image");
                Ok(())
            }
            Ok(Err(e)) => Err(ImageError::TagFailed(e.to_string())),
            Err(_) => Err(ImageError::TagTimeout(TAG_TIMEOUT_SECS)),
        }
    }
}
