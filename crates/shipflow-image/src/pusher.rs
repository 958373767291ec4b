//! イメージプッシュ処理
//!
//! 解決済みのレジストリ認証情報でイメージをプッシュします。

use crate::api::ImageApi;
use crate::auth::registry_credentials;
use crate::error::{ImageError, ImageResult};
use crate::reference::ImageReference;
use bollard::auth::DockerCredentials;
use bollard::models::PushImageInfo;
use colored::Colorize;
use futures_util::StreamExt;
use shipflow_secrets::RegistryCredential;
use std::io::Write;

/// プッシュ試行回数の既定値
pub const DEFAULT_PUSH_RETRY_COUNT: usize = 3;

/// イメージプッシュを実行するハンドラ
pub struct ImagePusher<C: ImageApi> {
    api: C,
}

impl<C: ImageApi> ImagePusher<C> {
    pub fn new(api: C) -> Self {
        Self { api }
    }

    /// イメージをレジストリにプッシュ
    ///
    /// ループは `DEFAULT_PUSH_RETRY_COUNT + 1` 回を無条件に実行します。
    /// 成功してもプッシュは繰り返され、失敗時は最初のエラーを即座に
    /// 返します。
    // TODO: 成功時にループを打ち切る。現状は成功したプッシュも繰り返される
    // ため、レジストリ側でレイヤーの再アップロードが観測される。
    pub async fn push(&self, reference: &str, credential: &RegistryCredential) -> ImageResult<()> {
        let reference = ImageReference::parse(reference);
        let credentials = registry_credentials(credential);

        println!("  → {}", reference.qualified().cyan());

        for attempt in 0..=DEFAULT_PUSH_RETRY_COUNT {
            tracing::debug!(attempt = attempt, image = %reference, "Pushing image");
            self.push_once(&reference, credentials.clone()).await?;
        }

        tracing::info!(image = %reference, "Push complete");
        Ok(())
    }

    /// 1回分のプッシュを実行しストリームを消化
    async fn push_once(
        &self,
        reference: &ImageReference,
        credentials: DockerCredentials,
    ) -> ImageResult<()> {
        #[allow(deprecated)]
        let options = bollard::image::PushImageOptions::<String> {
            tag: reference.tag.clone(),
        };

        let mut stream = self
            .api
            .push_image(&reference.repository, options, Some(credentials));

        let mut last_status = String::new();
        let mut error_message: Option<String> = None;

        while let Some(result) = stream.next().await {
            match result {
                Ok(info) => {
                    if let Some(err) = info.error {
                        error_message = Some(err);
                    } else {
                        self.handle_progress(&info, &mut last_status);
                    }
                }
                Err(e) => {
                    return Err(ImageError::PushFailed(e.to_string()));
                }
            }
        }

        // 最終行の改行
        println!();

        // エラーがあった場合
        if let Some(err) = error_message {
            return Err(ImageError::PushFailed(err));
        }

        Ok(())
    }

    /// プッシュ進捗を表示
    fn handle_progress(&self, info: &PushImageInfo, last_status: &mut String) {
        if let Some(status) = &info.status {
            let progress = info.progress.as_deref().unwrap_or("");

            match status.as_str() {
                "Pushing" => {
                    print!("\r  ↑ {} {}     ", status, progress);
                    std::io::stdout().flush().ok();
                }
                "Pushed" => {
                    println!("\r  {} Pushed                    ", "✓".green());
                }
                "Layer already exists" => {
                    println!("\r  {} Layer already exists      ", "✓".green());
                }
                "Preparing" | "Waiting" => {
                    // 準備中は表示をスキップ（ノイズ軽減）
                }
                _ => {
                    if status != last_status {
                        println!("\r  ℹ {}                    ", status);
                        *last_status = status.clone();
                    }
                }
            }
        }
    }
}
