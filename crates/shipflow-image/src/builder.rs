use crate::api::ImageApi;
use crate::context::{BuildContext, ContextArchiver};
use crate::error::{ImageError, ImageResult};
use bollard::image::BuildImageOptions;
use bollard::models::BuildInfo;
use colored::Colorize;
use futures_util::stream::StreamExt;
use std::time::Duration;

/// ビルドのデッドライン（秒）
pub const BUILD_TIMEOUT_SECS: u64 = 120;

pub struct ImageBuilder<C: ImageApi> {
    api: C,
}

impl<C: ImageApi> ImageBuilder<C> {
    pub fn new(api: C) -> Self {
        Self { api }
    }

    /// イメージをビルド
    ///
    /// ビルド出力は生成されるそばから表示します。成否は蓄積された
    /// 最終結果でのみ判定します。
    pub async fn build(&self, context: &BuildContext) -> ImageResult<()> {
        tracing::info!("Building image: {}", context.image_name);

        let archive = ContextArchiver::create(context)?;

        #[allow(deprecated)]
        let options = BuildImageOptions::<String> {
            dockerfile: context.dockerfile_path.to_string_lossy().into_owned(),
            t: context.image_name.clone(),
            rm: true,      // 中間コンテナを削除
            forcerm: true, // ビルド失敗時も中間コンテナを削除
            ..Default::default()
        };

        tracing::debug!("Build options: {:?}", options);

        let build = async {
            let mut stream = self.api.build_image(options, archive);
            let mut error_message: Option<String> = None;

            while let Some(msg) = stream.next().await {
                match msg {
                    Ok(output) => {
                        self.handle_build_output(output, &mut error_message);
                    }
                    Err(e) => {
                        return Err(ImageError::DockerConnection(e));
                    }
                }
            }

            if let Some(err) = error_message {
                return Err(ImageError::BuildFailed(err));
            }

            Ok(())
        };

        match tokio::time::timeout(Duration::from_secs(BUILD_TIMEOUT_SECS), build).await {
            Ok(result) => {
                result?;
                tracing::info!("Successfully built: {}", context.image_name);
                Ok(())
            }
            Err(_) => Err(ImageError::BuildTimeout(BUILD_TIMEOUT_SECS)),
        }
    }

    /// ビルド出力の処理
    fn handle_build_output(&self, output: BuildInfo, error_message: &mut Option<String>) {
        if let Some(stream) = output.stream {
            // ビルドステップの出力
            print!("{}", stream);
        }

        if let Some(error) = output.error {
            *error_message = Some(error);
        }

        if let Some(error_detail) = output.error_detail
            && let Some(message) = error_detail.message
        {
            // 詳細なエラー情報で上書き
            *error_message = Some(message);
        }

        if let Some(status) = output.status {
            // ステータスメッセージ（pull等）
            println!("{}", status.cyan());
        }
    }
}
