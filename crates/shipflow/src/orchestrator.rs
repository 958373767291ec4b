//! ライフサイクルのオーケストレーション
//!
//! ビルド・タグ・プッシュ・起動・後片付けを順に実行します。
//! ビルド/タグ/プッシュ/起動の失敗は残りのパイプラインを中断します。
//! 起動成功後の後片付け（イメージ削除）の失敗はログに残すのみで、
//! 実行全体を失敗にはしません。

use crate::pipeline::{Pipeline, Step};
use colored::Colorize;
use shipflow_container::{ContainerApi, ContainerHandle, ContainerRunner, ContainerSpec, HostBinding};
use shipflow_image::{BuildContext, ImageApi, ImageBuilder, ImagePusher, ImageTagger};
use shipflow_secrets::{CredentialResolver, CredentialSource, RegistryCredential, VaultStore};
use std::path::PathBuf;

/// 1回の実行の入力
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// イメージ参照 (`name[:tag]`)
    pub image: String,
    /// Dockerfileのパス（`context_dir` がある場合はそこからの相対）
    pub dockerfile: PathBuf,
    /// ビルドコンテキスト。省略時はDockerfileのみ
    pub context_dir: Option<PathBuf>,
    /// 起動するコンテナ名
    pub container_name: String,
    /// `KEY=VALUE` 形式の環境変数
    pub env: Vec<String>,
    /// ホストへのポートバインディング
    pub binding: HostBinding,
}

/// 実行結果
pub struct Outcome<D>
where
    D: ImageApi + ContainerApi + Clone,
{
    pub image: String,
    /// Runステップを実行した場合の起動済みコンテナ
    pub container: Option<ContainerHandle<D>>,
    /// RemoveImageステップが成功したか
    pub image_removed: bool,
}

/// 設定された取得元から認証情報を1回だけ解決
///
/// 解決結果は以後読み取り専用で、プッシュステップに渡されます。
pub async fn resolve_credential(
    source: &CredentialSource,
) -> anyhow::Result<Option<RegistryCredential>> {
    match source {
        CredentialSource::None => Ok(None),
        CredentialSource::SecretStore {
            address,
            strategy,
            path,
        } => {
            let store = VaultStore::connect(address)?;
            let mut resolver = CredentialResolver::new(store);
            Ok(Some(resolver.resolve(strategy, path).await?))
        }
    }
}

pub struct Orchestrator<D>
where
    D: ImageApi + ContainerApi + Clone,
{
    docker: D,
    credential: Option<RegistryCredential>,
}

impl<D> Orchestrator<D>
where
    D: ImageApi + ContainerApi + Clone,
{
    pub fn new(docker: D) -> Self {
        Self {
            docker,
            credential: None,
        }
    }

    pub fn with_credential(docker: D, credential: Option<RegistryCredential>) -> Self {
        Self { docker, credential }
    }

    /// パイプラインを順に実行
    pub async fn execute(
        &self,
        pipeline: &Pipeline,
        request: &RunRequest,
    ) -> anyhow::Result<Outcome<D>> {
        // プッシュするのに認証情報が無い場合は開始前に失敗させる
        if pipeline.contains(Step::Push) && self.credential.is_none() {
            anyhow::bail!(
                "プッシュには認証情報が必要です。VAULT_URL と認証方式を設定してください"
            );
        }

        let mut outcome = Outcome {
            image: request.image.clone(),
            container: None,
            image_removed: false,
        };

        for step in pipeline.steps() {
            match step {
                Step::Build => {
                    println!("{}", format!("▶ ビルド: {}", request.image).green().bold());
                    let builder = ImageBuilder::new(self.docker.clone());
                    let context = BuildContext {
                        image_name: request.image.clone(),
                        dockerfile_path: request.dockerfile.clone(),
                        context_dir: request.context_dir.clone(),
                    };
                    builder.build(&context).await?;
                    println!("  {} ビルド完了", "✓".green());
                }
                Step::Tag => {
                    println!("{}", format!("▶ タグ付け: {}", request.image).green().bold());
                    let tagger = ImageTagger::new(self.docker.clone());
                    tagger.tag(&request.image, &request.image).await?;
                    println!("  {} タグ付け完了", "✓".green());
                }
                Step::Push => {
                    println!("{}", format!("▶ プッシュ: {}", request.image).green().bold());
                    let pusher = ImagePusher::new(self.docker.clone());
                    let Some(credential) = self.credential.as_ref() else {
                        anyhow::bail!("プッシュには認証情報が必要です");
                    };
                    pusher.push(&request.image, credential).await?;
                    println!("  {} プッシュ完了", "✓".green());
                }
                Step::Run => {
                    println!(
                        "{}",
                        format!("▶ 起動: {}", request.container_name).green().bold()
                    );
                    let runner = ContainerRunner::new(self.docker.clone());
                    let spec = ContainerSpec::new(
                        &request.container_name,
                        &request.image,
                        request.env.clone(),
                        request.binding.clone(),
                    );
                    let handle = runner.run(&spec).await?;
                    println!("  {} 起動完了: {}", "✓".green(), handle.id());
                    outcome.container = Some(handle);
                }
                Step::RemoveImage => {
                    println!(
                        "{}",
                        format!("▶ 後片付け: {}", request.image).green().bold()
                    );
                    // 後片付けの失敗は実行全体を失敗にはしない
                    match self.docker.remove_image(&request.image).await {
                        Ok(()) => {
                            outcome.image_removed = true;
                            println!("  {} イメージ削除完了", "✓".green());
                        }
                        Err(e) => {
                            tracing::warn!(image = %request.image, "イメージ削除に失敗: {}", e);
                            println!("  ⚠ イメージ削除に失敗: {}", e);
                        }
                    }
                }
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bollard::auth::DockerCredentials;
    use bollard::container::{Config, CreateContainerOptions};
    use bollard::errors::Error as DockerError;
    use bollard::image::{
        BuildImageOptions, CreateImageOptions, ListImagesOptions, PushImageOptions,
        TagImageOptions,
    };
    use bollard::models::{
        BuildInfo, ContainerCreateResponse, ContainerInspectResponse, CreateImageInfo,
        ImageSummary, PushImageInfo,
    };
    use futures_util::StreamExt;
    use futures_util::stream::{self, BoxStream};
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct MockDaemon {
        inner: Arc<MockState>,
    }

    #[derive(Default)]
    struct MockState {
        events: Mutex<Vec<&'static str>>,
        build_error: Mutex<Option<String>>,
        push_error: Mutex<Option<String>>,
        remove_image_error: Mutex<Option<String>>,
        images: Mutex<Vec<ImageSummary>>,
    }

    fn server_error(message: &str) -> DockerError {
        DockerError::DockerResponseServerError {
            status_code: 500,
            message: message.to_string(),
        }
    }

    impl ImageApi for MockDaemon {
        fn build_image(
            &self,
            _options: BuildImageOptions<String>,
            _context: Vec<u8>,
        ) -> BoxStream<'_, Result<BuildInfo, DockerError>> {
            self.inner.events.lock().unwrap().push("build");
            match self.inner.build_error.lock().unwrap().as_ref() {
                Some(message) => stream::iter(vec![Ok(BuildInfo {
                    error: Some(message.clone()),
                    ..Default::default()
                })])
                .boxed(),
                None => stream::iter(vec![]).boxed(),
            }
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
            match self.inner.push_error.lock().unwrap().as_ref() {
                Some(message) => stream::iter(vec![Err(server_error(message))]).boxed(),
                None => stream::iter(vec![]).boxed(),
            }
        }

        fn create_image(
            &self,
            _options: CreateImageOptions<'static, String>,
            _credentials: Option<DockerCredentials>,
        ) -> BoxStream<'_, Result<CreateImageInfo, DockerError>> {
            self.inner.events.lock().unwrap().push("pull");
            stream::iter(vec![]).boxed()
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
            match self.inner.remove_image_error.lock().unwrap().as_ref() {
                Some(message) => Err(server_error(message)),
                None => Ok(()),
            }
        }
    }

    impl ContainerApi for MockDaemon {
        async fn create_container(
            &self,
            _options: CreateContainerOptions<String>,
            _config: Config<String>,
        ) -> Result<ContainerCreateResponse, DockerError> {
            self.inner.events.lock().unwrap().push("create");
            Ok(ContainerCreateResponse {
                id: "mock-id".to_string(),
                warnings: vec![],
            })
        }

        async fn start_container(&self, _id: &str) -> Result<(), DockerError> {
            self.inner.events.lock().unwrap().push("start");
            Ok(())
        }

        async fn stop_container(&self, _id: &str, _timeout_secs: i64) -> Result<(), DockerError> {
            self.inner.events.lock().unwrap().push("stop");
            Ok(())
        }

        async fn remove_container(
            &self,
            _id: &str,
            _remove_volumes: bool,
        ) -> Result<(), DockerError> {
            self.inner.events.lock().unwrap().push("remove");
            Ok(())
        }

        async fn inspect_container(
            &self,
            _id: &str,
        ) -> Result<ContainerInspectResponse, DockerError> {
            self.inner.events.lock().unwrap().push("inspect");
            Ok(ContainerInspectResponse::default())
        }
    }

    fn request_in(dir: &TempDir) -> RunRequest {
        let dockerfile = dir.path().join("Dockerfile");
        fs::write(&dockerfile, "FROM alpine:latest").unwrap();
        RunRequest {
            image: "demo/app:v1".to_string(),
            dockerfile,
            context_dir: None,
            container_name: "demo".to_string(),
            env: vec![],
            binding: HostBinding {
                protocol_port: "8080/tcp".to_string(),
                host_ip: "127.0.0.1".to_string(),
                host_port: "8080".to_string(),
            },
        }
    }

    fn credential() -> RegistryCredential {
        RegistryCredential {
            username: "u".to_string(),
            password: "p".to_string(),
            registry_url: "r.example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_full_pipeline_step_order() {
        let temp = TempDir::new().unwrap();
        let daemon = MockDaemon::default();
        // Runステップでpullが走らないようにイメージを置いておく
        *daemon.inner.images.lock().unwrap() = vec![ImageSummary::default()];

        let orchestrator = Orchestrator::with_credential(daemon.clone(), Some(credential()));
        let outcome = orchestrator
            .execute(&Pipeline::full(), &request_in(&temp))
            .await
            .unwrap();

        assert!(outcome.container.is_some());
        assert!(outcome.image_removed);

        let events = daemon.inner.events.lock().unwrap();
        // プッシュは成功しても4回繰り返される
        assert_eq!(
            events.as_slice(),
            [
                "build",
                "tag",
                "push",
                "push",
                "push",
                "push",
                "list",
                "create",
                "start",
                "remove_image",
            ]
        );
    }

    #[tokio::test]
    async fn test_push_without_credential_fails_before_any_step() {
        let temp = TempDir::new().unwrap();
        let daemon = MockDaemon::default();

        let orchestrator = Orchestrator::new(daemon.clone());
        let result = orchestrator
            .execute(&Pipeline::full(), &request_in(&temp))
            .await;

        assert!(result.is_err());
        assert!(daemon.inner.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_build_failure_aborts_pipeline() {
        let temp = TempDir::new().unwrap();
        let daemon = MockDaemon::default();
        *daemon.inner.build_error.lock().unwrap() = Some("step failed".to_string());

        let orchestrator = Orchestrator::with_credential(daemon.clone(), Some(credential()));
        let result = orchestrator
            .execute(&Pipeline::full(), &request_in(&temp))
            .await;

        assert!(result.is_err());
        // ビルド以降のステップは実行されない
        assert_eq!(daemon.inner.events.lock().unwrap().as_slice(), ["build"]);
    }

    #[tokio::test]
    async fn test_push_failure_aborts_pipeline() {
        let temp = TempDir::new().unwrap();
        let daemon = MockDaemon::default();
        *daemon.inner.push_error.lock().unwrap() = Some("unauthorized".to_string());

        let orchestrator = Orchestrator::with_credential(daemon.clone(), Some(credential()));
        let result = orchestrator
            .execute(&Pipeline::full(), &request_in(&temp))
            .await;

        assert!(result.is_err());
        let events = daemon.inner.events.lock().unwrap();
        // 最初の失敗で即座に返り、残りの試行もステップも実行されない
        assert_eq!(events.as_slice(), ["build", "tag", "push"]);
    }

    #[tokio::test]
    async fn test_remove_image_failure_is_not_fatal() {
        let temp = TempDir::new().unwrap();
        let daemon = MockDaemon::default();
        *daemon.inner.images.lock().unwrap() = vec![ImageSummary::default()];
        *daemon.inner.remove_image_error.lock().unwrap() =
            Some("image is being used".to_string());

        let orchestrator = Orchestrator::with_credential(daemon.clone(), Some(credential()));
        let outcome = orchestrator
            .execute(&Pipeline::full(), &request_in(&temp))
            .await
            .unwrap();

        // 後片付けの失敗は記録されるだけで実行は成功
        assert!(!outcome.image_removed);
        assert!(outcome.container.is_some());
    }

    #[tokio::test]
    async fn test_pipeline_without_push_needs_no_credential() {
        let temp = TempDir::new().unwrap();
        let daemon = MockDaemon::default();
        *daemon.inner.images.lock().unwrap() = vec![ImageSummary::default()];

        let pipeline = Pipeline::new(vec![Step::Build, Step::Run]);
        let orchestrator = Orchestrator::new(daemon.clone());
        let outcome = orchestrator.execute(&pipeline, &request_in(&temp)).await.unwrap();

        assert!(outcome.container.is_some());
        let events = daemon.inner.events.lock().unwrap();
        assert_eq!(events.as_slice(), ["build", "list", "create", "start"]);
    }
}
