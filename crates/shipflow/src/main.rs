use clap::{Parser, Subcommand};
use colored::Colorize;
use shipflow::{Orchestrator, Pipeline, RunRequest, Step, resolve_credential};
use shipflow_container::HostBinding;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ship")]
#[command(about = "ビルドから起動まで。イメージのライフサイクルを一気通貫で。", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// イメージをビルドし、プッシュして、コンテナを起動
    Run {
        /// イメージ参照 (例: myorg/app:v1)
        #[arg(short, long)]
        image: String,
        /// Dockerfileのパス
        #[arg(short, long, default_value = "Dockerfile")]
        dockerfile: PathBuf,
        /// ビルドコンテキストのディレクトリ（省略時はDockerfileのみ）
        #[arg(short, long)]
        context: Option<PathBuf>,
        /// 起動するコンテナ名
        #[arg(short, long)]
        name: String,
        /// 公開するコンテナポート (例: 80/tcp)
        #[arg(long, default_value = "8080/tcp")]
        port: String,
        /// バインドするホストIP
        #[arg(long, default_value = "127.0.0.1")]
        host_ip: String,
        /// バインドするホストポート
        #[arg(long, default_value = "8080")]
        host_port: String,
        /// 環境変数 (KEY=VALUE、複数指定可)
        #[arg(short, long)]
        env: Vec<String>,
        /// レジストリへのプッシュをスキップ
        #[arg(long)]
        no_push: bool,
        /// コンテナ起動をスキップ
        #[arg(long)]
        no_run: bool,
        /// 実行後もローカルイメージを残す
        #[arg(long)]
        keep_image: bool,
    },
    /// バージョンを表示
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            image,
            dockerfile,
            context,
            name,
            port,
            host_ip,
            host_port,
            env,
            no_push,
            no_run,
            keep_image,
        } => {
            let mut pipeline = Pipeline::full();
            if no_push {
                pipeline = pipeline.without(Step::Push);
            }
            if no_run {
                pipeline = pipeline.without(Step::Run);
            }
            if keep_image {
                pipeline = pipeline.without(Step::RemoveImage);
            }

            // 認証情報はパイプライン開始前に1回だけ解決する
            let credential = if pipeline.contains(Step::Push) {
                let config = shipflow_config::Config::from_env();
                let source = config.credential_source()?;
                println!("{}", "Vaultから認証情報を解決中...".blue());
                resolve_credential(&source).await?
            } else {
                None
            };

            println!("{}", "Dockerに接続中...".blue());
            let docker = shipflow::docker::init_docker_with_error_handling().await?;

            let orchestrator = Orchestrator::with_credential(docker, credential);

            let request = RunRequest {
                image,
                dockerfile,
                context_dir: context,
                container_name: name,
                env,
                binding: HostBinding {
                    protocol_port: port,
                    host_ip,
                    host_port,
                },
            };

            let outcome = orchestrator.execute(&pipeline, &request).await?;

            println!();
            if let Some(container) = &outcome.container {
                let ip = container.ip().await.unwrap_or_default();
                if ip.is_empty() {
                    println!("{}", format!("✓ コンテナ {} が起動しました", container.id()).green().bold());
                } else {
                    println!(
                        "{}",
                        format!("✓ コンテナ {} が起動しました ({})", container.id(), ip)
                            .green()
                            .bold()
                    );
                }
            } else {
                println!("{}", "✓ 完了しました".green().bold());
            }

            Ok(())
        }
        Commands::Version => {
            println!("shipflow {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
