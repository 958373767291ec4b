use crate::error::{ImageError, ImageResult};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::path::{Path, PathBuf};
use tar::Builder;

/// イメージビルドの入力
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// ビルド結果に付けるイメージ名
    pub image_name: String,
    /// Dockerfileのパス（`context_dir` がある場合はそこからの相対）
    pub dockerfile_path: PathBuf,
    /// ビルドコンテキストのディレクトリ。省略時はDockerfileのみの
    /// コンテキストを合成する
    pub context_dir: Option<PathBuf>,
}

pub struct ContextArchiver;

impl ContextArchiver {
    /// ビルドコンテキストをtar.gzアーカイブとして作成
    ///
    /// `context_dir` が無い場合はDockerfileだけを含むアーカイブを合成
    /// します（エントリ名 = Dockerfileのパス、サイズ = 内容のバイト長）。
    /// ある場合はディレクトリツリー全体をアーカイブします。
    pub fn create(context: &BuildContext) -> ImageResult<Vec<u8>> {
        let mut archive_data = Vec::new();
        {
            let encoder = GzEncoder::new(&mut archive_data, Compression::default());
            let mut tar = Builder::new(encoder);

            match &context.context_dir {
                Some(dir) => {
                    tracing::debug!("Creating build context from: {}", dir.display());

                    // Dockerfileがコンテキスト内に存在することを確認
                    let dockerfile = dir.join(&context.dockerfile_path);
                    read_dockerfile(&dockerfile)?;

                    // コンテキストディレクトリを再帰的に追加
                    tar.append_dir_all(".", dir)
                        .map_err(|e| ImageError::ArchiveConstruction(e.to_string()))?;
                }
                None => {
                    // Dockerfile単体のコンテキストを合成
                    let content = read_dockerfile(&context.dockerfile_path)?;

                    let mut header = tar::Header::new_gnu();
                    header.set_path(&context.dockerfile_path).map_err(|e| {
                        ImageError::ArchiveConstruction(format!(
                            "Failed to set Dockerfile path: {}",
                            e
                        ))
                    })?;
                    header.set_size(content.len() as u64);
                    header.set_mode(0o644);
                    header.set_cksum();

                    tar.append(&header, &content[..])
                        .map_err(|e| ImageError::ArchiveConstruction(e.to_string()))?;
                }
            }

            tar.finish()
                .map_err(|e| ImageError::ArchiveConstruction(e.to_string()))?;
        }

        tracing::debug!("Build context created: {} bytes", archive_data.len());

        Self::check_context_size(archive_data.len());

        Ok(archive_data)
    }

    /// コンテキストサイズのチェックと警告
    fn check_context_size(size: usize) {
        const MAX_CONTEXT_SIZE: usize = 500 * 1024 * 1024; // 500MB

        if size > MAX_CONTEXT_SIZE {
            tracing::warn!(
                "警告: ビルドコンテキストが大きすぎます（{}MB）\n\
                 .dockerignoreファイルで不要なファイルを除外することを推奨します。",
                size / 1024 / 1024
            );
        }
    }
}

fn read_dockerfile(path: &Path) -> ImageResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| ImageError::DockerfileUnreadable {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
