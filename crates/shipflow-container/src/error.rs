use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContainerError {
    #[error(
        "イメージ '{image}' を取得できません: {message}\n\nヒント:\n  • イメージ名とタグを確認してください\n  • レジストリにアクセスできるか確認してください"
    )]
    ImageUnavailable { image: String, message: String },

    #[error("コンテナ '{container}' の作成に失敗しました: {message}")]
    CreateFailed { container: String, message: String },

    #[error("コンテナ '{container}' の起動に失敗しました: {message}")]
    StartFailed { container: String, message: String },

    #[error("コンテナ '{id}' の停止に失敗しました: {message}")]
    StopFailed { id: String, message: String },

    #[error("コンテナ '{id}' の削除に失敗しました: {message}")]
    RemoveFailed { id: String, message: String },

    #[error("Docker APIエラー: {0}")]
    DockerApi(String),
}

impl From<bollard::errors::Error> for ContainerError {
    fn from(err: bollard::errors::Error) -> Self {
        ContainerError::DockerApi(err.to_string())
    }
}

pub type ContainerResult<T> = std::result::Result<T, ContainerError>;
