use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "認証方式が設定されていません。以下のいずれかを設定してください:\n\
        - VAULT_APP_TOKEN（静的トークン）\n\
        - VAULT_USERNAME と VAULT_PASSWORD（userpassログイン）"
    )]
    NoCredentialStrategy,

    #[error("VAULT_USERNAME と VAULT_PASSWORD は両方設定してください（{0} のみが設定されています）")]
    IncompleteUserPass(String),

    #[error("VAULT_URL が設定されていますが VAULT_PATH がありません")]
    MissingSecretPath,
}

pub type Result<T> = std::result::Result<T, ConfigError>;
