use thiserror::Error;

#[derive(Debug, Error)]
pub enum SecretsError {
    #[error(
        "Vaultに接続できません: {0}\n\nヒント:\n  • VAULT_URL が正しいか確認してください\n  • Vaultサーバーが起動しているか確認してください"
    )]
    StoreUnreachable(String),

    #[error("Vault認証に失敗しました: {0}")]
    AuthenticationFailed(String),

    #[error("シークレットが見つかりません: {0}")]
    SecretNotFound(String),

    #[error("シークレットパスが不正です: {0} (例: secret/registry)")]
    InvalidSecretPath(String),

    #[error("シークレットの形式が想定外です: {0}")]
    UnexpectedSecretShape(String),

    #[error("認証情報のデコードに失敗: フィールド '{field}' {reason}")]
    CredentialDecode { field: String, reason: String },

    #[error("Vault APIエラー ({code}): {message}")]
    Api { code: u16, message: String },
}

impl SecretsError {
    pub(crate) fn decode(field: &str, reason: &str) -> Self {
        SecretsError::CredentialDecode {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    /// 接続レベルの一時的な失敗かどうか
    pub fn is_transient(&self) -> bool {
        matches!(self, SecretsError::StoreUnreachable(_))
    }
}

pub type SecretsResult<T> = std::result::Result<T, SecretsError>;
