//! シークレットストアへの接続と読み出し
//!
//! 実装は vaultrs クライアントをラップします。ワイヤプロトコルは
//! 再実装しません。テストではモック実装に差し替えます。

use crate::error::{SecretsError, SecretsResult};
use serde_json::Value;
use std::time::Duration;
use vaultrs::client::{Client, VaultClient, VaultClientSettingsBuilder};

/// 接続タイムアウト（秒）
pub const CONNECT_TIMEOUT_SECS: u64 = 60;

/// 接続レベルの一時的な失敗に対するリトライ回数
pub const CONNECT_RETRY_COUNT: u32 = 2;

/// シークレットストアのトレイト
///
/// 認証（トークン設定 / userpassログイン）とシークレット読み出しのみを
/// 公開します。
#[allow(async_fn_in_trait)]
pub trait SecretStore {
    /// セッショントークンを直接設定
    fn set_token(&mut self, token: &str);

    /// userpassログインでセッショントークンを取得
    async fn login_userpass(&self, username: &str, password: &str) -> SecretsResult<String>;

    /// シークレットパスからkey/valueバンドルを読み出し
    async fn read(&self, path: &str) -> SecretsResult<Value>;
}

/// HashiCorp Vaultをバックエンドとするシークレットストア
pub struct VaultStore {
    client: VaultClient,
}

impl VaultStore {
    /// Vaultクライアントを構築
    ///
    /// タイムアウトは60秒。接続自体は遅延され、最初のリクエスト時に
    /// 確立されます。
    pub fn connect(address: &str) -> SecretsResult<Self> {
        let settings = VaultClientSettingsBuilder::default()
            .address(address)
            .timeout(Some(Duration::from_secs(CONNECT_TIMEOUT_SECS)))
            .build()
            .map_err(|e| SecretsError::StoreUnreachable(e.to_string()))?;

        let client =
            VaultClient::new(settings).map_err(|e| SecretsError::StoreUnreachable(e.to_string()))?;

        Ok(Self { client })
    }
}

impl SecretStore for VaultStore {
    fn set_token(&mut self, token: &str) {
        self.client.set_token(token);
    }

    async fn login_userpass(&self, username: &str, password: &str) -> SecretsResult<String> {
        tracing::debug!(username = %username, "Logging in to Vault via userpass");

        let auth = vaultrs::auth::userpass::login(&self.client, "userpass", username, password)
            .await
            .map_err(|e| map_client_error(e, "userpass login"))?;

        Ok(auth.client_token)
    }

    async fn read(&self, path: &str) -> SecretsResult<Value> {
        let (mount, rest) = split_secret_path(path)?;

        tracing::debug!(path = %path, "Reading secret bundle");

        let bundle: Value = vaultrs::kv1::get(&self.client, mount, rest)
            .await
            .map_err(|e| map_client_error(e, path))?;

        Ok(bundle)
    }
}

/// シークレットパスをマウントと残りに分割
///
/// 例: `secret/registry` -> (`secret`, `registry`)
///     `secret/data/registry` -> (`secret`, `data/registry`)
fn split_secret_path(path: &str) -> SecretsResult<(&str, &str)> {
    let trimmed = path.trim_start_matches('/');
    match trimmed.split_once('/') {
        Some((mount, rest)) if !mount.is_empty() && !rest.is_empty() => Ok((mount, rest)),
        _ => Err(SecretsError::InvalidSecretPath(path.to_string())),
    }
}

fn map_client_error(err: vaultrs::error::ClientError, context: &str) -> SecretsError {
    use vaultrs::error::ClientError;

    match &err {
        ClientError::APIError { code: 404, .. } => {
            SecretsError::SecretNotFound(context.to_string())
        }
        ClientError::APIError { code, errors } if *code == 401 || *code == 403 => {
            SecretsError::AuthenticationFailed(errors.join(", "))
        }
        ClientError::APIError { code, errors } => SecretsError::Api {
            code: *code,
            message: errors.join(", "),
        },
        _ => SecretsError::StoreUnreachable(err.to_string()),
    }
}
