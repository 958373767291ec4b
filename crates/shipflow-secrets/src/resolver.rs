//! 認証情報の解決フロー
//!
//! 認証方式の選択、ストアへの認証、シークレット読み出し、厳密デコード
//! までを1回の解決として実行します。解決結果は以後読み取り専用です。

use crate::credential::RegistryCredential;
use crate::error::SecretsResult;
use crate::store::{CONNECT_RETRY_COUNT, SecretStore};
use std::time::Duration;

/// ストアへの認証方式
///
/// 1回の解決で有効になるのはどちらか一方のみ。両方が設定されている
/// 場合の優先順位（静的トークン優先）は設定層で確定します。
#[derive(Clone)]
pub enum SecretAuthStrategy {
    /// 静的トークンをそのままセッションに設定
    StaticToken(String),
    /// userpassログインでセッショントークンを取得
    UsernamePassword { username: String, password: String },
}

impl std::fmt::Debug for SecretAuthStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // トークン・パスワードはログに出さない
        match self {
            SecretAuthStrategy::StaticToken(_) => f.write_str("StaticToken(***)"),
            SecretAuthStrategy::UsernamePassword { username, .. } => f
                .debug_struct("UsernamePassword")
                .field("username", username)
                .field("password", &"***")
                .finish(),
        }
    }
}

/// 認証情報の取得元
#[derive(Debug, Clone)]
pub enum CredentialSource {
    /// 認証情報なし（pushを含まないパイプライン向け）
    None,
    /// シークレットストアから解決
    SecretStore {
        address: String,
        strategy: SecretAuthStrategy,
        path: String,
    },
}

/// 認証情報リゾルバ
///
/// ストアはコンストラクタ注入です。解決結果はキャッシュしません。
pub struct CredentialResolver<S: SecretStore> {
    store: S,
}

impl<S: SecretStore> CredentialResolver<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// ストアに認証し、シークレットパスから認証情報バンドルを解決
    pub async fn resolve(
        &mut self,
        strategy: &SecretAuthStrategy,
        secret_path: &str,
    ) -> SecretsResult<RegistryCredential> {
        match strategy {
            SecretAuthStrategy::StaticToken(token) => {
                tracing::debug!("Using static token for secret store session");
                self.store.set_token(token);
            }
            SecretAuthStrategy::UsernamePassword { username, password } => {
                let token = self.login_with_retry(username, password).await?;
                self.store.set_token(&token);
            }
        }

        let bundle = self.store.read(secret_path).await?;
        let credential = RegistryCredential::from_bundle(&bundle)?;

        tracing::info!(registry = %credential.registry_url, "Resolved registry credential");

        Ok(credential)
    }

    /// ログイン交換
    ///
    /// 接続レベルの一時的な失敗のみリトライします。シークレット読み出しは
    /// リトライ対象外です。
    async fn login_with_retry(&self, username: &str, password: &str) -> SecretsResult<String> {
        let mut attempt = 0;
        loop {
            match self.store.login_userpass(username, password).await {
                Ok(token) => return Ok(token),
                Err(e) if e.is_transient() && attempt < CONNECT_RETRY_COUNT => {
                    attempt += 1;
                    tracing::warn!(
                        attempt = attempt,
                        max = CONNECT_RETRY_COUNT,
                        "Vault login failed with transient error, retrying: {}",
                        e
                    );
                    tokio::time::sleep(Duration::from_millis(500)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
