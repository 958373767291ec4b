//! ShipFlow の設定管理
//!
//! 環境変数からVault接続設定を読み込み、認証情報の取得元
//! （`CredentialSource`）を導出します。
//!
//! ## 環境変数
//!
//! - `VAULT_URL` — Vaultのアドレス。未設定ならシークレットストアは使わない
//! - `VAULT_APP_TOKEN` — 静的トークン（設定されていれば常に優先）
//! - `VAULT_USERNAME` / `VAULT_PASSWORD` — userpassログイン
//! - `VAULT_PATH` — レジストリ認証情報のシークレットパス

pub mod error;

pub use error::*;

use shipflow_secrets::{CredentialSource, SecretAuthStrategy};

/// 環境から読み込んだ設定
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub vault_url: Option<String>,
    pub vault_app_token: Option<String>,
    pub vault_username: Option<String>,
    pub vault_password: Option<String>,
    pub vault_path: Option<String>,
}

impl Config {
    /// 環境変数から設定を読み込み
    pub fn from_env() -> Self {
        Self {
            vault_url: env_non_empty("VAULT_URL"),
            vault_app_token: env_non_empty("VAULT_APP_TOKEN"),
            vault_username: env_non_empty("VAULT_USERNAME"),
            vault_password: env_non_empty("VAULT_PASSWORD"),
            vault_path: env_non_empty("VAULT_PATH"),
        }
    }

    /// 認証情報の取得元を導出
    ///
    /// `VAULT_URL` が無ければ `CredentialSource::None`。ある場合は
    /// 認証方式が必要で、静的トークンとuserpassの両方が設定されて
    /// いれば静的トークンが優先されます。どちらも無ければ
    /// `NoCredentialStrategy` で即座に失敗します。
    pub fn credential_source(&self) -> Result<CredentialSource> {
        let Some(address) = &self.vault_url else {
            return Ok(CredentialSource::None);
        };

        let path = self
            .vault_path
            .clone()
            .ok_or(ConfigError::MissingSecretPath)?;

        let strategy = match (&self.vault_app_token, &self.vault_username, &self.vault_password) {
            // 静的トークンが常に優先
            (Some(token), _, _) => SecretAuthStrategy::StaticToken(token.clone()),
            (None, Some(username), Some(password)) => SecretAuthStrategy::UsernamePassword {
                username: username.clone(),
                password: password.clone(),
            },
            (None, Some(_), None) => {
                return Err(ConfigError::IncompleteUserPass("VAULT_USERNAME".to_string()));
            }
            (None, None, Some(_)) => {
                return Err(ConfigError::IncompleteUserPass("VAULT_PASSWORD".to_string()));
            }
            (None, None, None) => return Err(ConfigError::NoCredentialStrategy),
        };

        Ok(CredentialSource::SecretStore {
            address: address.clone(),
            strategy,
            path,
        })
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}
