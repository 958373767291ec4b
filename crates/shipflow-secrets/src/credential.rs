//! レジストリ認証情報バンドルのデコード
//!
//! Vaultから返るバンドルは型のないkey/valueマップです。ここでは
//! フィールドの存在と型を明示的に検証し、欠落や型違いは
//! `CredentialDecode` エラーとして返します（ゼロ値での継続はしません）。

use crate::error::{SecretsError, SecretsResult};
use serde_json::Value;

/// レジストリへのpush/pullに使う認証情報
///
/// 厳密なデコードを通過した場合のみ生成されます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryCredential {
    pub username: String,
    pub password: String,
    pub registry_url: String,
}

impl RegistryCredential {
    /// Vaultのシークレットバンドルからデコード
    ///
    /// 対応する形式:
    /// - フラット形式 (KV v1): `{"username": .., "password": .., "registry_url": ..}`
    /// - バージョン付き形式 (KV v2): `{"data": {..}, "metadata": {..}}`
    ///
    /// それ以外の形式は `UnexpectedSecretShape` になります。
    pub fn from_bundle(bundle: &Value) -> SecretsResult<Self> {
        let map = bundle.as_object().ok_or_else(|| {
            SecretsError::UnexpectedSecretShape(format!(
                "オブジェクトではありません ({})",
                type_name(bundle)
            ))
        })?;

        // KV v2はペイロードが "data" の下にもう一段ネストされる
        let payload = match map.get("data") {
            Some(Value::Object(inner)) => inner,
            Some(other) => {
                return Err(SecretsError::UnexpectedSecretShape(format!(
                    "'data' がオブジェクトではありません ({})",
                    type_name(other)
                )));
            }
            None => map,
        };

        let username = require_string(payload, "username")?;
        let password = require_string(payload, "password")?;
        let registry_url = require_string(payload, "registry_url")?;

        if registry_url.is_empty() {
            return Err(SecretsError::decode("registry_url", "が空です"));
        }

        Ok(Self {
            username,
            password,
            registry_url,
        })
    }
}

fn require_string(payload: &serde_json::Map<String, Value>, field: &str) -> SecretsResult<String> {
    match payload.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(SecretsError::decode(
            field,
            &format!("は文字列ではありません ({})", type_name(other)),
        )),
        None => Err(SecretsError::decode(field, "がありません")),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
