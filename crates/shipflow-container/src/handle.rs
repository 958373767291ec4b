//! 起動済みコンテナへのハンドル

use crate::api::ContainerApi;
use crate::error::{ContainerError, ContainerResult};

/// 停止時の猶予時間（秒）
pub const STOP_TIMEOUT_SECS: i64 = 100;

/// 起動済みコンテナへの生きた参照
///
/// `stop_and_remove` が成功した後は使用できません。
pub struct ContainerHandle<C: ContainerApi> {
    api: C,
    id: String,
}

impl<C: ContainerApi> ContainerHandle<C> {
    pub fn new(api: C, id: String) -> Self {
        Self { api, id }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// コンテナのプライマリIPアドレスを取得
    ///
    /// ネットワーク設定が無い場合は空文字列を返します（エラーでは
    /// ありません）。
    pub async fn ip(&self) -> ContainerResult<String> {
        let inspected = self.api.inspect_container(&self.id).await?;

        if let Some(settings) = inspected.network_settings
            && let Some(ip) = settings.ip_address
        {
            return Ok(ip);
        }

        Ok(String::new())
    }

    /// コンテナを停止してから削除（ボリューム込み）
    ///
    /// 停止に失敗した場合は削除を試みません。
    pub async fn stop_and_remove(&self) -> ContainerResult<()> {
        self.api
            .stop_container(&self.id, STOP_TIMEOUT_SECS)
            .await
            .map_err(|e| ContainerError::StopFailed {
                id: self.id.clone(),
                message: e.to_string(),
            })?;

        self.api
            .remove_container(&self.id, true)
            .await
            .map_err(|e| ContainerError::RemoveFailed {
                id: self.id.clone(),
                message: e.to_string(),
            })?;

        tracing::info!(id = %self.id, "Container stopped and removed");
        Ok(())
    }
}
