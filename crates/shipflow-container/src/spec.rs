//! 起動するコンテナの形

/// ホスト側へのポートバインディング
///
/// `protocol_port` はポート番号とトランスポートの両方を含みます
/// （例: `"8080/tcp"`）。
#[derive(Debug, Clone)]
pub struct HostBinding {
    pub protocol_port: String,
    pub host_ip: String,
    pub host_port: String,
}

/// 起動するコンテナの仕様
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    /// `KEY=VALUE` 形式の環境変数（順序維持）
    pub env: Vec<String>,
    pub binding: HostBinding,
}

impl ContainerSpec {
    pub fn new(name: &str, image: &str, env: Vec<String>, binding: HostBinding) -> Self {
        Self {
            name: name.to_string(),
            image: image.to_string(),
            env,
            binding,
        }
    }
}
