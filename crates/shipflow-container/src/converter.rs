//! ContainerSpec から Docker API パラメータへの変換

// Bollard 0.19.4 の非推奨APIを一時的に使用
#![allow(deprecated)]

use crate::spec::ContainerSpec;
use bollard::container::{Config, CreateContainerOptions};
use bollard::models::{HostConfig, PortBinding};
use std::collections::HashMap;

/// ContainerSpecをDockerのコンテナ設定に変換
///
/// 指定されたポートのみを公開し、ホストIPとホストポートに
/// バインドします。privilegedにはしません。
pub fn spec_to_container_config(
    spec: &ContainerSpec,
) -> (Config<String>, CreateContainerOptions<String>) {
    // ポートバインディングの設定
    let mut port_bindings = HashMap::new();
    let mut exposed_ports = HashMap::new();

    exposed_ports.insert(spec.binding.protocol_port.clone(), HashMap::new());

    port_bindings.insert(
        spec.binding.protocol_port.clone(),
        Some(vec![PortBinding {
            host_ip: Some(spec.binding.host_ip.clone()),
            host_port: Some(spec.binding.host_port.clone()),
        }]),
    );

    let host_config = Some(HostConfig {
        port_bindings: Some(port_bindings),
        publish_all_ports: Some(true),
        privileged: Some(false),
        ..Default::default()
    });

    let config = Config {
        image: Some(spec.image.clone()),
        env: Some(spec.env.clone()),
        exposed_ports: Some(exposed_ports),
        host_config,
        ..Default::default()
    };

    let options = CreateContainerOptions {
        name: spec.name.clone(),
        platform: None,
    };

    (config, options)
}
