//! レジストリ認証情報のBollard形式への変換

use bollard::auth::DockerCredentials;
use shipflow_secrets::RegistryCredential;

/// 解決済みの認証情報をpush用の `DockerCredentials` に変換
///
/// `registry_url` が空でないことはデコード時に検証済みです。
pub fn registry_credentials(credential: &RegistryCredential) -> DockerCredentials {
    DockerCredentials {
        username: Some(credential.username.clone()),
        password: Some(credential.password.clone()),
        serveraddress: Some(credential.registry_url.clone()),
        ..Default::default()
    }
}
