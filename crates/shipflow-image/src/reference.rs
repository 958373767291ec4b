//! イメージ参照のパース

/// `repository[:tag]` 形式のイメージ参照
///
/// タグが無い場合は `latest` になります。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    pub repository: String,
    pub tag: String,
}

impl ImageReference {
    /// イメージ参照文字列をパース
    ///
    /// # Examples
    /// - `ghcr.io/org/app:v1.0` -> `{repository: "ghcr.io/org/app", tag: "v1.0"}`
    /// - `repo/name` -> `{repository: "repo/name", tag: "latest"}`
    /// - `localhost:5000/app` -> `{repository: "localhost:5000/app", tag: "latest"}`
    pub fn parse(reference: &str) -> Self {
        // 最後の : を探す
        if let Some(pos) = reference.rfind(':') {
            let potential_tag = &reference[pos + 1..];
            let potential_repo = &reference[..pos];

            // タグか、レジストリのポート番号かを判定
            // ポート番号の場合: localhost:5000/app (タグなし)
            // タグの場合: ghcr.io/org/app:v1.0
            //
            // ポート番号は / を含まない純粋な数字
            if !potential_tag.contains('/') && !potential_tag.chars().all(|c| c.is_ascii_digit()) {
                return Self {
                    repository: potential_repo.to_string(),
                    tag: potential_tag.to_string(),
                };
            }
        }

        Self {
            repository: reference.to_string(),
            tag: "latest".to_string(),
        }
    }

    /// `repository:tag` 形式の完全な参照
    pub fn qualified(&self) -> String {
        format!("{}:{}", self.repository, self.tag)
    }
}

impl std::fmt::Display for ImageReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}
