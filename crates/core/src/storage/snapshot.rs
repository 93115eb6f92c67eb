use crate::domain::snapshot::Snapshot;
use anyhow::Context;
use std::io::ErrorKind;
use std::path::Path;

/// Read and normalize the snapshot file. Always reads from disk so that a snapshot replaced by the
/// producing pipeline shows up on the next render pass.
///
/// `Ok(None)` when the file does not exist; an unreadable or malformed file is an error.
pub async fn load_snapshot(path: &Path) -> anyhow::Result<Option<Snapshot>> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read snapshot {}", path.display()))
        }
    };
    let snapshot = Snapshot::from_json_str(&text)
        .with_context(|| format!("failed to parse snapshot {}", path.display()))?;
    Ok(Some(snapshot))
}

/// Stylesheet contents, or `None` when it is missing or unreadable.
pub async fn load_stylesheet(path: &Path) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(css) => Some(css),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "stylesheet unreadable; rendering unstyled");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_file(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("watchboard-{}-{name}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("snapshot.json");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn missing_file_is_none() {
        let path = std::env::temp_dir().join("watchboard-does-not-exist/snapshot.json");
        assert!(load_snapshot(&path).await.unwrap().is_none());
        assert!(load_stylesheet(&path).await.is_none());
    }

    #[tokio::test]
    async fn reads_fresh_on_every_call() {
        let path = scratch_file("fresh", r#"{"meta": {"updated_at": "first"}}"#);
        let first = load_snapshot(&path).await.unwrap().unwrap();
        assert_eq!(first.meta.updated_at_display(), "first");

        std::fs::write(&path, r#"{"meta": {"updated_at": "second"}}"#).unwrap();
        let second = load_snapshot(&path).await.unwrap().unwrap();
        assert_eq!(second.meta.updated_at_display(), "second");
    }

    #[tokio::test]
    async fn bundled_sample_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/snapshot.json");
        let snapshot = load_snapshot(&path).await.unwrap().unwrap();
        assert_eq!(snapshot.focus_view_model.len(), 3);
        assert_eq!(snapshot.table_view_model.len(), 3);
        assert!(snapshot.focus_view_model.iter().any(|i| i.ticker == "TSLA"));
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let path = scratch_file("malformed", "{ truncated");
        assert!(load_snapshot(&path).await.is_err());
    }
}
