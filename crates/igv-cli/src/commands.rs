use crate::endpoint::EndpointPresigner;
use anyhow::{Context, Result};
use igv_resolver::ResolverCoordinator;
use igv_session::{JsonFileStore, LoadConfiguration, SessionState, SessionStore, WidgetConfig};
use igv_uri::classify;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// One line per input; returns the report and whether every input classified
pub fn classify_all<'a>(inputs: impl IntoIterator<Item = &'a str>) -> (String, bool) {
    let mut report = String::new();
    let mut all_ok = true;
    for input in inputs {
        match classify(input) {
            Ok(id) => report.push_str(&format!("{input}\t{id}\n")),
            Err(e) => {
                all_ok = false;
                report.push_str(&format!("{input}\terror: {e}\n"));
            }
        }
    }
    (report, all_ok)
}

pub fn read_configuration(path: &Path) -> Result<LoadConfiguration> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not a load configuration", path.display()))
}

pub async fn resolve_file(path: &Path, presigner: EndpointPresigner) -> Result<LoadConfiguration> {
    let config = read_configuration(path)?;
    tracing::info!(
        path = %path.display(),
        protected = config.protected_field_count(),
        "Resolving configuration"
    );
    let resolved = ResolverCoordinator::new(Arc::new(presigner))
        .resolve(&config)
        .await
        .context("Resolution failed")?;
    Ok(resolved)
}

pub fn open_session(path: &Path, config: &WidgetConfig) -> SessionStore {
    SessionStore::from_config(Some(Arc::new(JsonFileStore::new(path))), config)
}

pub fn show_session(store: &SessionStore) -> Result<String> {
    let config = match store.try_load()? {
        Some(config) => config,
        None => {
            tracing::info!(key = store.key(), "No stored session, showing default");
            store.default_configuration()
        }
    };
    Ok(serde_json::to_string_pretty(&config)?)
}

pub fn import_session(store: &SessionStore, path: &Path) -> Result<()> {
    let config = read_configuration(path)?;
    let state = SessionState::try_from(&config)?;
    store.try_save(state)?;
    tracing::info!(key = store.key(), "Session imported");
    Ok(())
}

pub fn reset_session(store: &SessionStore) -> Result<()> {
    store.clear()?;
    tracing::info!(key = store.key(), "Session cleared");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, text: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn classify_reports_each_input() {
        let (report, ok) = classify_all(["https://b1.s3.amazonaws.com/k1", "not-a-url"]);
        assert!(!ok);
        let lines: Vec<_> = report.lines().collect();
        assert_eq!(lines[0], "https://b1.s3.amazonaws.com/k1\ts3://b1/k1");
        assert!(lines[1].starts_with("not-a-url\terror:"));
    }

    #[tokio::test]
    async fn resolves_flagged_fields_only() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "config.json",
            r#"{
                "genome": "hg38",
                "tracks": [
                    { "name": "public", "url": "https://example.org/genes.bed" },
                    { "name": "sample", "url": "s3://lab/sample.bam", "isPresignedURL": true }
                ]
            }"#,
        );

        let resolved = resolve_file(&path, EndpointPresigner::default()).await.unwrap();
        assert_eq!(resolved.tracks[0].url, "https://example.org/genes.bed");
        assert_eq!(resolved.tracks[1].url, "https://lab.s3.amazonaws.com/sample.bam");
    }

    #[tokio::test]
    async fn malformed_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bad.json", "[1, 2]");
        let err = resolve_file(&path, EndpointPresigner::default()).await.unwrap_err();
        assert!(err.to_string().contains("not a load configuration"));
    }

    #[test]
    fn import_show_reset() {
        let dir = TempDir::new().unwrap();
        let store = open_session(&dir.path().join("state/session.json"), &WidgetConfig::default());

        let shown: LoadConfiguration = serde_json::from_str(&show_session(&store).unwrap()).unwrap();
        assert_eq!(shown, LoadConfiguration::for_genome("hg38"));

        let source = write(
            &dir,
            "saved.json",
            r#"{ "reference": { "id": "custom", "fastaURL": "https://x/ref.fa", "locus": "chr1:1-5" } }"#,
        );
        import_session(&store, &source).unwrap();
        let shown = show_session(&store).unwrap();
        assert!(shown.contains("\"custom\""));
        assert!(!shown.contains("chr1:1-5"));

        reset_session(&store).unwrap();
        let shown: LoadConfiguration = serde_json::from_str(&show_session(&store).unwrap()).unwrap();
        assert_eq!(shown, store.default_configuration());
    }
}
