use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use gadgets::{FetchRequest, FetchResponse, Fetcher, GadgetConfig, GadgetError, Gadgets};
use serde::Serialize;
use tracing::debug;
use url::Url;

/// Serves `file://` URLs from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileFetcher;

#[async_trait]
impl Fetcher for FileFetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, GadgetError> {
        if request.url.scheme() != "file" {
            return Err(GadgetError::transport(format!(
                "unsupported URL scheme '{}'",
                request.url.scheme()
            )));
        }
        let path = request
            .url
            .to_file_path()
            .map_err(|_| GadgetError::transport(format!("not a local path: {}", request.url)))?;
        debug!(path = %path.display(), "reading gadget document");
        match tokio::fs::read(&path).await {
            Ok(body) => Ok(FetchResponse::ok(body)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Ok(FetchResponse::with_status(404, ""))
            }
            Err(err) => Err(GadgetError::transport(format!(
                "read {}: {err}",
                path.display()
            ))),
        }
    }
}

/// Accept either a `file://` URL or a filesystem path.
pub fn target_url(target: &str) -> Result<Url> {
    if target.starts_with("file:") {
        let url = Url::parse(target).with_context(|| format!("parse URL {target}"))?;
        return Ok(url);
    }
    let path = Path::new(target);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .context("resolve current directory")?
            .join(path)
    };
    Url::from_file_path(&absolute).map_err(|_| anyhow!("cannot turn {} into a URL", absolute.display()))
}

pub fn load_config(path: Option<&PathBuf>) -> Result<GadgetConfig> {
    let Some(path) = path else {
        return Ok(GadgetConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    GadgetConfig::from_json_str(&text).with_context(|| format!("parse config {}", path.display()))
}

pub fn open_gadgets(config: GadgetConfig) -> Gadgets {
    Gadgets::new(Arc::new(FileFetcher), config)
}

/// Split a `name=value` user preference.
pub fn parse_pref(raw: &str) -> Result<(String, String)> {
    let Some((name, value)) = raw.split_once('=') else {
        bail!("user preference '{raw}' must look like name=value");
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("user preference '{raw}' has an empty name");
    }
    Ok((name.to_string(), value.to_string()))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serialise JSON output")?;
    println!("{text}");
    Ok(())
}
