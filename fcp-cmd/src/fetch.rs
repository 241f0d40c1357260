//! Startup loading of the four static artifacts.
//!
//! All artifacts are requested concurrently. Records and catalog are
//! required: if either is missing or unparseable the whole load fails with a
//! single error. Forecasts and boundaries are optional: a failure is logged
//! and the corresponding view renders an empty state. Nothing is retried.

use anyhow::Context;
use fcp_core::geo::RegionBoundaries;
use fcp_core::{FcpError, ForecastArtifact};
use fcp_store::loader::{decode_artifact, parse_boundaries, parse_forecasts};
use fcp_store::RecordStore;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DETAILED: &str = "detailed.json";
pub const AGGREGATED: &str = "aggregated.json";
pub const FORECASTS: &str = "forecasts.json";
pub const BOUNDARIES: &str = "regioes.geojson";

/// Where the artifacts are published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactSource {
    Directory(PathBuf),
    /// Base URL; artifact names are appended after a `/`.
    BaseUrl(String),
}

/// Everything loaded at startup.
#[derive(Debug)]
pub struct LoadedArtifacts {
    pub store: RecordStore,
    pub forecasts: Option<ForecastArtifact>,
    pub boundaries: Option<RegionBoundaries>,
}

/// Raw bytes of one artifact together with the name it was found under.
struct Fetched {
    name: String,
    bytes: Vec<u8>,
}

impl Fetched {
    fn text(&self) -> anyhow::Result<String> {
        Ok(decode_artifact(&self.name, &self.bytes)?)
    }
}

async fn read_from_directory(dir: &Path, name: &str) -> anyhow::Result<Fetched> {
    let plain = dir.join(name);
    let gzipped = dir.join(format!("{}.gz", name));
    let (path, name) = if tokio::fs::try_exists(&plain).await.unwrap_or(false) {
        (plain, name.to_string())
    } else if tokio::fs::try_exists(&gzipped).await.unwrap_or(false) {
        (gzipped, format!("{}.gz", name))
    } else {
        let missing = format!("{} not found in {}", name, dir.display());
        return Err(FcpError::MissingArtifact(missing).into());
    };
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(FcpError::from)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(Fetched { name, bytes })
}

async fn get_bytes(client: &reqwest::Client, url: &str) -> anyhow::Result<Vec<u8>> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("request to {} failed", url))?;
    if !response.status().is_success() {
        anyhow::bail!("{} returned {}", url, response.status());
    }
    Ok(response.bytes().await?.to_vec())
}

async fn read_from_url(
    client: &reqwest::Client,
    base_url: &str,
    name: &str,
) -> anyhow::Result<Fetched> {
    let url = format!("{}/{}", base_url.trim_end_matches('/'), name);
    match get_bytes(client, &url).await {
        Ok(bytes) => Ok(Fetched {
            name: name.to_string(),
            bytes,
        }),
        Err(plain_err) => {
            let gz_name = format!("{}.gz", name);
            let gz_url = format!("{}.gz", url);
            match get_bytes(client, &gz_url).await {
                Ok(bytes) => Ok(Fetched {
                    name: gz_name,
                    bytes,
                }),
                Err(_) => Err(plain_err),
            }
        }
    }
}

async fn fetch(
    source: &ArtifactSource,
    client: &reqwest::Client,
    name: &str,
) -> anyhow::Result<Fetched> {
    match source {
        ArtifactSource::Directory(dir) => read_from_directory(dir, name).await,
        ArtifactSource::BaseUrl(base_url) => read_from_url(client, base_url, name).await,
    }
}

fn optional<T>(
    name: &str,
    fetched: anyhow::Result<Fetched>,
    parse: impl FnOnce(&str) -> fcp_core::Result<T>,
) -> Option<T> {
    let result = fetched
        .and_then(|fetched| fetched.text())
        .and_then(|text| Ok(parse(&text)?));
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("{} unavailable, continuing without it: {:#}", name, e);
            None
        }
    }
}

/// Load every artifact from `source`.
pub async fn load_artifacts(source: &ArtifactSource) -> anyhow::Result<LoadedArtifacts> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(60))
        .build()?;

    info!("Loading artifacts from {:?}", source);
    let (detailed, aggregated, forecasts, boundaries) = tokio::join!(
        fetch(source, &client, DETAILED),
        fetch(source, &client, AGGREGATED),
        fetch(source, &client, FORECASTS),
        fetch(source, &client, BOUNDARIES),
    );

    let detailed =
        detailed.with_context(|| format!("required artifact {} could not be loaded", DETAILED))?;
    let aggregated = aggregated
        .with_context(|| format!("required artifact {} could not be loaded", AGGREGATED))?;
    let store = RecordStore::from_artifacts(
        (detailed.name.as_str(), detailed.bytes.as_slice()),
        (aggregated.name.as_str(), aggregated.bytes.as_slice()),
    )
    .context("required artifacts could not be parsed")?;

    let forecasts = optional(FORECASTS, forecasts, parse_forecasts);
    let boundaries = optional(BOUNDARIES, boundaries, parse_boundaries);

    info!(
        "Loaded {} records, forecasts {}, boundaries {}",
        store.len(),
        if forecasts.is_some() { "loaded" } else { "missing" },
        if boundaries.is_some() { "loaded" } else { "missing" },
    );
    Ok(LoadedArtifacts {
        store,
        forecasts,
        boundaries,
    })
}
