use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use image::DynamicImage;
use reqwest::Client;
use thiserror::Error;

use crate::ident::{FILE_ID_LEN, nano_id};
use crate::ui::UiSink;

/// How a download attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// A tier succeeded and the file is on disk.
    Saved(PathBuf),
    /// Every automatic tier failed; the user received manual instructions.
    ManualFallback,
}

/// Failure of a single fallback tier. Logged as a diagnostic, never shown
/// to the user until all tiers exhaust.
#[derive(Debug, Error)]
enum TierError {
    #[error("network fetch failed (status {0})")]
    FetchStatus(u16),

    #[error("network fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("no rendered copy of the result is available")]
    NoRenderedCopy,

    #[error("png encode failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Materializes a remote result as a locally saved file via an ordered
/// fallback chain:
///
/// 1. fetch the exact bytes over the network;
/// 2. re-encode an already-decoded copy of the result as PNG;
/// 3. hand the user explicit instructions plus the original URL.
///
/// Tier 1 preserves exact bytes when permitted; tier 2 recovers pixel data
/// when the raw fetch is blocked but a rendered copy exists; tier 3
/// guarantees the user is never left without a path to the asset.
pub struct DownloadManager {
    client: Client,
}

impl DownloadManager {
    pub fn new() -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(120))
            .build()
            .expect("failed to build HTTP client");
        Self { client }
    }

    /// Try each tier in order; a tier runs only if the prior one failed.
    pub async fn download(
        &self,
        url: &str,
        rendered: Option<&DynamicImage>,
        dest_dir: &Path,
        sink: &dyn UiSink,
    ) -> DownloadOutcome {
        match self.fetch_bytes(url, dest_dir).await {
            Ok(path) => return DownloadOutcome::Saved(path),
            Err(err) => eprintln!("  direct fetch failed, trying re-encode: {err}"),
        }

        match reencode_rendered(rendered, dest_dir) {
            Ok(path) => return DownloadOutcome::Saved(path),
            Err(err) => eprintln!("  re-encode failed: {err}"),
        }

        sink.guidance(&format!(
            "Automatic download failed. Open this URL in a browser and save the image manually:\n    {url}"
        ));
        DownloadOutcome::ManualFallback
    }

    /// Fetch the result for display and decode it.
    ///
    /// Best-effort: any failure yields `None`. The decoded copy is what
    /// makes the tier-2 fallback possible later.
    pub async fn fetch_rendered(&self, url: &str) -> Option<DynamicImage> {
        let response = self.client.get(url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        let bytes = response.bytes().await.ok()?;
        image::load_from_memory(&bytes).ok()
    }

    /// Tier 1: retrieve the exact bytes and persist them.
    async fn fetch_bytes(&self, url: &str, dest_dir: &Path) -> Result<PathBuf, TierError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TierError::FetchStatus(status.as_u16()));
        }
        let bytes = response.bytes().await?;
        persist_bytes(&bytes, dest_dir)
    }
}

impl Default for DownloadManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Tier 2: re-encode the decoded copy as PNG and persist it.
fn reencode_rendered(
    rendered: Option<&DynamicImage>,
    dest_dir: &Path,
) -> Result<PathBuf, TierError> {
    let img = rendered.ok_or(TierError::NoRenderedCopy)?;
    let mut buf = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)?;
    persist_bytes(&buf, dest_dir)
}

/// Write bytes to a temporary file in the destination directory, then
/// persist it under a generated name. The temporary handle only goes away
/// once the save is durable.
fn persist_bytes(bytes: &[u8], dest_dir: &Path) -> Result<PathBuf, TierError> {
    let dest = dest_dir.join(format!("vector-art-{}.png", nano_id(FILE_ID_LEN)));
    let mut tmp = tempfile::NamedTempFile::new_in(dest_dir)?;
    tmp.write_all(bytes)?;
    tmp.persist(&dest).map_err(|e| TierError::Io(e.error))?;
    Ok(dest)
}
