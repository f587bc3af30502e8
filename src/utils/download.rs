use std::cmp::min;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use reqwest::blocking::{Client, ClientBuilder};
use reqwest::header::USER_AGENT;
use sha2::{Digest, Sha256};
use url::Url;

fn client_builder() -> ClientBuilder {
    Client::builder()
        .connect_timeout(Duration::from_secs(30))
        .connection_verbose(false)
}

/// Convinent struct with methods that are useful to indicate download progress.
pub struct DownloadIndicator<T: Sized> {
    /// A start/initializing function which will be called once before downloading.
    pub start: fn(u64, &str) -> Result<T>,
    /// A update function that will be called after each downloaded chunk.
    pub update: fn(&T, u64),
    /// A function that will be called once after a successful download.
    pub stop: fn(&T),
}

pub struct DownloadOpt<T: Sized> {
    /// The verbose name of the file to download.
    pub name: String,
    client: Client,
    pub handler: Option<DownloadIndicator<T>>,
}

impl<T: Sized> DownloadOpt<T> {
    pub fn new(name: String, handler: Option<DownloadIndicator<T>>) -> Result<Self> {
        let client = client_builder().build()?;
        Ok(Self {
            name,
            client,
            handler,
        })
    }

    /// Download `url` into `path`, returning the hex encoded SHA-256 of the written bytes.
    ///
    /// `file://` urls are copied instead.
    pub fn download_file(&self, url: &Url, path: &Path) -> Result<String> {
        if url.scheme() == "file" {
            let src = url
                .to_file_path()
                .map_err(|_| anyhow!("unable to convert to file path for url '{}'", url.as_str()))?;
            fs::copy(&src, path).with_context(|| {
                format!("failed to copy '{}' to '{}'", src.display(), path.display())
            })?;
            return sha256_of_file(path);
        }

        let mut resp = self
            .client
            .get(url.as_ref())
            .header(USER_AGENT, env!("CARGO_PKG_NAME"))
            .send()
            .with_context(|| format!("failed to request '{}'", url.as_str()))?;
        let status = resp.status();
        if !status.is_success() {
            bail!(
                "failed to receive server response when downloading '{}': {status}",
                self.name
            );
        }
        // Source archives from code hosting sites are often sent without a length.
        let total_size = resp.content_length().unwrap_or_default();

        let maybe_indicator = self
            .handler
            .as_ref()
            .and_then(|h| (h.start)(total_size, &self.name).ok().map(|i| (h, i)));

        let mut file = File::create(path)
            .with_context(|| format!("unable to create file '{}'", path.display()))?;
        let mut hasher = Sha256::new();
        let mut downloaded_len: u64 = 0;
        let mut buffer = vec![0u8; 65535];

        loop {
            let bytes_read = io::Read::read(&mut resp, &mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            downloaded_len += bytes_read as u64;
            if let Some((handler, indicator)) = &maybe_indicator {
                let pos = if total_size > 0 {
                    min(downloaded_len, total_size)
                } else {
                    downloaded_len
                };
                (handler.update)(indicator, pos);
            }
            hasher.update(&buffer[..bytes_read]);
            file.write_all(&buffer[..bytes_read])?;
        }

        if let Some((handler, indicator)) = &maybe_indicator {
            (handler.stop)(indicator);
        }
        Ok(hex::encode(hasher.finalize()))
    }
}

/// Compute the hex encoded SHA-256 checksum of a file.
pub fn sha256_of_file(path: &Path) -> Result<String> {
    let mut file =
        File::open(path).with_context(|| format!("unable to open '{}'", path.display()))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

pub mod cli {
    use std::path::Path;

    use super::{DownloadIndicator, DownloadOpt, Result};
    use indicatif::{ProgressBar, ProgressState, ProgressStyle};
    use url::Url;

    /// Create a new progress bar to indicate download progress.
    pub fn progress_bar_indicator() -> DownloadIndicator<ProgressBar> {
        fn start(total: u64, name: &str) -> Result<ProgressBar> {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::with_template(
                    "{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({eta})"
                )?
                .with_key("eta", |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                    _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
                })
                .progress_chars("#>-")
            );
            pb.set_message(format!("Downloading '{name}'"));
            Ok(pb)
        }
        fn update(pb: &ProgressBar, pos: u64) {
            if pb.length().unwrap_or_default() < pos {
                pb.set_length(pos);
            }
            pb.set_position(pos);
        }
        fn stop(pb: &ProgressBar) {
            pb.finish_with_message("Download finished");
        }

        DownloadIndicator {
            start,
            update,
            stop,
        }
    }

    /// Download a file with a progress bar, returning its SHA-256 checksum.
    pub fn download<S: ToString>(name: S, url: &Url, dest: &Path) -> Result<String> {
        let dl_opt = DownloadOpt::new(name.to_string(), Some(progress_bar_indicator()))?;
        dl_opt.download_file(url, dest)
    }
}
