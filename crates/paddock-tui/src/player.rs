//! Playback actions: mpv, custom commands, playlist download.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{bail, Context, Result};
use paddock_proto::api::CatalogApi;
use paddock_proto::platform;
use reqwest::Url;
use tokio::process::Command;
use tracing::{debug, info};

use crate::tree::{DownloadRequest, PlaybackContext};

/// Resolve the stream and hand it to mpv. mpv runs detached from the UI.
pub async fn play(api: &dyn CatalogApi, stream_id: &str, title: &str) -> Result<String> {
    let url = api
        .fetch_stream_url(stream_id)
        .await
        .context("failed to resolve stream")?;
    let mpv = platform::find_mpv_binary().context("mpv not found beside executable or on PATH")?;

    info!("playing {} with {}", title, mpv.display());
    Command::new(&mpv)
        .arg(&url)
        .arg(format!("--title={}", title))
        .arg("--quiet")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to start {}", mpv.display()))?;
    Ok(format!("Playing {}", title))
}

pub async fn stream_url(api: &dyn CatalogApi, stream_id: &str) -> Result<String> {
    api.fetch_stream_url(stream_id)
        .await
        .context("failed to resolve stream")
}

/// Run every command of a custom option in order, stopping at the first
/// failure.
pub async fn run_custom(api: &dyn CatalogApi, ctx: &PlaybackContext) -> Result<String> {
    let url = stream_url(api, &ctx.stream_id).await?;
    for command in &ctx.option.commands {
        let argv = substitute(command, &url, &ctx.title);
        let Some((program, args)) = argv.split_first() else {
            continue;
        };
        debug!("running {} {:?}", program, args);
        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .with_context(|| format!("failed to start {}", program))?;
        if !status.success() {
            bail!("{} exited with {}", program, status);
        }
    }
    Ok(format!("{}: done", ctx.option.title))
}

/// Save the stream's master playlist with every reference made absolute, so
/// the file plays from anywhere.
pub async fn download_playlist(
    api: &dyn CatalogApi,
    request: &DownloadRequest,
    dir: &Path,
) -> Result<PathBuf> {
    let url = stream_url(api, &request.stream_id).await?;
    let body = reqwest::get(&url)
        .await
        .context("failed to fetch playlist")?
        .error_for_status()
        .context("playlist request failed")?
        .text()
        .await
        .context("failed to read playlist")?;

    let base = Url::parse(&url).with_context(|| format!("invalid playlist URL {}", url))?;
    let playlist = absolutize_playlist(&body, &base);

    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(format!("{}.m3u8", sanitize_file_name(&request.title)));
    tokio::fs::write(&path, playlist)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!("saved playlist to {}", path.display());
    Ok(path)
}

/// Replace `$url` and `$title` in each argument.
pub fn substitute(command: &[String], url: &str, title: &str) -> Vec<String> {
    command
        .iter()
        .map(|arg| arg.replace("$url", url).replace("$title", title))
        .collect()
}

/// Resolve segment and `URI="..."` references against `base`, the URL the
/// playlist was fetched from. References that do not resolve are kept as is.
pub fn absolutize_playlist(body: &str, base: &Url) -> String {
    let absolute = |reference: &str| match base.join(reference) {
        Ok(url) => url.to_string(),
        Err(e) => {
            debug!("keeping unresolvable reference {:?}: {}", reference, e);
            reference.to_string()
        }
    };

    let mut out = String::with_capacity(body.len());
    for line in body.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            out.push_str(line);
        } else if !trimmed.starts_with('#') {
            out.push_str(&absolute(trimmed));
        } else if let Some(start) = trimmed.find("URI=\"") {
            let value_start = start + "URI=\"".len();
            match trimmed[value_start..].find('"') {
                Some(len) => {
                    let reference = &trimmed[value_start..value_start + len];
                    out.push_str(&trimmed[..value_start]);
                    out.push_str(&absolute(reference));
                    out.push_str(&trimmed[value_start + len..]);
                }
                None => out.push_str(trimmed),
            }
        } else {
            out.push_str(trimmed);
        }
        out.push('\n');
    }
    out
}

pub fn sanitize_file_name(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim().trim_matches('.');
    if cleaned.is_empty() {
        "stream".to_string()
    } else {
        cleaned.to_string()
    }
}
