//! HEAD probe for the total size.

use anyhow::{Context, Result};
use std::str;
use std::time::Duration;

/// What a segmented download needs to know before planning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadInfo {
    /// Total size in bytes, if `Content-Length` is present.
    pub content_length: Option<u64>,
    /// True if the server sent `Accept-Ranges: bytes`.
    pub accept_ranges: bool,
}

/// Performs a HEAD request (following redirects) and parses the headers that matter.
/// Blocking; call from `spawn_blocking` in async code.
pub fn probe(url: &str) -> Result<HeadInfo> {
    let mut lines: Vec<String> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url).context("invalid URL")?;
    easy.nobody(true)?;
    easy.follow_location(true)?;
    easy.connect_timeout(Duration::from_secs(15))?;
    easy.timeout(Duration::from_secs(30))?;

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                lines.push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.perform().context("HEAD request failed")?;
    }

    let code = easy.response_code().context("no response code")?;
    if !(200..300).contains(&code) {
        anyhow::bail!("HEAD {} returned HTTP {}", url, code);
    }

    Ok(parse_headers(&lines))
}

/// Later header blocks (after redirects) override earlier ones.
fn parse_headers(lines: &[String]) -> HeadInfo {
    let mut info = HeadInfo {
        content_length: None,
        accept_ranges: false,
    };
    for line in lines {
        let Some((name, value)) = line.trim().split_once(':') else {
            continue;
        };
        let (name, value) = (name.trim(), value.trim());
        if name.eq_ignore_ascii_case("content-length") {
            if let Ok(n) = value.parse::<u64>() {
                info.content_length = Some(n);
            }
        } else if name.eq_ignore_ascii_case("accept-ranges") {
            info.accept_ranges = value.eq_ignore_ascii_case("bytes");
        }
    }
    info
}
