// src/releases/mod.rs

//! Discovery of upstream Go releases
//!
//! Every configured source is fetched concurrently. The merge is
//! all-or-nothing: if any source fails (including a source that lists no
//! usable tarball) the whole listing fails. When two sources list the same
//! version, the one configured first wins.

mod client;
mod parse;

pub use client::{Download, ReleaseClient, DEFAULT_TIMEOUT};
pub use parse::{html_download_links, parse_url, releases_from_html, releases_from_json, resolve_link};

use crate::error::{Error, Result};
use crate::version::sort_newest_first;
use rayon::prelude::*;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::info;

/// Official download page
pub const DEFAULT_SOURCE_URL: &str = "https://golang.org/dl/";

/// A downloadable upstream release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub version: String,
    pub url: String,
}

/// How a source lists its downloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// HTML page with `<a class="download" href=...>` links
    #[default]
    Html,
    /// JSON index as served with `?mode=json`
    Json,
}

/// A place to look for releases
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseSource {
    pub url: String,
    #[serde(default)]
    pub kind: SourceKind,
}

impl Default for ReleaseSource {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            kind: SourceKind::Html,
        }
    }
}

/// Where listings come from; implemented over HTTP by [`ReleaseClient`]
pub trait ListingFetcher: Sync {
    fn fetch_listing(&self, url: &str) -> Result<String>;
}

impl ListingFetcher for ReleaseClient {
    fn fetch_listing(&self, url: &str) -> Result<String> {
        self.fetch_text(url)
    }
}

/// Releases available from one source, in page order
pub fn releases_from<F: ListingFetcher + ?Sized>(
    fetcher: &F,
    source: &ReleaseSource,
    go_arch: &str,
) -> Result<Vec<Release>> {
    let body = fetcher.fetch_listing(&source.url)?;
    let releases = match source.kind {
        SourceKind::Html => releases_from_html(&body, &source.url, go_arch),
        SourceKind::Json => releases_from_json(&body, &source.url, go_arch)?,
    };
    if releases.is_empty() {
        return Err(Error::NoReleases(source.url.clone()));
    }
    Ok(releases)
}

/// All releases from all sources, newest first
pub fn list_releases<F: ListingFetcher + ?Sized>(
    fetcher: &F,
    sources: &[ReleaseSource],
    go_arch: &str,
) -> Result<Vec<Release>> {
    if sources.is_empty() {
        return Err(Error::Config("no release sources configured".to_string()));
    }

    let results: Vec<Result<Vec<Release>>> = sources
        .par_iter()
        .map(|source| releases_from(fetcher, source, go_arch))
        .collect();

    let mut releases = Vec::new();
    let mut seen = HashSet::new();
    for result in results {
        releases.extend(result?.into_iter().filter(|r| seen.insert(r.version.clone())));
    }
    sort_newest_first(&mut releases, |r| r.version.as_str());

    info!("Found {} releases for linux-{}", releases.len(), go_arch);
    Ok(releases)
}

/// Find a release by its exact upstream version
pub fn find_release<'a>(releases: &'a [Release], version: &str) -> Option<&'a Release> {
    releases.iter().find(|r| r.version == version)
}

/// Source URLs joined for messages
pub fn describe_sources(sources: &[ReleaseSource]) -> String {
    sources
        .iter()
        .map(|s| s.url.as_str())
        .collect::<Vec<_>>()
        .join(" or ")
}
