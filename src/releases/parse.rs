// src/releases/parse.rs

//! Extraction of release tarballs from download listings

use super::Release;
use crate::error::{Error, Result};
use regex::Regex;
use reqwest::Url;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::LazyLock;

static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script>").expect("valid regex"));
static ANCHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<a\s[^>]*>").expect("valid regex"));
static CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)\bclass\s*=\s*["']([^"']*)["']"#).expect("valid regex"));
static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)\bhref\s*=\s*["']([^"']*)["']"#).expect("valid regex"));

/// Recognize an upstream Linux tarball URL for `go_arch`
///
/// URLs look like `https://.../go1.1beta2.linux-amd64.tar.gz`; the version
/// is what lies between `go` and the `.linux-<arch>.tar.gz` suffix.
pub fn parse_url(url: &str, go_arch: &str) -> Option<Release> {
    let file_name = url.rsplit('/').next()?;
    let bytes = file_name.as_bytes();
    if bytes.len() < 3 || !file_name.starts_with("go") || !(b'1'..=b'9').contains(&bytes[2]) {
        return None;
    }

    let suffix = format!(".linux-{go_arch}.tar.gz");
    let version = file_name.strip_suffix(&suffix)?.get(2..)?;
    if version.is_empty() {
        return None;
    }
    Some(Release {
        version: version.to_string(),
        url: url.to_string(),
    })
}

/// Resolve a link found on `source_url` to an absolute URL
pub fn resolve_link(source_url: &str, href: &str) -> Option<String> {
    let base = Url::parse(source_url).ok()?;
    base.join(href.trim()).ok().map(String::from)
}

/// `href` values of every download anchor (`class` containing `download`)
pub fn html_download_links(html: &str) -> Vec<String> {
    let html = SCRIPT_RE.replace_all(html, "");
    ANCHOR_RE
        .find_iter(&html)
        .filter(|tag| {
            CLASS_RE
                .captures(tag.as_str())
                .is_some_and(|c| c[1].split_whitespace().any(|class| class == "download"))
        })
        .filter_map(|tag| HREF_RE.captures(tag.as_str()).map(|c| c[1].to_string()))
        .collect()
}

/// Releases linked from an HTML download page
pub fn releases_from_html(html: &str, source_url: &str, go_arch: &str) -> Vec<Release> {
    let links = html_download_links(html)
        .into_iter()
        .filter_map(|href| resolve_link(source_url, &href));
    unique_releases(links, go_arch)
}

#[derive(Debug, Deserialize)]
struct JsonRelease {
    #[serde(default)]
    files: Vec<JsonFile>,
}

#[derive(Debug, Deserialize)]
struct JsonFile {
    filename: String,
    #[serde(default)]
    os: String,
    #[serde(default)]
    arch: String,
    #[serde(default)]
    kind: String,
}

/// Releases listed in the JSON download index (`?mode=json`)
pub fn releases_from_json(body: &str, source_url: &str, go_arch: &str) -> Result<Vec<Release>> {
    let index: Vec<JsonRelease> = serde_json::from_str(body)
        .map_err(|e| Error::Parse(format!("release index from {source_url}: {e}")))?;

    let links = index
        .iter()
        .flat_map(|release| &release.files)
        .filter(|f| f.os == "linux" && f.arch == go_arch && f.kind == "archive")
        .filter_map(|f| resolve_link(source_url, &f.filename));
    Ok(unique_releases(links, go_arch))
}

fn unique_releases(links: impl Iterator<Item = String>, go_arch: &str) -> Vec<Release> {
    let mut seen = HashSet::new();
    links
        .filter_map(|url| parse_url(&url, go_arch))
        .filter(|release| seen.insert(release.version.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<html><head>
<script>var x = '<a class="download" href="/dl/go9.9.linux-amd64.tar.gz">';</script>
</head><body>
<a class="download downloadBox" href="/dl/go1.21.5.linux-amd64.tar.gz">Linux</a>
<a class="download" href="//dl.example.com/go1.21rc2.linux-amd64.tar.gz">rc</a>
<a href="/dl/go1.20.linux-amd64.tar.gz">not a download anchor</a>
<a class="download" href="/dl/go1.21.5.linux-amd64.tar.gz">duplicate</a>
<a class="download" href="/dl/go1.21.5.linux-arm64.tar.gz">other arch</a>
<a class="download" href="/dl/go1.21.5.src.tar.gz">source</a>
</body></html>
"#;

    #[test]
    fn test_parse_url() {
        let release = parse_url("https://dl.google.com/go/go1.1beta2.linux-amd64.tar.gz", "amd64").unwrap();
        assert_eq!(release.version, "1.1beta2");

        assert!(parse_url("https://x/go1.2.linux-386.tar.gz", "amd64").is_none());
        assert!(parse_url("https://x/go1.2.darwin-amd64.tar.gz", "amd64").is_none());
        assert!(parse_url("https://x/gox.linux-amd64.tar.gz", "amd64").is_none());
        assert!(parse_url("https://x/go0.1.linux-amd64.tar.gz", "amd64").is_none());
    }

    #[test]
    fn test_resolve_link() {
        let base = "https://golang.org/dl/";
        assert_eq!(
            resolve_link(base, "/dl/go1.2.linux-amd64.tar.gz").as_deref(),
            Some("https://golang.org/dl/go1.2.linux-amd64.tar.gz")
        );
        assert_eq!(
            resolve_link(base, "//storage.example.com/go1.2.linux-amd64.tar.gz").as_deref(),
            Some("https://storage.example.com/go1.2.linux-amd64.tar.gz")
        );
        assert_eq!(
            resolve_link("https://go.dev/dl/?mode=json", "go1.2.linux-amd64.tar.gz").as_deref(),
            Some("https://go.dev/dl/go1.2.linux-amd64.tar.gz")
        );
    }

    #[test]
    fn test_releases_from_html() {
        let releases = releases_from_html(PAGE, "https://golang.org/dl/", "amd64");
        let versions: Vec<&str> = releases.iter().map(|r| r.version.as_str()).collect();
        assert_eq!(versions, vec!["1.21.5", "1.21rc2"]);
        assert_eq!(releases[0].url, "https://golang.org/dl/go1.21.5.linux-amd64.tar.gz");
        assert_eq!(releases[1].url, "https://dl.example.com/go1.21rc2.linux-amd64.tar.gz");
    }

    #[test]
    fn test_releases_from_json() {
        let body = r#"[
            {"version": "go1.21.5", "stable": true, "files": [
                {"filename": "go1.21.5.linux-amd64.tar.gz", "os": "linux", "arch": "amd64", "kind": "archive"},
                {"filename": "go1.21.5.linux-amd64.msi", "os": "linux", "arch": "amd64", "kind": "installer"},
                {"filename": "go1.21.5.src.tar.gz", "os": "", "arch": "", "kind": "source"}
            ]},
            {"version": "go1.20", "stable": true, "files": [
                {"filename": "go1.20.linux-amd64.tar.gz", "os": "linux", "arch": "amd64", "kind": "archive"}
            ]}
        ]"#;
        let releases = releases_from_json(body, "https://go.dev/dl/?mode=json&include=all", "amd64").unwrap();
        let versions: Vec<&str> = releases.iter().map(|r| r.version.as_str()).collect();
        assert_eq!(versions, vec!["1.21.5", "1.20"]);
        assert_eq!(releases[1].url, "https://go.dev/dl/go1.20.linux-amd64.tar.gz");
    }

    #[test]
    fn test_releases_from_bad_json() {
        let err = releases_from_json("<html>", "https://go.dev/dl/?mode=json", "amd64").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
