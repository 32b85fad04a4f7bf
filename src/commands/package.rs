// src/commands/package.rs
//! Building and installing packages

use super::progress::download_bar;
use super::Session;
use anyhow::{bail, Context, Result};
use godeb::deb::debian_version;
use godeb::releases::{self, Release};
use godeb::{dpkg, Error, PackageBuilder};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Build a package for `version` (or the newest release) without installing it
pub fn cmd_download(session: &Session, version: Option<&str>) -> Result<()> {
    package_release(session, version, false)
}

/// Build and install a package for `version` (or the newest release)
pub fn cmd_install(session: &Session, version: Option<&str>) -> Result<()> {
    package_release(session, version, true)
}

/// Build a package from a local tarball, installing it unless `no_install`
pub fn cmd_from_tarball(session: &Session, tarball: &Path, version: &str, no_install: bool) -> Result<()> {
    check_tarball_name(tarball, version)?;
    let file = File::open(tarball)
        .with_context(|| format!("Unable to open tarball {}", tarball.display()))?;
    build_and_install(session, version, file, !no_install)
}

fn package_release(session: &Session, version: Option<&str>, install: bool) -> Result<()> {
    let client = session.client()?;
    let releases = session.releases(&client)?;
    let release = select_release(&releases, version, session)?;

    match dpkg::installed_version() {
        Ok(installed) => {
            debug!("Installed go package version: {}", installed);
            if install && installed == debian_version(&release.version) {
                return Err(Error::AlreadyInstalled(release.version.clone()).into());
            }
        }
        Err(e) if e.is_not_installed() => {}
        Err(e) => return Err(e).context("Failed to query installed go version"),
    }

    println!("processing {}", release.url);
    let download = client.open(&release.url)?;
    let bar = download_bar(download.length);
    let reader = bar.wrap_read(download.response);
    let result = build_and_install(session, &release.version, reader, install);
    bar.finish_and_clear();
    result
}

fn select_release<'a>(releases: &'a [Release], version: Option<&str>, session: &Session) -> Result<&'a Release> {
    let release = match version {
        Some(version) => releases::find_release(releases, version).ok_or_else(|| Error::VersionNotFound {
            version: version.to_string(),
            sources: releases::describe_sources(&session.config.sources),
        })?,
        None => releases
            .first()
            .ok_or_else(|| Error::NoReleases(releases::describe_sources(&session.config.sources)))?,
    };
    info!("Selected go {} from {}", release.version, release.url);
    Ok(release)
}

fn build_and_install<R: Read>(session: &Session, version: &str, tarball: R, install: bool) -> Result<()> {
    let builder = PackageBuilder::new(version, session.go_arch.as_str()).dialect(session.config.tar_dialect);
    let path = builder
        .write_to_dir(tarball, &session.config.output_dir)
        .with_context(|| format!("Failed to build package for go {version}"))?;
    println!("{}", ready_message(&path));

    if install {
        dpkg::install(&path)?;
    }
    Ok(())
}

/// The tarball's file name must mention the version it is packaged as
fn check_tarball_name(tarball: &Path, version: &str) -> Result<()> {
    let name = tarball
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    if !name.contains(&format!("{version}.")) {
        bail!(
            "tarball {} does not appear to correspond to version {}",
            tarball.display(),
            version
        );
    }
    Ok(())
}

fn ready_message(path: &Path) -> String {
    format!("package {} ready", display_path(path).display())
}

fn display_path(path: &Path) -> PathBuf {
    path.strip_prefix(".").map(Path::to_path_buf).unwrap_or_else(|_| path.to_path_buf())
}
