// src/commands/mod.rs
//! Command handlers for the godeb CLI

mod package;
mod progress;

pub use package::{cmd_download, cmd_from_tarball, cmd_install};

use anyhow::{Context, Result};
use godeb::releases::{self, Release, ReleaseClient};
use godeb::{arch, dpkg, Config};
use std::path::Path;

/// State shared by all commands: configuration plus the target architecture
pub struct Session {
    pub config: Config,
    pub go_arch: String,
}

impl Session {
    pub fn new(config_path: Option<&Path>, arch_override: Option<String>) -> Result<Self> {
        let config = Config::load(config_path).context("Failed to load configuration")?;
        let go_arch = arch_override.unwrap_or_else(|| arch::host_go_arch().to_string());
        Ok(Self { config, go_arch })
    }

    pub fn client(&self) -> Result<ReleaseClient> {
        ReleaseClient::new(self.config.timeout()).context("Failed to create HTTP client")
    }

    /// All releases for the target architecture, newest first
    pub fn releases(&self, client: &ReleaseClient) -> Result<Vec<Release>> {
        let releases = releases::list_releases(client, &self.config.sources, &self.go_arch)
            .context("Failed to list Go releases")?;
        Ok(releases)
    }
}

/// Print every available version, newest first
pub fn cmd_list(session: &Session) -> Result<()> {
    let client = session.client()?;
    for release in session.releases(&client)? {
        println!("{}", release.version);
    }
    Ok(())
}

/// Purge the installed go package
pub fn cmd_remove() -> Result<()> {
    dpkg::remove()?;
    Ok(())
}
