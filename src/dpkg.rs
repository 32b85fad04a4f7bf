// src/dpkg.rs

//! Install state and package installation through dpkg
//!
//! A missing `dpkg-query` is not an error for callers that only want to
//! know what is installed: packages can still be built without dpkg, so it
//! maps to [`Error::NotInstalled`].

use crate::deb::PACKAGE_NAME;
use crate::error::{Error, Result};
use std::path::Path;
use std::process::Command;
use tracing::debug;

const STATUS_FORMAT: &str = "${db:Status-Abbrev}${source:Version}";

/// Version of the installed go package, or [`Error::NotInstalled`]
pub fn installed_version() -> Result<String> {
    if which::which("dpkg-query").is_err() {
        debug!("dpkg-query not found, treating go as not installed");
        return Err(Error::NotInstalled);
    }

    let output = Command::new("dpkg-query")
        .args(["-f", STATUS_FORMAT, "-W", PACKAGE_NAME])
        .env("LC_ALL", "C")
        .env("LANG", "C")
        .env("LANGUAGE", "C")
        .output()
        .map_err(|e| Error::ToolMissing {
            tool: "dpkg-query".to_string(),
            message: e.to_string(),
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let combined = format!("{}{}", stdout, stderr);
        return Err(query_failure(&output.status.to_string(), combined.trim()));
    }
    parse_status(&stdout)
}

/// Interpret `${db:Status-Abbrev}${source:Version}` output
pub fn parse_status(output: &str) -> Result<String> {
    output
        .strip_prefix("ii ")
        .map(|version| version.trim().to_string())
        .ok_or(Error::NotInstalled)
}

fn query_failure(status: &str, output: &str) -> Error {
    if output.to_lowercase().contains("no packages found") {
        return Error::NotInstalled;
    }
    let mut message = format!("while querying for installed go package version: {status}");
    if !output.is_empty() {
        message.push_str(": ");
        message.push_str(output);
    }
    Error::Command(message)
}

/// Install a package file with `dpkg -i`
pub fn install(package: &Path) -> Result<()> {
    let package = package.to_string_lossy();
    run_privileged(&["dpkg", "-i", &package])
        .map_err(|e| Error::Command(format!("while installing go package: {e}")))
}

/// Purge the go package with `dpkg --purge`
pub fn remove() -> Result<()> {
    run_privileged(&["dpkg", "--purge", PACKAGE_NAME])
        .map_err(|e| Error::Command(format!("while removing go package: {e}")))
}

/// Command line for `args`, through sudo unless already root
pub fn privileged_args<'a>(args: &[&'a str], is_root: bool) -> Vec<&'a str> {
    let mut full = Vec::with_capacity(args.len() + 1);
    if !is_root {
        full.push("sudo");
    }
    full.extend_from_slice(args);
    full
}

fn run_privileged(args: &[&str]) -> std::result::Result<(), String> {
    let argv = privileged_args(args, nix::unistd::geteuid().is_root());
    debug!("Running {:?}", argv);

    let status = Command::new(argv[0])
        .args(&argv[1..])
        .status()
        .map_err(|e| format!("cannot run {}: {e}", argv[0]))?;
    if status.success() {
        Ok(())
    } else {
        Err(status.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_installed() {
        assert_eq!(parse_status("ii 1.2~rc3-godeb1").unwrap(), "1.2~rc3-godeb1");
    }

    #[test]
    fn test_parse_status_not_installed() {
        assert!(parse_status("un ").unwrap_err().is_not_installed());
        assert!(parse_status("rc 1.1-godeb1").unwrap_err().is_not_installed());
        assert!(parse_status("").unwrap_err().is_not_installed());
    }

    #[test]
    fn test_query_failure_classification() {
        let err = query_failure("exit status: 1", "dpkg-query: no packages found matching go");
        assert!(err.is_not_installed());

        let err = query_failure("exit status: 2", "database is locked");
        assert_eq!(
            err.to_string(),
            "while querying for installed go package version: exit status: 2: database is locked"
        );
    }

    #[test]
    fn test_privileged_args() {
        assert_eq!(
            privileged_args(&["dpkg", "--purge", "go"], false),
            vec!["sudo", "dpkg", "--purge", "go"]
        );
        assert_eq!(privileged_args(&["dpkg", "-i", "x.deb"], true), vec!["dpkg", "-i", "x.deb"]);
    }
}
