// src/deb/control.rs

//! The `control` metadata record and Debian version naming

use crate::arch::debian_arch;

/// Name of the generated package
pub const PACKAGE_NAME: &str = "go";

/// Build identifier appended to every package version
pub const BUILD_SUFFIX: &str = "-godeb1";

const MAINTAINER: &str = "Gustavo Niemeyer <niemeyer@canonical.com>";
const HOMEPAGE: &str = "http://golang.org";
const DESCRIPTION: &str = "\
Go language compiler and tools (gc)
 The Go programming language is an open source project to make programmers
 more productive. Go is expressive, concise, clean, and efficient.
 Its concurrency mechanisms make it easy to write programs that get the
 most out of multicore and networked machines, while its novel type system
 enables flexible and modular program construction. Go compiles quickly to
 machine code yet has the convenience of garbage collection and the power
 of run-time reflection. It's a fast, statically typed, compiled language
 that feels like a dynamically typed, interpreted language.
";

/// Pre-release markers that must sort before the final release in dpkg
const PRERELEASE_TAGS: [&str; 2] = ["rc", "beta"];

/// Debian version for an upstream release version
///
/// The first `rc`/`beta` marker with digits on both sides gets a `~` in
/// front of it so dpkg orders it before the final release:
/// `1.2rc3` becomes `1.2~rc3-godeb1`.
pub fn debian_version(version: &str) -> String {
    let bytes = version.as_bytes();
    let digit_at = |i: usize| bytes.get(i).is_some_and(u8::is_ascii_digit);

    for tag in PRERELEASE_TAGS {
        if let Some(i) = version.find(tag)
            && i > 0
            && digit_at(i - 1)
            && digit_at(i + tag.len())
        {
            return format!("{}~{}{}", &version[..i], &version[i..], BUILD_SUFFIX);
        }
    }
    format!("{version}{BUILD_SUFFIX}")
}

/// File name of the package for a release
pub fn package_file_name(version: &str, go_arch: &str) -> String {
    format!(
        "{}_{}_{}.deb",
        PACKAGE_NAME,
        debian_version(version),
        debian_arch(go_arch)
    )
}

/// The `control` file of a translated release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlFile {
    /// Upstream release version
    pub version: String,
    /// Go architecture identifier
    pub go_arch: String,
    /// Installed size in bytes
    pub installed_size: u64,
}

impl ControlFile {
    pub fn render(&self) -> String {
        format!(
            "Package: {PACKAGE_NAME}\n\
             Version: {}\n\
             Architecture: {}\n\
             Maintainer: {MAINTAINER}\n\
             Installed-Size: {}\n\
             Conflicts: golang-go, golang, golang-stable, golang-tip, golang-weekly\n\
             Replaces: golang-go\n\
             Provides: golang-go\n\
             Section: devel\n\
             Priority: extra\n\
             Homepage: {HOMEPAGE}\n\
             Description: {DESCRIPTION}",
            debian_version(&self.version),
            debian_arch(&self.go_arch),
            self.installed_size / 1024,
        )
    }
}
