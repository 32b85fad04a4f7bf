// src/lib.rs

//! godeb
//!
//! Turns upstream Go release tarballs into Debian packages on the fly.
//!
//! # Architecture
//!
//! - `version`: ordering of upstream release identifiers
//! - `translate`: streaming tarball translation (path remap, MD5 manifest,
//!   installed size, `/usr/bin` symlinks)
//! - `deb`: control record and ar assembly of the final .deb
//! - `releases`, `dpkg`: thin glue to the download site and the package manager

pub mod arch;
pub mod config;
pub mod deb;
pub mod dpkg;
mod error;
pub mod releases;
pub mod translate;
pub mod version;

pub use config::Config;
pub use deb::{PackageBuilder, PackageSummary};
pub use error::{Error, Result};
pub use releases::{Release, ReleaseClient, ReleaseSource, SourceKind};
pub use translate::{Manifest, TarDialect, TranslateOptions, Translation, Translator};
pub use version::ReleaseVersion;
