// src/deb/mod.rs
//! DEB package assembly
//!
//! A .deb is an ar archive containing, in this order:
//! - debian-binary: version string "2.0\n"
//! - control.tar.gz: the `control` record and `md5sums`
//! - data.tar.gz: the translated upstream tree
//!
//! The data member is produced first (the control record needs the
//! installed size) and spooled to an anonymous temporary file, so the
//! upstream payload is never held in memory.

mod control;

pub use control::{debian_version, package_file_name, ControlFile, BUILD_SUFFIX, PACKAGE_NAME};

use crate::error::{Error, Result};
use crate::translate::{TarDialect, TranslateOptions, Translator};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tar::Builder as TarBuilder;
use tracing::{debug, info};

const DEBIAN_BINARY: &[u8] = b"2.0\n";
const MEMBER_MODE: u32 = 0o100644;

/// Summary of a written package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSummary {
    /// Sum of regular file sizes in the payload, in bytes
    pub installed_size: u64,
    /// Number of regular files in the payload
    pub file_count: usize,
    /// Size of the data.tar.gz member
    pub data_size: u64,
}

/// Builds a .deb for one upstream release
#[derive(Debug, Clone)]
pub struct PackageBuilder {
    version: String,
    go_arch: String,
    timestamp: u64,
    dialect: TarDialect,
}

impl PackageBuilder {
    /// Builder stamping everything it synthesizes with the current time
    pub fn new(version: impl Into<String>, go_arch: impl Into<String>) -> Self {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        Self {
            version: version.into(),
            go_arch: go_arch.into(),
            timestamp: now,
            dialect: TarDialect::default(),
        }
    }

    pub fn timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn dialect(mut self, dialect: TarDialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Conventional file name of the package
    pub fn file_name(&self) -> String {
        package_file_name(&self.version, &self.go_arch)
    }

    /// Translate `tarball` and write the complete .deb to `deb`
    pub fn build<R: Read, W: Write>(&self, tarball: R, deb: W) -> Result<PackageSummary> {
        let spool = tempfile::tempfile()
            .map_err(|e| Error::write("data.tar.gz spool file", e))?;
        let translator =
            Translator::new(TranslateOptions::new(self.timestamp).with_dialect(self.dialect));
        let translation = translator.translate(tarball, spool)?;

        let mut data = translation.output;
        let data_size = data
            .seek(SeekFrom::End(0))
            .and_then(|len| data.rewind().map(|()| len))
            .map_err(|e| Error::write("data.tar.gz spool file", e))?;

        let control = ControlFile {
            version: self.version.clone(),
            go_arch: self.go_arch.clone(),
            installed_size: translation.installed_size,
        };
        let control_tar_gz = self.control_archive(&control.render(), &translation.manifest.to_bytes())?;

        let mut archive = ar::Builder::new(deb);
        self.append_member(&mut archive, "debian-binary", DEBIAN_BINARY.len() as u64, DEBIAN_BINARY)
            .map_err(|e| Error::write("debian-binary to deb", e))?;
        self.append_member(
            &mut archive,
            "control.tar.gz",
            control_tar_gz.len() as u64,
            control_tar_gz.as_slice(),
        )
        .map_err(|e| Error::write("control.tar.gz to deb", e))?;
        self.append_member(&mut archive, "data.tar.gz", data_size, &mut data)
            .map_err(|e| Error::write("data.tar.gz to deb", e))?;

        info!(
            "Built {} ({} files, {} KiB installed)",
            self.file_name(),
            translation.manifest.len(),
            translation.installed_size / 1024
        );

        Ok(PackageSummary {
            installed_size: translation.installed_size,
            file_count: translation.manifest.len(),
            data_size,
        })
    }

    /// Build the package into `dir`, publishing it under its final name only on success
    ///
    /// The package is written to a temporary file in `dir` and renamed into
    /// place once complete; on failure the temporary file is removed.
    pub fn write_to_dir<R: Read>(&self, tarball: R, dir: &Path) -> Result<PathBuf> {
        let final_path = dir.join(self.file_name());
        let mut staging = tempfile::Builder::new()
            .prefix(&format!(".{}.", self.file_name()))
            .suffix(".inprogress")
            .tempfile_in(dir)
            .map_err(|e| Error::write(format!("temporary package in {}", dir.display()), e))?;
        debug!("Staging package at {}", staging.path().display());

        self.build(tarball, staging.as_file_mut())?;
        staging
            .as_file_mut()
            .flush()
            .and_then(|()| staging.as_file().sync_all())
            .map_err(|e| Error::write(format!("{}", staging.path().display()), e))?;
        staging
            .persist(&final_path)
            .map_err(|e| Error::write(format!("{}", final_path.display()), e.error))?;

        Ok(final_path)
    }

    /// Build control.tar.gz in memory
    fn control_archive(&self, control: &str, md5sums: &[u8]) -> Result<Vec<u8>> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut archive = TarBuilder::new(encoder);

        for (name, body) in [("control", control.as_bytes()), ("md5sums", md5sums)] {
            let mut header = tar::Header::new_gnu();
            header.set_entry_type(tar::EntryType::Regular);
            header.set_mode(0o644);
            header.set_uid(0);
            header.set_gid(0);
            header.set_size(body.len() as u64);
            header.set_mtime(self.timestamp);
            header.set_cksum();
            archive
                .append_data(&mut header, name, body)
                .map_err(|e| Error::write(format!("{name} file to control.tar.gz"), e))?;
        }

        let encoder = archive
            .into_inner()
            .map_err(|e| Error::write("end of control.tar.gz", e))?;
        encoder
            .finish()
            .map_err(|e| Error::write("gzip trailer of control.tar.gz", e))
    }

    fn append_member<W: Write, R: Read>(
        &self,
        archive: &mut ar::Builder<W>,
        name: &str,
        size: u64,
        body: R,
    ) -> std::io::Result<()> {
        let mut header = ar::Header::new(name.as_bytes().to_vec(), size);
        header.set_mtime(self.timestamp);
        header.set_uid(0);
        header.set_gid(0);
        header.set_mode(MEMBER_MODE);
        archive.append(&header, body)
    }
}
