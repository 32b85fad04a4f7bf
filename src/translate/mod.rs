// src/translate/mod.rs

//! Upstream tarball to Debian data member translation
//!
//! Reads a gzip-compressed upstream Go release tarball (a single top-level
//! `go/` directory) and writes a gzip-compressed tar laid out under
//! `/usr/local/go`, plus three symlinks in `/usr/bin`. While copying, the
//! translator sums the size of every regular file and records its MD5 digest.
//!
//! The input is read exactly once, sequentially, and file bodies are streamed
//! from input to output while being hashed; nothing is buffered beyond the
//! compression layers.

mod header;
mod manifest;

pub use header::{EntryMeta, TarDialect};
pub use manifest::{HashingReader, Manifest, ManifestEntry};

use crate::error::{Error, Result};
use flate2::read::MultiGzDecoder;
use flate2::Compression;
use header::DataArchive;
use std::io::{self, BufRead, BufReader, Read, Write};
use tar::{Archive, EntryType};
use tracing::{debug, info};

/// Name of the single top-level directory of upstream tarballs
pub const TOP_LEVEL_DIR: &str = "go";

/// Prefix the top-level directory is moved under
pub const INSTALL_PREFIX: &str = "./usr/local/";

/// Tools linked into `/usr/bin`
pub const BINARY_LINKS: [&str; 3] = ["go", "gofmt", "godoc"];

/// Top-level build artifacts shipped by some releases (1.11.5)
const SKIPPED_PREFIXES: [&str; 2] = ["gocache/", "tmp/"];

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Kinds of upstream entries the translator accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
}

impl EntryKind {
    /// Classify a tar entry type; `None` for anything unsupported
    pub fn classify(entry_type: EntryType) -> Option<Self> {
        match entry_type {
            EntryType::Regular | EntryType::Continuous => Some(Self::File),
            EntryType::Directory => Some(Self::Directory),
            EntryType::Symlink => Some(Self::Symlink),
            _ => None,
        }
    }
}

/// Settings fixed for the lifetime of a [`Translator`]
#[derive(Debug, Clone)]
pub struct TranslateOptions {
    /// Timestamp for the synthesized `/usr/bin` symlinks
    pub mtime: u64,
    pub dialect: TarDialect,
    pub compression: Compression,
}

impl TranslateOptions {
    pub fn new(mtime: u64) -> Self {
        Self {
            mtime,
            dialect: TarDialect::default(),
            compression: Compression::default(),
        }
    }

    pub fn with_dialect(mut self, dialect: TarDialect) -> Self {
        self.dialect = dialect;
        self
    }
}

/// Outcome of a successful translation
#[derive(Debug)]
pub struct Translation<W> {
    /// The output stream, positioned after the gzip trailer
    pub output: W,
    pub manifest: Manifest,
    /// Sum of the sizes of all regular files, in bytes
    pub installed_size: u64,
}

/// Upstream tarball translator
#[derive(Debug, Clone)]
pub struct Translator {
    options: TranslateOptions,
}

impl Translator {
    pub fn new(options: TranslateOptions) -> Self {
        Self { options }
    }

    /// Translate `input` into a data member written to `output`
    ///
    /// Fails on the first problem; whatever was written to `output` by then
    /// is incomplete and must be discarded by the caller.
    pub fn translate<R: Read, W: Write>(&self, input: R, output: W) -> Result<Translation<W>> {
        let mut input = BufReader::new(input);
        let head = input.fill_buf().map_err(Error::ReadSource)?;
        if !head.starts_with(&GZIP_MAGIC) {
            return Err(Error::Uncompress(io::Error::new(
                io::ErrorKind::InvalidData,
                "missing gzip header",
            )));
        }

        let mut archive = Archive::new(MultiGzDecoder::new(input));
        let entries = archive.entries().map_err(Error::ReadSource)?;

        let mut data = DataArchive::new(output, self.options.dialect, self.options.compression);
        let mut manifest = Manifest::default();
        let mut installed_size: u64 = 0;
        let mut first = true;

        for entry in entries {
            let mut entry = entry.map_err(Error::ReadSource)?;
            let entry_type = entry.header().entry_type();
            if entry_type == EntryType::XGlobalHeader {
                debug!("Ignoring global pax header");
                continue;
            }

            let raw_name = entry.path().map_err(Error::ReadSource)?.to_string_lossy().into_owned();
            let name = clean_name(&raw_name);
            let meta = EntryMeta::from_header(entry.header()).map_err(Error::ReadSource)?;

            if name.is_empty() && entry_type == EntryType::Directory {
                debug!("Skipping archive root entry {}", raw_name);
                continue;
            }

            if first {
                first = false;
                if !is_top_level_dir(name) {
                    let root = format!("{INSTALL_PREFIX}{TOP_LEVEL_DIR}/");
                    debug!("Synthesizing {}", root);
                    data.append_directory(&root, &EntryMeta::synthesized(0o755, meta.mtime))?;
                }
            }
            if SKIPPED_PREFIXES.iter().any(|p| name.starts_with(p)) {
                debug!("Skipping build artifact {}", name);
                continue;
            }

            let kind = EntryKind::classify(entry_type).ok_or_else(|| Error::UnsupportedEntry {
                path: name.to_string(),
                kind: format!("{entry_type:?}"),
            })?;
            let path = remap(name, kind).ok_or_else(|| Error::UnexpectedLayout(name.to_string()))?;

            match kind {
                EntryKind::Directory => data.append_directory(&path, &meta)?,
                EntryKind::Symlink => {
                    let target = entry
                        .link_name()
                        .map_err(Error::ReadSource)?
                        .ok_or_else(|| {
                            Error::ReadSource(io::Error::new(
                                io::ErrorKind::InvalidData,
                                format!("symlink {name} has no target"),
                            ))
                        })?
                        .to_string_lossy()
                        .into_owned();
                    data.append_symlink(&path, &target, &meta)?;
                }
                EntryKind::File => {
                    let size = entry.size();
                    installed_size = add_installed_size(installed_size, size, name)?;
                    let mut body = HashingReader::new(&mut entry);
                    data.append_file(&path, &meta, size, &mut body)?;
                    manifest.push(body.hex_digest(), path.trim_start_matches("./"));
                }
            }
        }

        let link_meta = EntryMeta::synthesized(0o777, self.options.mtime);
        for tool in BINARY_LINKS {
            let name = format!("./usr/bin/{tool}");
            let target = format!("/usr/local/{TOP_LEVEL_DIR}/bin/{tool}");
            data.append_symlink(&name, &target, &link_meta)?;
        }

        let output = data.finish()?;
        info!(
            "Translated {} files ({} bytes installed)",
            manifest.len(),
            installed_size
        );

        Ok(Translation {
            output,
            manifest,
            installed_size,
        })
    }
}

/// Add a file's declared size to the running total
fn add_installed_size(total: u64, size: u64, name: &str) -> Result<u64> {
    total.checked_add(size).ok_or_else(|| {
        Error::ReadSource(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("declared size of {name} overflows the installed size"),
        ))
    })
}

/// Strip leading `.` and `/` characters from an upstream entry name
pub fn clean_name(name: &str) -> &str {
    name.trim_start_matches(['.', '/'])
}

fn is_top_level_dir(name: &str) -> bool {
    name == TOP_LEVEL_DIR || name.strip_prefix(TOP_LEVEL_DIR) == Some("/")
}

/// Move a cleaned upstream name under the install prefix
///
/// Returns `None` when the name lies outside the top-level directory.
pub fn remap(name: &str, kind: EntryKind) -> Option<String> {
    let inside = name
        .strip_prefix(TOP_LEVEL_DIR)
        .is_some_and(|rest| rest.starts_with('/'));
    if !inside && !(kind == EntryKind::Directory && name == TOP_LEVEL_DIR) {
        return None;
    }

    let mut path = format!("{INSTALL_PREFIX}{name}");
    if kind == EntryKind::Directory && !path.ends_with('/') {
        path.push('/');
    }
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("./go/bin/go"), "go/bin/go");
        assert_eq!(clean_name("go/bin/go"), "go/bin/go");
        assert_eq!(clean_name("/go/"), "go/");
    }

    #[test]
    fn test_remap_file_and_directory() {
        assert_eq!(
            remap("go/bin/go", EntryKind::File).as_deref(),
            Some("./usr/local/go/bin/go")
        );
        assert_eq!(
            remap("go/src", EntryKind::Directory).as_deref(),
            Some("./usr/local/go/src/")
        );
        assert_eq!(
            remap("go/src/", EntryKind::Directory).as_deref(),
            Some("./usr/local/go/src/")
        );
        assert_eq!(
            remap("go", EntryKind::Directory).as_deref(),
            Some("./usr/local/go/")
        );
    }

    #[test]
    fn test_remap_rejects_foreign_paths() {
        assert_eq!(remap("other/file", EntryKind::File), None);
        assert_eq!(remap("gopher/file", EntryKind::File), None);
        assert_eq!(remap("go", EntryKind::File), None);
    }

    #[test]
    fn test_top_level_dir_detection() {
        assert!(is_top_level_dir("go"));
        assert!(is_top_level_dir("go/"));
        assert!(!is_top_level_dir("go/bin/"));
        assert!(!is_top_level_dir("gopath/"));
    }

    #[test]
    fn test_classify_entry_types() {
        assert_eq!(EntryKind::classify(EntryType::Regular), Some(EntryKind::File));
        assert_eq!(EntryKind::classify(EntryType::Directory), Some(EntryKind::Directory));
        assert_eq!(EntryKind::classify(EntryType::Symlink), Some(EntryKind::Symlink));
        assert_eq!(EntryKind::classify(EntryType::Link), None);
        assert_eq!(EntryKind::classify(EntryType::Char), None);
        assert_eq!(EntryKind::classify(EntryType::Fifo), None);
    }

    #[test]
    fn test_installed_size_overflow_is_read_error() {
        assert_eq!(add_installed_size(100, 250, "go/bin/gofmt").unwrap(), 350);
        assert_eq!(add_installed_size(0, u64::MAX, "go/huge").unwrap(), u64::MAX);

        let err = add_installed_size(1, u64::MAX, "go/huge").unwrap_err();
        assert!(matches!(err, Error::ReadSource(ref e) if e.kind() == io::ErrorKind::InvalidData));
        assert!(err.to_string().contains("go/huge"));
    }

    #[test]
    fn test_rejects_non_gzip_input() {
        let translator = Translator::new(TranslateOptions::new(0));
        let err = translator
            .translate(&b"definitely not gzip"[..], Vec::new())
            .unwrap_err();
        assert!(matches!(err, Error::Uncompress(_)));

        let err = translator.translate(&b""[..], Vec::new()).unwrap_err();
        assert!(matches!(err, Error::Uncompress(_)));
    }
}
