// src/translate/header.rs

//! Tar header emission for the translated data member
//!
//! Entry names are written byte-exactly into the header (tar's own path
//! handling would normalize away the leading `./` and the trailing `/` on
//! directories that Debian data members carry). No PAX records are ever
//! emitted; names that do not fit a header field are handled according to
//! the [`TarDialect`] selected by the caller.

use super::manifest::HashingReader;
use crate::error::{Error, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Deserialize;
use std::io::{self, Read, Write};
use tar::{Builder, EntryType, Header};
use tracing::warn;

const NAME_LEN: usize = 100;
const PREFIX_LEN: usize = 155;
const BLOCK_SIZE: u64 = 512;
const GNU_LONG_NAME: &str = "././@LongLink";

/// Header layout used for every entry in the data member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TarDialect {
    /// GNU headers; long names and link targets use `././@LongLink` records
    #[default]
    Gnu,
    /// POSIX ustar headers; long names are split into prefix and name
    Ustar,
}

impl TarDialect {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gnu => "gnu",
            Self::Ustar => "ustar",
        }
    }

    fn new_header(&self) -> Header {
        match self {
            Self::Gnu => Header::new_gnu(),
            Self::Ustar => Header::new_ustar(),
        }
    }
}

/// Ownership, permissions and timestamp carried over to an emitted header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMeta {
    pub mode: u32,
    pub uid: u64,
    pub gid: u64,
    pub mtime: u64,
    pub username: Option<String>,
    pub groupname: Option<String>,
}

impl EntryMeta {
    /// Metadata for an entry that has no upstream counterpart
    pub fn synthesized(mode: u32, mtime: u64) -> Self {
        Self {
            mode,
            uid: 0,
            gid: 0,
            mtime,
            username: None,
            groupname: None,
        }
    }

    /// Read the metadata of an upstream header
    pub fn from_header(header: &Header) -> io::Result<Self> {
        Ok(Self {
            mode: header.mode()?,
            uid: header.uid()?,
            gid: header.gid()?,
            mtime: header.mtime()?,
            username: header.username().ok().flatten().map(str::to_string),
            groupname: header.groupname().ok().flatten().map(str::to_string),
        })
    }
}

/// Gzip-compressed tar writer for the data member
pub(crate) struct DataArchive<W: Write> {
    builder: Builder<GzEncoder<W>>,
    dialect: TarDialect,
}

impl<W: Write> DataArchive<W> {
    pub(crate) fn new(output: W, dialect: TarDialect, compression: Compression) -> Self {
        Self {
            builder: Builder::new(GzEncoder::new(output, compression)),
            dialect,
        }
    }

    pub(crate) fn append_directory(&mut self, path: &str, meta: &EntryMeta) -> Result<()> {
        let header = self.header(path, None, EntryType::Directory, meta, 0)?;
        self.write_header(path, &header)
    }

    pub(crate) fn append_symlink(&mut self, path: &str, target: &str, meta: &EntryMeta) -> Result<()> {
        let header = self.header(path, Some(target), EntryType::Symlink, meta, 0)?;
        self.write_header(path, &header)
    }

    /// Append a regular file, streaming its body through `body`
    pub(crate) fn append_file<R: Read>(
        &mut self,
        path: &str,
        meta: &EntryMeta,
        size: u64,
        body: &mut HashingReader<R>,
    ) -> Result<()> {
        let header = self.header(path, None, EntryType::Regular, meta, size)?;
        self.write_header(path, &header)?;

        let out = self.builder.get_mut();
        let copied = match io::copy(body, out) {
            Ok(n) => n,
            Err(e) if body.read_failed() => return Err(Error::ReadSource(e)),
            Err(e) => return Err(Error::write(format!("{path} to data.tar.gz"), e)),
        };
        if copied != size {
            return Err(Error::ReadSource(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("{path}: expected {size} bytes, got {copied}"),
            )));
        }

        let padding = (BLOCK_SIZE - copied % BLOCK_SIZE) % BLOCK_SIZE;
        out.write_all(&[0u8; BLOCK_SIZE as usize][..padding as usize])
            .map_err(|e| Error::write(format!("padding of {path} to data.tar.gz"), e))
    }

    /// Write the end-of-archive marker and the gzip trailer
    pub(crate) fn finish(self) -> Result<W> {
        let encoder = self
            .builder
            .into_inner()
            .map_err(|e| Error::write("end of data.tar.gz", e))?;
        encoder
            .finish()
            .map_err(|e| Error::write("gzip trailer of data.tar.gz", e))
    }

    fn write_header(&mut self, path: &str, header: &Header) -> Result<()> {
        self.builder
            .get_mut()
            .write_all(header.as_bytes())
            .map_err(|e| Error::write(format!("header of {path} to data.tar.gz"), e))
    }

    fn header(
        &mut self,
        path: &str,
        link: Option<&str>,
        entry_type: EntryType,
        meta: &EntryMeta,
        size: u64,
    ) -> Result<Header> {
        let mut header = self.dialect.new_header();
        header.set_entry_type(entry_type);
        header.set_mode(meta.mode);
        header.set_uid(meta.uid);
        header.set_gid(meta.gid);
        header.set_mtime(meta.mtime);
        header.set_size(size);
        if let Some(name) = &meta.username
            && header.set_username(name).is_err()
        {
            warn!("Dropping owner name {} of {}: too long for header", name, path);
        }
        if let Some(name) = &meta.groupname
            && header.set_groupname(name).is_err()
        {
            warn!("Dropping group name {} of {}: too long for header", name, path);
        }

        self.set_name(&mut header, path)?;
        if let Some(target) = link {
            self.set_link_name(&mut header, path, target)?;
        }
        header.set_cksum();
        Ok(header)
    }

    fn set_name(&mut self, header: &mut Header, path: &str) -> Result<()> {
        let bytes = path.as_bytes();
        if bytes.len() <= NAME_LEN {
            header.as_old_mut().name[..bytes.len()].copy_from_slice(bytes);
            return Ok(());
        }

        match self.dialect {
            TarDialect::Gnu => {
                self.append_long_record(EntryType::GNULongName, path, bytes)?;
                header.as_old_mut().name.copy_from_slice(&bytes[..NAME_LEN]);
                Ok(())
            }
            TarDialect::Ustar => {
                let (prefix, name) = split_ustar_path(bytes).ok_or_else(|| Error::PathTooLong {
                    dialect: self.dialect.name(),
                    path: path.to_string(),
                })?;
                if let Some(ustar) = header.as_ustar_mut() {
                    ustar.prefix[..prefix.len()].copy_from_slice(prefix);
                    ustar.name[..name.len()].copy_from_slice(name);
                }
                Ok(())
            }
        }
    }

    fn set_link_name(&mut self, header: &mut Header, path: &str, target: &str) -> Result<()> {
        let bytes = target.as_bytes();
        if bytes.len() <= NAME_LEN {
            header.as_old_mut().linkname[..bytes.len()].copy_from_slice(bytes);
            return Ok(());
        }

        match self.dialect {
            TarDialect::Gnu => {
                self.append_long_record(EntryType::GNULongLink, path, bytes)?;
                header
                    .as_old_mut()
                    .linkname
                    .copy_from_slice(&bytes[..NAME_LEN]);
                Ok(())
            }
            TarDialect::Ustar => Err(Error::PathTooLong {
                dialect: self.dialect.name(),
                path: target.to_string(),
            }),
        }
    }

    /// Emit a `././@LongLink` record carrying a name that exceeds the header field
    fn append_long_record(&mut self, kind: EntryType, path: &str, value: &[u8]) -> Result<()> {
        let mut header = Header::new_gnu();
        header.as_old_mut().name[..GNU_LONG_NAME.len()].copy_from_slice(GNU_LONG_NAME.as_bytes());
        header.set_entry_type(kind);
        header.set_mode(0o644);
        header.set_uid(0);
        header.set_gid(0);
        header.set_mtime(0);
        header.set_size(value.len() as u64 + 1);
        header.set_cksum();

        let mut data = Vec::with_capacity(value.len() + 1);
        data.extend_from_slice(value);
        data.push(0);
        self.builder
            .append(&header, data.as_slice())
            .map_err(|e| Error::write(format!("long name record of {path} to data.tar.gz"), e))
    }
}

/// Split a path at a `/` so that it fits ustar's prefix and name fields
fn split_ustar_path(path: &[u8]) -> Option<(&[u8], &[u8])> {
    path.iter()
        .enumerate()
        .rev()
        .filter(|&(_, &b)| b == b'/')
        .map(|(i, _)| (&path[..i], &path[i + 1..]))
        .find(|(prefix, name)| {
            prefix.len() <= PREFIX_LEN && !name.is_empty() && name.len() <= NAME_LEN
        })
}
