// tests/common/mod.rs

//! Shared fixtures for integration tests: synthetic upstream tarballs and
//! readers for the archives godeb produces.

#![allow(dead_code)]

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{self, Cursor, Read, Write};
use tar::{EntryType, Header};

/// Fixed mtime used for fixture entries
pub const FIXTURE_MTIME: u64 = 1_380_000_000;

/// One entry of a synthetic upstream tarball
#[derive(Debug, Clone)]
pub enum Fixture {
    Dir(&'static str),
    File(&'static str, Vec<u8>),
    Symlink(&'static str, &'static str),
    HardLink(&'static str, &'static str),
}

impl Fixture {
    pub fn file(name: &'static str, size: usize) -> Self {
        let body = (0..size).map(|i| (i % 251) as u8).collect();
        Fixture::File(name, body)
    }
}

impl Fixture {
    /// A file of pseudo-random bytes that gzip cannot shrink
    pub fn noise(name: &'static str, size: usize) -> Self {
        let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
        let body = (0..size)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state >> 24) as u8
            })
            .collect();
        Fixture::File(name, body)
    }
}

/// Writer that accepts `limit` bytes and then fails
#[derive(Debug)]
pub struct LimitedWriter {
    remaining: usize,
}

impl LimitedWriter {
    pub fn new(limit: usize) -> Self {
        Self { remaining: limit }
    }
}

impl Write for LimitedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.remaining == 0 && !buf.is_empty() {
            return Err(io::Error::other("no space left on device"));
        }
        let n = buf.len().min(self.remaining);
        self.remaining -= n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Build a gzip-compressed tarball
pub fn tarball(entries: &[Fixture]) -> Vec<u8> {
    gzip(&tar_bytes(entries))
}

/// Build an uncompressed tarball
///
/// Names that fit the header are written byte-exactly; longer ones go
/// through tar's own GNU long-name handling.
pub fn tar_bytes(entries: &[Fixture]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for entry in entries {
        let empty: &[u8] = &[];
        let (name, kind, body, link) = match entry {
            Fixture::Dir(name) => (*name, EntryType::Directory, empty, None),
            Fixture::File(name, body) => (*name, EntryType::Regular, body.as_slice(), None),
            Fixture::Symlink(name, target) => (*name, EntryType::Symlink, empty, Some(*target)),
            Fixture::HardLink(name, target) => (*name, EntryType::Link, empty, Some(*target)),
        };

        let mut header = Header::new_gnu();
        header.set_entry_type(kind);
        header.set_size(body.len() as u64);
        header.set_mode(match kind {
            EntryType::Directory => 0o755,
            EntryType::Symlink => 0o777,
            _ => 0o644,
        });
        header.set_uid(1000);
        header.set_gid(1000);
        header.set_mtime(FIXTURE_MTIME);
        if let Some(target) = link {
            raw_name(&mut header.as_old_mut().linkname, target);
        }

        if name.len() > 100 {
            builder.append_data(&mut header, name, body).unwrap();
        } else {
            raw_name(&mut header.as_old_mut().name, name);
            header.set_cksum();
            builder.append(&header, body).unwrap();
        }
    }
    builder.into_inner().unwrap()
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn raw_name(field: &mut [u8; 100], name: &str) {
    assert!(name.len() <= field.len(), "fixture name too long: {name}");
    field.fill(0);
    field[..name.len()].copy_from_slice(name.as_bytes());
}

/// A typical upstream layout: root directory, binaries, sources
pub fn upstream_tree() -> Vec<Fixture> {
    vec![
        Fixture::Dir("go/"),
        Fixture::Dir("go/bin/"),
        Fixture::file("go/bin/go", 100),
        Fixture::file("go/bin/gofmt", 250),
        Fixture::Dir("go/src/"),
        Fixture::file("go/src/README", 4096),
        Fixture::Symlink("go/misc/link", "../src/README"),
    ]
}

/// An entry read back from a produced tar.gz
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TarEntry {
    /// Name exactly as stored, including long-name records
    pub name: String,
    pub kind: EntryType,
    pub mode: u32,
    pub uid: u64,
    pub gid: u64,
    pub mtime: u64,
    pub link: Option<String>,
    pub body: Vec<u8>,
    /// Raw `name` field of the ustar header block
    pub header_name: String,
    /// Raw `prefix` field, when the header is ustar
    pub header_prefix: Option<String>,
}

/// Read every entry of a tar.gz
pub fn read_tar_gz(data: &[u8]) -> Vec<TarEntry> {
    let mut archive = tar::Archive::new(GzDecoder::new(data));
    archive
        .entries()
        .unwrap()
        .map(|entry| {
            let mut entry = entry.unwrap();
            let header = entry.header().clone();
            let name = String::from_utf8(entry.path_bytes().into_owned()).unwrap();
            let link = entry
                .link_name_bytes()
                .map(|l| String::from_utf8(l.into_owned()).unwrap());
            let mut body = Vec::new();
            entry.read_to_end(&mut body).unwrap();
            TarEntry {
                name,
                kind: header.entry_type(),
                mode: header.mode().unwrap(),
                uid: header.uid().unwrap(),
                gid: header.gid().unwrap(),
                mtime: header.mtime().unwrap(),
                link,
                body,
                header_name: field_string(&header.as_old().name),
                header_prefix: header.as_ustar().map(|u| field_string(&u.prefix)),
            }
        })
        .collect()
}

fn field_string(field: &[u8]) -> String {
    let end = field.iter().position(|b| *b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

/// A member of an ar archive
#[derive(Debug, Clone)]
pub struct ArMember {
    pub name: String,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub mtime: u64,
    pub body: Vec<u8>,
}

/// Read every member of an ar archive
pub fn read_ar(data: &[u8]) -> Vec<ArMember> {
    let mut archive = ar::Archive::new(Cursor::new(data));
    let mut members = Vec::new();
    while let Some(entry) = archive.next_entry() {
        let mut entry = entry.unwrap();
        let header = entry.header().clone();
        let mut body = Vec::new();
        entry.read_to_end(&mut body).unwrap();
        members.push(ArMember {
            name: String::from_utf8(header.identifier().to_vec()).unwrap(),
            mode: header.mode(),
            uid: header.uid(),
            gid: header.gid(),
            mtime: header.mtime(),
            body,
        });
    }
    members
}
