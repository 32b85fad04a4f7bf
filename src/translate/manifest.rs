// src/translate/manifest.rs

//! Checksum manifest (`md5sums`) of the translated payload

use md5::{Digest, Md5};
use std::fmt;
use std::io::{self, Read};

/// One `md5sums` line: hex digest and path relative to the filesystem root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub digest: String,
    pub path: String,
}

/// Digests of every regular file, in the order the files were encountered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn push(&mut self, digest: String, path: impl Into<String>) {
        self.entries.push(ManifestEntry {
            digest,
            path: path.into(),
        });
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render in the `md5sums` control file format
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{}  {}", entry.digest, entry.path)?;
        }
        Ok(())
    }
}

/// Reader adapter computing the MD5 of everything read through it
pub struct HashingReader<R> {
    inner: R,
    hasher: Md5,
    read_failed: bool,
}

impl<R: Read> HashingReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: Md5::new(),
            read_failed: false,
        }
    }

    /// Whether the wrapped reader has returned an error
    pub fn read_failed(&self) -> bool {
        self.read_failed
    }

    /// Lowercase hex digest of the bytes read so far
    pub fn hex_digest(self) -> String {
        format!("{:x}", self.hasher.finalize())
    }
}

impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.inner.read(buf) {
            Ok(n) => {
                self.hasher.update(&buf[..n]);
                Ok(n)
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Err(e),
            Err(e) => {
                self.read_failed = true;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashing_reader_digest() {
        // Known MD5 hash of "hello world\n"
        let mut reader = HashingReader::new(&b"hello world\n"[..]);
        let mut sink = Vec::new();
        reader.read_to_end(&mut sink).unwrap();
        assert_eq!(sink, b"hello world\n");
        assert_eq!(reader.hex_digest(), "6f5902ac237024bdd0c176cb93063dc4");

        let empty = HashingReader::new(&b""[..]);
        assert_eq!(empty.hex_digest(), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_hashing_reader_records_failure() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("boom"))
            }
        }

        let mut reader = HashingReader::new(Broken);
        assert!(!reader.read_failed());
        assert!(reader.read(&mut [0u8; 4]).is_err());
        assert!(reader.read_failed());
    }

    #[test]
    fn test_manifest_format() {
        let mut manifest = Manifest::default();
        manifest.push("d41d8cd98f00b204e9800998ecf8427e".to_string(), "usr/local/go/VERSION");
        manifest.push("6f5902ac237024bdd0c176cb93063dc4".to_string(), "usr/local/go/bin/go");

        assert_eq!(manifest.len(), 2);
        assert_eq!(
            String::from_utf8(manifest.to_bytes()).unwrap(),
            "d41d8cd98f00b204e9800998ecf8427e  usr/local/go/VERSION\n\
             6f5902ac237024bdd0c176cb93063dc4  usr/local/go/bin/go\n"
        );
    }
}
