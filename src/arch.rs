// src/arch.rs

//! Architecture naming
//!
//! Upstream tarballs are named after Go's architecture identifiers
//! (`amd64`, `386`, `arm64`, ...); Debian mostly uses the same names.

/// Go architecture identifier of the host
pub fn host_go_arch() -> &'static str {
    go_arch_for(std::env::consts::ARCH, cfg!(target_endian = "little"))
}

/// Map a Rust target architecture to Go's naming
pub fn go_arch_for(rust_arch: &'static str, little_endian: bool) -> &'static str {
    match rust_arch {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "arm" => "armv6l",
        "powerpc64" if little_endian => "ppc64le",
        "powerpc64" => "ppc64",
        "loongarch64" => "loong64",
        "mips64" if little_endian => "mips64le",
        "mips" if little_endian => "mipsle",
        _ => rust_arch,
    }
}

/// Debian architecture tag for a Go architecture
///
/// Upstream's `armv6l` tarballs are hard-float builds and install on
/// Debian's `armhf` port.
pub fn debian_arch(go_arch: &str) -> &str {
    match go_arch {
        "386" => "i386",
        "armv6l" | "arm" => "armhf",
        "ppc64le" => "ppc64el",
        "mips64le" => "mips64el",
        "mipsle" => "mipsel",
        other => other,
    }
}
