// src/version/mod.rs

//! Ordering of upstream Go release versions
//!
//! Release identifiers such as `1.2`, `1.2rc3`, `1.1.2` or `1.1beta1` are
//! never parsed into fields. Two identifiers are compared by scanning both
//! strings left to right:
//! - digit runs compare numerically (`1.10` is newer than `1.9`)
//! - a digit beats a non-digit at the same position
//! - a side continuing with `.` beats a side starting a tag (`1.1.2` > `1.1rc2`)
//! - tags rank `rc` > `beta` > anything else, then by plain string order
//!
//! A final release therefore sorts before its release candidates, which sort
//! before its betas.

use std::cmp::Ordering;
use std::fmt;

/// An upstream release identifier ordered with "newer is greater"
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReleaseVersion(String);

impl ReleaseVersion {
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReleaseVersion {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Ord for ReleaseVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(&self.0, &other.0)
    }
}

impl PartialOrd for ReleaseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compare two version identifiers; `Greater` means `a` is the newer release
///
/// Agrees with [`is_newer`] wherever that relation is consistent. When one
/// identifier is a token prefix of the other, the longer one is newer if it
/// continues with a digit or `.` and older if it continues with a tag. This
/// also settles pairs such as `1.` and `1.9`, for which [`is_newer`] holds
/// in both directions, so the result is a total order that sorting can rely on.
pub fn compare(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    match scan(a, b) {
        Scan::Decided(true) => Ordering::Greater,
        Scan::Decided(false) => Ordering::Less,
        Scan::Exhausted { ai, bi } => leftover_rank(a, ai).cmp(&leftover_rank(b, bi)),
    }
}

/// Sort versions newest first
pub fn sort_newest_first<T, F>(items: &mut [T], version: F)
where
    F: Fn(&T) -> &str,
{
    items.sort_by(|x, y| compare(version(y), version(x)));
}

/// Whether `a` ranks strictly above `b`
pub fn is_newer(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let (ai, bi) = match scan(a, b) {
        Scan::Decided(newer) => return newer,
        Scan::Exhausted { ai, bi } => (ai, bi),
    };

    // Leftovers. The two checks are not mirror images of each other, and
    // `'9'` counts as a tag character on the right-hand side; sort results
    // depend on this exact behaviour.
    if ai < a.len() && (a[ai] == b'.' || a[ai].is_ascii_digit()) {
        return true;
    }
    if bi < b.len() && b[bi] != b'.' && (b[bi] < b'0' || b[bi] >= b'9') {
        return true;
    }
    false
}

/// Outcome of the pairwise scan
enum Scan {
    /// A differing token decided the order; `true` when `a` is newer
    Decided(bool),
    /// One side ran out with all tokens so far equal
    Exhausted { ai: usize, bi: usize },
}

fn scan(a: &[u8], b: &[u8]) -> Scan {
    let (mut ai, mut bi) = (0, 0);

    while ai < a.len() && bi < b.len() {
        let a_digit = a[ai].is_ascii_digit();
        let b_digit = b[bi].is_ascii_digit();
        if a_digit != b_digit {
            return Scan::Decided(a_digit);
        }

        if a_digit {
            let (av, a_end) = digit_run(a, ai);
            let (bv, b_end) = digit_run(b, bi);
            ai = a_end;
            bi = b_end;
            if av != bv {
                return Scan::Decided(av > bv);
            }
        } else if a[ai] == b'.' && b[bi] == b'.' {
            ai += 1;
            bi += 1;
        } else if a[ai] == b'.' || b[bi] == b'.' {
            return Scan::Decided(a[ai] == b'.');
        } else {
            let a_end = tag_end(a, ai);
            let b_end = tag_end(b, bi);
            let a_tag = &a[ai..a_end];
            let b_tag = &b[bi..b_end];
            ai = a_end;
            bi = b_end;

            for tag in [&b"rc"[..], &b"beta"[..]] {
                if (a_tag == tag) != (b_tag == tag) {
                    return Scan::Decided(a_tag == tag);
                }
            }
            if a_tag.is_empty() || b_tag.is_empty() {
                return Scan::Decided(a_tag.len() > b_tag.len());
            }
            if a_tag != b_tag {
                return Scan::Decided(a_tag > b_tag);
            }
        }
    }
    Scan::Exhausted { ai, bi }
}

/// Rank of what follows a common token prefix: a digit or `.` beats the
/// end of the string, which beats a tag
fn leftover_rank(s: &[u8], i: usize) -> u8 {
    match s.get(i) {
        None => 1,
        Some(&c) if c == b'.' || c.is_ascii_digit() => 2,
        Some(_) => 0,
    }
}

/// Parse the digit run starting at `start`, returning its value and end
fn digit_run(s: &[u8], start: usize) -> (u64, usize) {
    let mut value: u64 = 0;
    let mut end = start;
    while end < s.len() && s[end].is_ascii_digit() {
        value = value
            .saturating_mul(10)
            .saturating_add(u64::from(s[end] - b'0'));
        end += 1;
    }
    (value, end)
}

/// End of the tag run (neither digit nor dot) starting at `start`
fn tag_end(s: &[u8], start: usize) -> usize {
    let mut end = start;
    while end < s.len() && s[end] != b'.' && !s[end].is_ascii_digit() {
        end += 1;
    }
    end
}
