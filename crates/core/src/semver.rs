//! Semantic version handling
//!
//! Method versions are `major.minor.patch` integer triples. Partial
//! patterns like `"1"` or `"1.2"` select by prefix; comparison between two
//! unparsable strings falls back to bytewise ordering so that ordering is
//! still total.

use std::cmp::Ordering;

/// Parse a version string into `(major, minor, patch)`.
///
/// One to three dot-separated non-negative integer components are
/// accepted; omitted components default to 0. Anything else is rejected.
pub fn parse(version: &str) -> Option<(u64, u64, u64)> {
    if version.is_empty() {
        return None;
    }
    let mut components = [0u64; 3];
    let mut count = 0;
    for part in version.split('.') {
        if count == 3 {
            return None; // more than three components
        }
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        components[count] = part.parse().ok()?;
        count += 1;
    }
    Some((components[0], components[1], components[2]))
}

/// Total ordering over version strings.
///
/// Parsable versions compare as triples; a parsable version sorts above
/// any unparsable one; two unparsable versions compare bytewise.
pub fn compare(a: &str, b: &str) -> Ordering {
    match (parse(a), parse(b)) {
        (Some(va), Some(vb)) => va.cmp(&vb),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => a.cmp(b),
    }
}

/// Whether two versions share a major component.
pub fn are_compatible(a: &str, b: &str) -> bool {
    match (parse(a), parse(b)) {
        (Some(va), Some(vb)) => va.0 == vb.0,
        _ => false,
    }
}

/// Number of dots in a pattern, bounding how many components it pins.
fn specificity(pattern: &str) -> usize {
    pattern.bytes().filter(|b| *b == b'.').count()
}

/// Whether `version` has all three components spelled out.
pub fn is_full(version: &str) -> bool {
    specificity(version) == 2 && parse(version).is_some()
}

/// Match a version against a (possibly partial) pattern.
///
/// `"1"` matches any `1.x.y`; `"1.2"` matches any `1.2.y`; a full pattern
/// matches only itself. Unparsable versions or patterns match nothing.
pub fn matches_pattern(version: &str, pattern: &str) -> bool {
    let (Some(v), Some(p)) = (parse(version), parse(pattern)) else {
        return false;
    };
    match specificity(pattern) {
        0 => v.0 == p.0,
        1 => v.0 == p.0 && v.1 == p.1,
        _ => v == p,
    }
}

/// Index of the semver-greatest version matching `pattern`, or `None`.
pub fn find_latest_matching(versions: &[&str], pattern: &str) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, version) in versions.iter().enumerate() {
        if !matches_pattern(version, pattern) {
            continue;
        }
        best = match best {
            Some(j) if compare(versions[j], version) != Ordering::Less => Some(j),
            _ => Some(i),
        };
    }
    best
}
