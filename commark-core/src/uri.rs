//! Path classification and the reversible segment-escaping scheme
//!
//! `encode_segment` replaces every character outside `[A-Za-z0-9]` with `-`
//! followed by four lowercase hex digits per UTF-16 code unit, so a path or
//! URI survives embedding inside another identifier and decodes back
//! bit-exactly.

use std::path::Path;

pub fn encode_segment(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut units = [0u16; 2];
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else {
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("-{:04x}", unit));
            }
        }
    }
    out
}

pub fn decode_segment(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut units: Vec<u16> = Vec::with_capacity(chars.len());
    let mut buffer = [0u16; 2];
    let mut i = 0;
    while i < chars.len() {
        // Only `-` followed by exactly four lowercase hex digits is an
        // escape; anything else passes through untouched.
        let digits = &chars[i + 1..chars.len().min(i + 5)];
        let code = if chars[i] == '-'
            && digits.len() == 4
            && digits.iter().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
        {
            let digits: String = digits.iter().collect();
            u16::from_str_radix(&digits, 16).ok()
        } else {
            None
        };
        match code {
            Some(unit) => {
                units.push(unit);
                i += 5;
            }
            None => {
                units.extend_from_slice(chars[i].encode_utf16(&mut buffer));
                i += 1;
            }
        }
    }
    String::from_utf16_lossy(&units)
}

/// A path that already names a scheme passes through link rewriting.
pub fn has_scheme(path: &str) -> bool {
    path.contains("://")
}

/// Filesystem-absolute: leading slash or backslash, or a drive prefix.
pub fn is_absolute(path: &str) -> bool {
    if has_scheme(path) {
        return false;
    }
    let drive = {
        let bytes = path.as_bytes();
        bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'\\'
    };
    drive || path.starts_with('/') || path.starts_with('\\')
}

/// File URI for an absolute path, backslashes normalized to slashes.
pub fn file_uri(path: &str) -> String {
    let normalized = path.replace('\\', "/");
    if normalized.starts_with('/') {
        format!("file://{normalized}")
    } else {
        format!("file:///{normalized}")
    }
}

/// Join a relative path onto a base folder, resolving `.` and `..` segments.
pub fn join_relative(base: &Path, relative: &str) -> String {
    let base = base.to_string_lossy().replace('\\', "/");
    let relative = relative.replace('\\', "/");
    let rooted = base.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for segment in base.split('/').chain(relative.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    if rooted {
        format!("/{joined}")
    } else {
        joined
    }
}
