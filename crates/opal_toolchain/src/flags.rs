//! Filtering of baked-in JIT compile flags.
//!
//! The flag string recorded at build time names include directories on the
//! build machine. On end-user machines those directories may be absent or
//! access-restricted, so the raw set is filtered once at startup into an
//! effective subset: include-path flags keep only paths that pass the same
//! classification and probe discipline as driver resolution, and every other
//! flag passes through verbatim, in order.

use std::path::Path;

use opal_common::{probe, Probe};

use crate::resolver::may_probe;

/// Include-path flags whose argument may be joined (`-I/x`) or separate
/// (`-I /x`).
const INCLUDE_FLAGS: &[&str] = &["-I", "-isystem"];

/// Filters the raw baked-in flag string into the effective flag set.
pub fn filter_effective_flags(
    raw_flags: &str,
    is_bundle: bool,
    home_dir: Option<&Path>,
) -> Vec<String> {
    filter_effective_flags_with(raw_flags, is_bundle, home_dir, probe)
}

/// Filtering core with an injectable probe for tests.
pub fn filter_effective_flags_with(
    raw_flags: &str,
    is_bundle: bool,
    home_dir: Option<&Path>,
    mut probe_fn: impl FnMut(&Path) -> Probe,
) -> Vec<String> {
    let tokens: Vec<&str> = raw_flags.split_whitespace().collect();
    let mut effective = Vec::with_capacity(tokens.len());
    let mut usable = |path: &str| {
        let path = Path::new(path);
        may_probe(path, is_bundle, home_dir) && probe_fn(path).exists()
    };

    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        if let Some(flag) = INCLUDE_FLAGS.iter().find(|f| token == **f) {
            // Separate form: the path is the next token; keep or drop the pair.
            if let Some(path) = tokens.get(i + 1) {
                if usable(path) {
                    effective.push((*flag).to_string());
                    effective.push((*path).to_string());
                }
                i += 2;
                continue;
            }
            // Trailing bare include flag with no argument: drop it.
            i += 1;
            continue;
        }
        if let Some(path) = joined_include_path(token) {
            if usable(path) {
                effective.push(token.to_string());
            }
            i += 1;
            continue;
        }
        effective.push(token.to_string());
        i += 1;
    }
    effective
}

/// Extracts the path argument from a joined include flag, if this is one.
fn joined_include_path(token: &str) -> Option<&str> {
    for flag in INCLUDE_FLAGS {
        if let Some(rest) = token.strip_prefix(flag) {
            if !rest.is_empty() {
                return Some(rest);
            }
        }
    }
    None
}
