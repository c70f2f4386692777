//! Default pass-through mode: record one target and forward the invocation.
//!
//! The build system calls `opal-ar <archiver> [flags] <output> <objects...>`
//! wherever it would call the archiver directly. Recording expands any
//! `@response-file` arguments immediately (the file is transient) and
//! overwrites the target's cache record; the original invocation is then
//! forwarded unchanged so per-target static libraries keep being produced.
//! Invocations this entry point does not specialize (listing, extraction,
//! anything without a creation mode) are forwarded verbatim without touching
//! the cache.

use opal_archive::{expand_object_args, run_archiver, RecordStore};
use opal_config::OrchestratorConfig;

use crate::Cli;

/// `ar` mode/modifier characters. A leading operand made only of these is the
/// archiver's mode string rather than a path.
const AR_MODE_CHARS: &str = "abcdDfilmMNoOpPqrsStTuUvVx";

/// One parsed archive-creation invocation.
struct Invocation<'a> {
    /// Whether the mode string (if any) creates or updates an archive.
    creates: bool,
    /// The archive output path the build system intended to create.
    output: &'a str,
    /// Object-file and response-file arguments, unexpanded.
    object_args: &'a [String],
}

/// Runs the default pass-through mode.
pub fn run(
    config: &OrchestratorConfig,
    cli: &Cli,
    args: &[String],
) -> Result<i32, Box<dyn std::error::Error>> {
    if let Some(invocation) = parse(args) {
        if invocation.creates {
            let objects = expand_object_args(invocation.object_args)?;
            let store = RecordStore::new(&config.paths.cache_dir);
            store.record(invocation.output, objects)?;
            if cli.verbose {
                eprintln!("  Recorded {}", invocation.output);
            }
        }
    }

    // Forward the original invocation unchanged, response files included, and
    // propagate the archiver's own exit status.
    let status = run_archiver(args)?;
    Ok(status.code().unwrap_or(1))
}

/// Splits `<archiver> [flags] <output> <objects...>` into its parts.
///
/// Returns `None` when the invocation has no output operand; such calls are
/// forwarded without recording.
fn parse(args: &[String]) -> Option<Invocation<'_>> {
    let mut creates = true;
    let mut seen_mode = false;
    let mut i = 1;
    while i < args.len() {
        let arg = &args[i];
        if arg.starts_with('-') {
            i += 1;
            continue;
        }
        if !seen_mode && is_mode_string(arg) {
            creates = arg.contains('q') || arg.contains('r');
            seen_mode = true;
            i += 1;
            continue;
        }
        break;
    }
    let output = args.get(i)?;
    Some(Invocation {
        creates,
        output,
        object_args: &args[i + 1..],
    })
}

/// Returns `true` for a bare `ar` mode string such as `qc` or `rcs`.
fn is_mode_string(arg: &str) -> bool {
    !arg.is_empty() && arg.chars().all(|c| AR_MODE_CHARS.contains(c))
}
