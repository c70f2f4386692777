//! Merge passes over the record store.
//!
//! Merging is the single serial barrier step at the end of a build: it takes a
//! snapshot of every cached record, flattens the object lists in stable key
//! order, and creates one fresh archive from the concatenation. It must never
//! run concurrently with in-flight recording.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use crate::error::ArchiveError;
use crate::record::RecordStore;

/// The product of one merge pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedArchive {
    /// Path of the created archive.
    pub path: PathBuf,

    /// Member object files, in archive order.
    pub members: Vec<PathBuf>,
}

/// Phase-1 merge: every object file from every cached record.
///
/// Records are visited in stable sorted key order with per-record object
/// order preserved, so repeated merges of identical cache content agree on
/// member order. Any pre-existing archive at `output` is deleted first; the
/// archiver then creates a fresh archive containing exactly the flattened
/// concatenation. An empty cache produces a valid empty archive.
pub fn merge(
    store: &RecordStore,
    archiver: &Path,
    output: &Path,
) -> Result<MergedArchive, ArchiveError> {
    let members = flatten_records(store)?;
    create_archive(archiver, output, &members)?;
    Ok(MergedArchive {
        path: output.to_path_buf(),
        members,
    })
}

/// Phase-2 merge: phase 1 plus the compiled standard-library core object,
/// appended last.
///
/// Must run only after the core unit has been compiled to `core_object`.
pub fn merge_phase_2(
    store: &RecordStore,
    archiver: &Path,
    output: &Path,
    core_object: &Path,
) -> Result<MergedArchive, ArchiveError> {
    let mut members = flatten_records(store)?;
    members.push(core_object.to_path_buf());
    create_archive(archiver, output, &members)?;
    Ok(MergedArchive {
        path: output.to_path_buf(),
        members,
    })
}

/// Flattens all records into one ordered member list.
fn flatten_records(store: &RecordStore) -> Result<Vec<PathBuf>, ArchiveError> {
    let mut members = Vec::new();
    for record in store.read_all()? {
        members.extend(record.object_files);
    }
    Ok(members)
}

/// Deletes any stale archive at `output` and creates a fresh one.
fn create_archive(
    archiver: &Path,
    output: &Path,
    members: &[PathBuf],
) -> Result<(), ArchiveError> {
    match std::fs::remove_file(output) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(ArchiveError::Io {
                path: output.to_path_buf(),
                source: e,
            })
        }
    }

    let mut argv: Vec<String> = vec![
        archiver.display().to_string(),
        "rcs".to_string(),
        output.display().to_string(),
    ];
    argv.extend(members.iter().map(|m| m.display().to_string()));
    let status = run_argv(&argv)?;
    if !status.success() {
        return Err(ArchiveError::ArchiverFailed { argv, status });
    }
    Ok(())
}

/// Forwards a complete archiver invocation unchanged and reports its status.
///
/// Used by the pass-through entry point so that per-target static libraries
/// keep being produced exactly as the build system asked.
pub fn run_archiver(argv: &[String]) -> Result<ExitStatus, ArchiveError> {
    run_argv(argv)
}

fn run_argv(argv: &[String]) -> Result<ExitStatus, ArchiveError> {
    let (command, args) = argv.split_first().ok_or_else(|| ArchiveError::ArchiverSpawn {
        argv: argv.to_vec(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty archiver command"),
    })?;
    Command::new(command)
        .args(args)
        .status()
        .map_err(|e| ArchiveError::ArchiverSpawn {
            argv: argv.to_vec(),
            source: e,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Writes a stub archiver that records its member arguments, one per
    /// line, into the output archive file.
    #[cfg(unix)]
    fn stub_archiver(dir: &Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("stub-ar");
        std::fs::write(&path, "#!/bin/sh\nmode=$1; out=$2; shift 2\nprintf '%s\\n' \"$@\" > \"$out\"\n")
            .unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[cfg(unix)]
    fn archive_members(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }

    #[cfg(unix)]
    #[test]
    fn merge_flattens_in_stable_key_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("cache"));
        let ar = stub_archiver(dir.path());
        let output = dir.path().join("libopal.a");

        store
            .record("b", vec![PathBuf::from("b1.o")])
            .unwrap();
        store
            .record("a", vec![PathBuf::from("a1.o"), PathBuf::from("a2.o")])
            .unwrap();

        let merged = merge(&store, &ar, &output).unwrap();
        assert_eq!(
            merged.members,
            vec![
                PathBuf::from("a1.o"),
                PathBuf::from("a2.o"),
                PathBuf::from("b1.o")
            ]
        );
        assert_eq!(archive_members(&output), vec!["a1.o", "a2.o", "b1.o"]);
    }

    #[cfg(unix)]
    #[test]
    fn merge_replaces_stale_output() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("cache"));
        let ar = stub_archiver(dir.path());
        let output = dir.path().join("libopal.a");

        std::fs::write(&output, "stale archive bytes").unwrap();
        store.record("a", vec![PathBuf::from("a1.o")]).unwrap();

        merge(&store, &ar, &output).unwrap();
        assert_eq!(archive_members(&output), vec!["a1.o"]);
    }

    #[cfg(unix)]
    #[test]
    fn merge_of_empty_cache_creates_empty_archive() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("cache"));
        let ar = stub_archiver(dir.path());
        let output = dir.path().join("libopal.a");

        let merged = merge(&store, &ar, &output).unwrap();
        assert!(merged.members.is_empty());
        assert!(output.exists());
        assert!(archive_members(&output).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn phase_2_appends_exactly_the_core_object_last() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("cache"));
        let ar = stub_archiver(dir.path());
        let output = dir.path().join("libopal-standalone.a");

        store.record("a", vec![PathBuf::from("a1.o")]).unwrap();
        let merged =
            merge_phase_2(&store, &ar, &output, Path::new("opal.core.o")).unwrap();
        assert_eq!(
            merged.members,
            vec![PathBuf::from("a1.o"), PathBuf::from("opal.core.o")]
        );
        assert_eq!(archive_members(&output), vec!["a1.o", "opal.core.o"]);
    }

    #[cfg(unix)]
    #[test]
    fn failing_archiver_is_fatal_with_full_command() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("cache"));
        store.record("a", vec![PathBuf::from("a1.o")]).unwrap();

        let ar = dir.path().join("failing-ar");
        std::fs::write(&ar, "#!/bin/sh\nexit 3\n").unwrap();
        let mut perms = std::fs::metadata(&ar).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&ar, perms).unwrap();

        let err = merge(&store, &ar, &dir.path().join("out.a")).unwrap_err();
        match err {
            ArchiveError::ArchiverFailed { argv, status } => {
                assert_eq!(status.code(), Some(3));
                assert!(argv.iter().any(|a| a.ends_with("a1.o")));
            }
            other => panic!("expected ArchiverFailed, got {other}"),
        }
    }

    #[test]
    fn unspawnable_archiver_is_a_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("cache"));
        let err = merge(
            &store,
            Path::new("/no/such/archiver"),
            &dir.path().join("out.a"),
        )
        .unwrap_err();
        assert!(matches!(err, ArchiveError::ArchiverSpawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn run_archiver_forwards_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let ar = stub_archiver(dir.path());
        let out = dir.path().join("target.a");

        let argv = vec![
            ar.display().to_string(),
            "qc".to_string(),
            out.display().to_string(),
            "x.o".to_string(),
        ];
        let status = run_archiver(&argv).unwrap();
        assert!(status.success());
        assert_eq!(archive_members(&out), vec!["x.o"]);
    }
}
