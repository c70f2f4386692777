//! Per-target object records and their on-disk store.
//!
//! Each archive target gets one record file in the cache directory, keyed by
//! its sanitized name. Writes replace the whole record, so the store always
//! reflects the latest known object-file set for every target. Concurrent
//! writes for distinct targets touch distinct files and need no coordination;
//! same-target writes are last-writer-wins at whole-file granularity.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ArchiveError;

/// File extension for target record files.
const RECORD_EXT: &str = "json";

/// One archive target's current full membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetRecord {
    /// Raw build-system target identifier; may contain path separators.
    pub name: String,

    /// Ordered absolute paths of the object files belonging to this target.
    pub object_files: Vec<PathBuf>,
}

/// Replaces path separators in a target name with a filesystem-safe character.
///
/// The result is the record's on-disk identifier; the raw name is kept inside
/// the record itself.
pub fn sanitize_key(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}

/// Expands archiving-invocation arguments into literal object paths.
///
/// Arguments of the form `@file` name a transient response file holding
/// whitespace-separated object paths; they are read and expanded immediately
/// because the response file will not exist by merge time. All other
/// arguments are taken as literal object paths.
pub fn expand_object_args(args: &[String]) -> Result<Vec<PathBuf>, ArchiveError> {
    let mut objects = Vec::with_capacity(args.len());
    for arg in args {
        if let Some(rsp) = arg.strip_prefix('@') {
            let path = PathBuf::from(rsp);
            let content =
                std::fs::read_to_string(&path).map_err(|e| ArchiveError::ResponseFile {
                    path: path.clone(),
                    source: e,
                })?;
            objects.extend(content.split_whitespace().map(PathBuf::from));
        } else {
            objects.push(PathBuf::from(arg));
        }
    }
    Ok(objects)
}

/// Persistent key-value store of target records, rooted at an explicit cache
/// directory.
///
/// The contract is string key to ordered path list; the plain-file encoding
/// behind it is replaceable without touching callers. Reads are fail-safe:
/// an unparseable record is skipped rather than failing the enumeration.
pub struct RecordStore {
    cache_dir: PathBuf,
}

impl RecordStore {
    /// Creates a store rooted at the given cache directory.
    ///
    /// The directory itself is created lazily on first write.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// The cache directory this store is rooted at.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Record file path for a target name.
    fn record_path(&self, name: &str) -> PathBuf {
        self.cache_dir
            .join(format!("{}.{RECORD_EXT}", sanitize_key(name)))
    }

    /// Overwrites the record for one target with its current full membership.
    ///
    /// An empty object list still writes an empty record, replacing any prior
    /// one. The write is a single whole-file replacement keyed uniquely by the
    /// sanitized target name.
    pub fn record(
        &self,
        target_name: &str,
        object_files: Vec<PathBuf>,
    ) -> Result<(), ArchiveError> {
        std::fs::create_dir_all(&self.cache_dir).map_err(|e| ArchiveError::Io {
            path: self.cache_dir.clone(),
            source: e,
        })?;

        let record = TargetRecord {
            name: target_name.to_string(),
            object_files,
        };
        let path = self.record_path(target_name);
        let json = serde_json::to_string_pretty(&record).map_err(|e| ArchiveError::Record {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        std::fs::write(&path, json).map_err(|e| ArchiveError::Io { path, source: e })
    }

    /// Enumerates every record in stable sorted key order.
    ///
    /// A missing cache directory is an empty cache, not an error. Unparseable
    /// record files are skipped fail-safe. Object order within each record is
    /// preserved as recorded, so repeated enumerations of identical cache
    /// content agree byte for byte.
    pub fn read_all(&self) -> Result<Vec<TargetRecord>, ArchiveError> {
        let entries = match std::fs::read_dir(&self.cache_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(ArchiveError::Io {
                    path: self.cache_dir.clone(),
                    source: e,
                })
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == RECORD_EXT))
            .collect();
        paths.sort();

        let mut records = Vec::with_capacity(paths.len());
        for path in paths {
            let Ok(content) = std::fs::read_to_string(&path) else {
                continue;
            };
            let Ok(record) = serde_json::from_str::<TargetRecord>(&content) else {
                continue;
            };
            records.push(record);
        }
        Ok(records)
    }

    /// Deletes the entire cache directory and recreates it empty.
    ///
    /// Only the explicit top-level clean operation calls this; it must never
    /// run mid-build, since in-flight records would be lost.
    pub fn clean(&self) -> Result<(), ArchiveError> {
        match std::fs::remove_dir_all(&self.cache_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(ArchiveError::Io {
                    path: self.cache_dir.clone(),
                    source: e,
                })
            }
        }
        std::fs::create_dir_all(&self.cache_dir).map_err(|e| ArchiveError::Io {
            path: self.cache_dir.clone(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, RecordStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("archive-cache"));
        (dir, store)
    }

    #[test]
    fn sanitize_replaces_path_separators() {
        assert_eq!(sanitize_key("core/reader"), "core_reader");
        assert_eq!(sanitize_key(r"core\reader"), "core_reader");
        assert_eq!(sanitize_key("plain"), "plain");
    }

    #[test]
    fn record_then_read_roundtrip() {
        let (_dir, store) = store();
        store
            .record(
                "core/reader",
                vec![PathBuf::from("/b/reader1.o"), PathBuf::from("/b/reader2.o")],
            )
            .unwrap();

        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "core/reader");
        assert_eq!(
            records[0].object_files,
            vec![PathBuf::from("/b/reader1.o"), PathBuf::from("/b/reader2.o")]
        );
    }

    #[test]
    fn rerecording_replaces_wholesale() {
        let (_dir, store) = store();
        store
            .record("a", vec![PathBuf::from("a1.o"), PathBuf::from("a2.o")])
            .unwrap();
        store.record("a", vec![PathBuf::from("a1.o")]).unwrap();

        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].object_files, vec![PathBuf::from("a1.o")]);
    }

    #[test]
    fn empty_object_list_still_writes_a_record() {
        let (_dir, store) = store();
        store.record("empty", vec![PathBuf::from("x.o")]).unwrap();
        store.record("empty", Vec::new()).unwrap();

        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].object_files.is_empty());
    }

    #[test]
    fn read_all_is_sorted_by_sanitized_key() {
        let (_dir, store) = store();
        store.record("zeta", vec![PathBuf::from("z.o")]).unwrap();
        store.record("alpha", vec![PathBuf::from("a.o")]).unwrap();
        store.record("mid/point", vec![PathBuf::from("m.o")]).unwrap();

        let records = store.read_all().unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "mid/point", "zeta"]);
    }

    #[test]
    fn missing_cache_dir_reads_empty() {
        let (_dir, store) = store();
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn corrupt_record_is_skipped() {
        let (_dir, store) = store();
        store.record("good", vec![PathBuf::from("g.o")]).unwrap();
        std::fs::write(store.cache_dir().join("bad.json"), "not json {{{").unwrap();

        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "good");
    }

    #[test]
    fn non_record_files_are_ignored() {
        let (_dir, store) = store();
        store.record("t", vec![PathBuf::from("t.o")]).unwrap();
        std::fs::write(store.cache_dir().join("stray.txt"), "x").unwrap();
        assert_eq!(store.read_all().unwrap().len(), 1);
    }

    #[test]
    fn clean_empties_and_recreates() {
        let (_dir, store) = store();
        store.record("t", vec![PathBuf::from("t.o")]).unwrap();
        store.clean().unwrap();

        assert!(store.cache_dir().is_dir());
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn clean_on_missing_dir_succeeds() {
        let (_dir, store) = store();
        store.clean().unwrap();
        assert!(store.cache_dir().is_dir());
    }

    #[test]
    fn expand_literal_args() {
        let objects =
            expand_object_args(&["a.o".to_string(), "b.o".to_string()]).unwrap();
        assert_eq!(objects, vec![PathBuf::from("a.o"), PathBuf::from("b.o")]);
    }

    #[test]
    fn expand_response_file_inline() {
        let dir = tempfile::tempdir().unwrap();
        let rsp = dir.path().join("objs.rsp");
        std::fs::write(&rsp, "r1.o r2.o\nr3.o").unwrap();

        let objects = expand_object_args(&[
            "lead.o".to_string(),
            format!("@{}", rsp.display()),
            "tail.o".to_string(),
        ])
        .unwrap();
        assert_eq!(
            objects,
            vec![
                PathBuf::from("lead.o"),
                PathBuf::from("r1.o"),
                PathBuf::from("r2.o"),
                PathBuf::from("r3.o"),
                PathBuf::from("tail.o"),
            ]
        );
    }

    #[test]
    fn missing_response_file_is_an_error() {
        let err = expand_object_args(&["@/no/such/file.rsp".to_string()]).unwrap_err();
        assert!(matches!(err, ArchiveError::ResponseFile { .. }));
    }
}
