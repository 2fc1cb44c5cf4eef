use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::core::{NameError, Note, NoteName};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadMode {
    /// Missing or undecodable notes read as empty text.
    #[default]
    Lenient,
    Strict,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed opening note store {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed listing notes in {path}: {source}")]
    List {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid note name {name:?}: {source}")]
    InvalidName {
        name: String,
        #[source]
        source: NameError,
    },
    #[error("note not found: {name}")]
    NotFound { name: String },
    #[error("note already exists: {name}")]
    AlreadyExists { name: String },
    #[error("note {name} is not valid UTF-8")]
    InvalidUtf8 { name: String },
    #[error("failed reading note {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed writing note {name}: {source}")]
    Write {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed renaming note {from} to {to}: {source}")]
    Rename {
        from: String,
        to: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed deleting note {name}: {source}")]
    Delete {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Open { source, .. }
            | Self::List { source, .. }
            | Self::Read { source, .. }
            | Self::Write { source, .. }
            | Self::Rename { source, .. }
            | Self::Delete { source, .. } => source.kind(),
            Self::InvalidName { .. } => ErrorKind::InvalidInput,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::InvalidUtf8 { .. } => ErrorKind::InvalidData,
        }
    }
}

/// Flat directory of `.md` files. Nothing is cached: every call goes to disk.
#[derive(Debug, Clone)]
pub struct NoteStore {
    root: PathBuf,
    read_mode: ReadMode,
}

impl NoteStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StoreError::Open {
            path: root.display().to_string(),
            source,
        })?;
        Ok(Self {
            root,
            read_mode: ReadMode::default(),
        })
    }

    pub fn with_read_mode(mut self, read_mode: ReadMode) -> Self {
        self.read_mode = read_mode;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn list(&self) -> Result<Vec<NoteName>, StoreError> {
        let entries = fs::read_dir(&self.root).map_err(|source| StoreError::List {
            path: self.root.display().to_string(),
            source,
        })?;

        let names: Vec<NoteName> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|name| NoteName::is_listable(name))
            .filter_map(|name| NoteName::parse(&name).ok())
            .collect();
        tracing::debug!(count = names.len(), "listed notes");
        Ok(names)
    }

    pub fn read(&self, name: &str) -> Result<String, StoreError> {
        let name = parse_name(name)?;
        let path = self.path_for(&name);

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(source) => {
                return match (self.read_mode, source.kind()) {
                    (ReadMode::Lenient, ErrorKind::NotFound) => {
                        tracing::debug!(note = %name, "missing note read as empty");
                        Ok(String::new())
                    }
                    (ReadMode::Lenient, _) => {
                        tracing::warn!(note = %name, error = %source, "unreadable note read as empty");
                        Ok(String::new())
                    }
                    (ReadMode::Strict, ErrorKind::NotFound) => Err(StoreError::NotFound {
                        name: name.to_string(),
                    }),
                    (ReadMode::Strict, _) => Err(StoreError::Read {
                        name: name.to_string(),
                        source,
                    }),
                };
            }
        };

        match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(_) if self.read_mode == ReadMode::Lenient => {
                tracing::warn!(note = %name, "note is not valid UTF-8, read as empty");
                Ok(String::new())
            }
            Err(_) => Err(StoreError::InvalidUtf8 {
                name: name.to_string(),
            }),
        }
    }

    pub fn load(&self, name: &str) -> Result<Note, StoreError> {
        let content = self.read(name)?;
        Ok(Note {
            name: parse_name(name)?,
            content,
        })
    }

    /// Creates or overwrites a note. Without a name a fresh one is generated.
    pub fn write(&self, name: Option<&str>, content: &str) -> Result<NoteName, StoreError> {
        let name = match name {
            Some(raw) => parse_name(raw)?,
            None => self.fresh_name(),
        };
        let path = self.path_for(&name);
        let write_err = |source| StoreError::Write {
            name: name.to_string(),
            source,
        };

        // Staging files are dot-prefixed, so list() never reports them.
        let mut staging = NamedTempFile::new_in(&self.root).map_err(write_err)?;
        staging.write_all(content.as_bytes()).map_err(write_err)?;
        staging
            .persist(&path)
            .map_err(|persist| write_err(persist.error))?;

        tracing::info!(note = %name, bytes = content.len(), "wrote note");
        Ok(name)
    }

    /// Moves a note to a new name. Never overwrites an existing note.
    pub fn rename(&self, old: &str, new: &str) -> Result<NoteName, StoreError> {
        let from = parse_name(old)?;
        let to = parse_name(new)?;
        if from == to {
            return Ok(to);
        }

        let from_path = self.path_for(&from);
        let to_path = self.path_for(&to);
        if !from_path.is_file() {
            return Err(StoreError::NotFound {
                name: from.to_string(),
            });
        }
        if to_path.exists() {
            return Err(StoreError::AlreadyExists {
                name: to.to_string(),
            });
        }

        fs::rename(&from_path, &to_path).map_err(|source| StoreError::Rename {
            from: from.to_string(),
            to: to.to_string(),
            source,
        })?;
        tracing::info!(from = %from, to = %to, "renamed note");
        Ok(to)
    }

    pub fn delete(&self, name: &str) -> Result<(), StoreError> {
        let name = parse_name(name)?;
        match fs::remove_file(self.path_for(&name)) {
            Ok(()) => {
                tracing::info!(note = %name, "deleted note");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound {
                name: name.to_string(),
            }),
            Err(source) => Err(StoreError::Delete {
                name: name.to_string(),
                source,
            }),
        }
    }

    fn path_for(&self, name: &NoteName) -> PathBuf {
        self.root.join(name.as_str())
    }

    fn fresh_name(&self) -> NoteName {
        loop {
            let name = NoteName::generate();
            if !self.path_for(&name).exists() {
                return name;
            }
        }
    }
}

fn parse_name(raw: &str) -> Result<NoteName, StoreError> {
    NoteName::parse(raw).map_err(|source| StoreError::InvalidName {
        name: raw.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::io::ErrorKind;

    use tempfile::tempdir;

    use super::{NoteStore, ReadMode, StoreError};

    fn listed(store: &NoteStore) -> Vec<String> {
        let mut names: Vec<String> = store
            .list()
            .expect("list")
            .into_iter()
            .map(|n| n.to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn open_creates_missing_root() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path().join("nested").join("notes");
        let store = NoteStore::open(&root).expect("open");
        assert!(root.is_dir());
        assert_eq!(store.root(), root.as_path());
        assert!(listed(&store).is_empty());
    }

    #[test]
    fn write_then_read_roundtrips() {
        let dir = tempdir().expect("tempdir");
        let store = NoteStore::open(dir.path()).expect("open");

        let name = store.write(Some("journal.md"), "héllo\n\n- item").expect("write");
        assert_eq!(name.as_str(), "journal.md");
        assert_eq!(store.read("journal.md").expect("read"), "héllo\n\n- item");

        let empty = store.write(Some("blank"), "").expect("write empty");
        assert_eq!(store.read(empty.as_str()).expect("read empty"), "");
    }

    #[test]
    fn unnamed_write_gets_fresh_md_name() {
        let dir = tempdir().expect("tempdir");
        let store = NoteStore::open(dir.path()).expect("open");
        store.write(Some("existing"), "x").expect("write");
        let before = listed(&store);

        let name = store.write(None, "# Hello").expect("write");
        assert!(name.as_str().ends_with(".md"));
        assert!(!before.contains(&name.to_string()));
        assert_eq!(store.read(name.as_str()).expect("read"), "# Hello");

        store.delete(name.as_str()).expect("delete");
        assert!(!listed(&store).contains(&name.to_string()));
    }

    #[test]
    fn write_overwrites_and_leaves_no_staging_files() {
        let dir = tempdir().expect("tempdir");
        let store = NoteStore::open(dir.path()).expect("open");
        store.write(Some("notes.md"), "v1").expect("v1");
        store.write(Some("notes.md"), "v2").expect("v2");
        assert_eq!(store.read("notes.md").expect("read"), "v2");

        let on_disk: Vec<String> = std::fs::read_dir(dir.path())
            .expect("read_dir")
            .map(|e| e.expect("entry").file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(on_disk, vec!["notes.md".to_string()]);
    }

    #[test]
    fn list_only_returns_md_files() {
        let dir = tempdir().expect("tempdir");
        let store = NoteStore::open(dir.path()).expect("open");
        store.write(Some("a.md"), "a").expect("write");
        std::fs::write(dir.path().join("b.txt"), "b").expect("txt");
        std::fs::write(dir.path().join(".c.md.tmp"), "c").expect("tmp");
        std::fs::create_dir(dir.path().join("folder.md")).expect("dir");

        assert_eq!(listed(&store), vec!["a.md".to_string()]);
    }

    #[test]
    fn padded_file_names_are_not_confused_with_notes() {
        let dir = tempdir().expect("tempdir");
        let store = NoteStore::open(dir.path()).expect("open");
        std::fs::write(dir.path().join(" a.md"), "padded").expect("padded");
        std::fs::write(dir.path().join("a.md"), "plain").expect("plain");

        assert_eq!(listed(&store), vec!["a.md".to_string()]);

        let err = store.delete(" a.md").expect_err("padded delete");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(store.read(" a.md").is_err());
        assert!(store.write(Some(" a.md"), "x").is_err());
        assert!(store.rename("a.md", " a.md").is_err());

        assert!(dir.path().join(" a.md").exists());
        assert_eq!(store.read("a.md").expect("read"), "plain");
    }

    #[test]
    fn failed_write_leaves_no_staging_file() {
        let dir = tempdir().expect("tempdir");
        let store = NoteStore::open(dir.path()).expect("open");
        std::fs::create_dir(dir.path().join("x.md")).expect("dir");

        let err = store.write(Some("x.md"), "body").expect_err("write over dir");
        assert!(matches!(err, StoreError::Write { .. }));

        let on_disk: Vec<String> = std::fs::read_dir(dir.path())
            .expect("read_dir")
            .map(|e| e.expect("entry").file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(on_disk, vec!["x.md".to_string()]);
    }

    #[test]
    fn deleting_a_directory_reports_delete_error() {
        let dir = tempdir().expect("tempdir");
        let store = NoteStore::open(dir.path()).expect("open");
        std::fs::create_dir(dir.path().join("folder.md")).expect("dir");

        let err = store.delete("folder.md").expect_err("delete dir");
        assert!(matches!(err, StoreError::Delete { .. }));
        assert!(dir.path().join("folder.md").is_dir());
    }

    #[test]
    fn lenient_reads_treat_missing_and_binary_as_empty() {
        let dir = tempdir().expect("tempdir");
        let store = NoteStore::open(dir.path()).expect("open");
        std::fs::write(dir.path().join("bin.md"), [0xff, 0xfe, 0x00]).expect("bin");

        assert_eq!(store.read("ghost.md").expect("read missing"), "");
        assert_eq!(store.read("bin.md").expect("read binary"), "");
    }

    #[test]
    fn strict_reads_report_missing_and_binary() {
        let dir = tempdir().expect("tempdir");
        let store = NoteStore::open(dir.path())
            .expect("open")
            .with_read_mode(ReadMode::Strict);
        std::fs::write(dir.path().join("bin.md"), [0xff, 0xfe, 0x00]).expect("bin");

        let missing = store.read("ghost.md").expect_err("missing");
        assert!(matches!(missing, StoreError::NotFound { .. }));
        assert_eq!(missing.kind(), ErrorKind::NotFound);

        let binary = store.read("bin.md").expect_err("binary");
        assert!(matches!(binary, StoreError::InvalidUtf8 { .. }));
    }

    #[test]
    fn rename_to_same_name_is_noop() {
        let dir = tempdir().expect("tempdir");
        let store = NoteStore::open(dir.path()).expect("open");
        store.write(Some("a.md"), "keep").expect("write");

        let name = store.rename("a.md", "a").expect("rename");
        assert_eq!(name.as_str(), "a.md");
        assert_eq!(listed(&store), vec!["a.md".to_string()]);
        assert_eq!(store.read("a.md").expect("read"), "keep");
    }

    #[test]
    fn rename_moves_content_and_normalizes_suffix() {
        let dir = tempdir().expect("tempdir");
        let store = NoteStore::open(dir.path()).expect("open");
        store.write(Some("a.md"), "body").expect("write");

        let renamed = store.rename("a.md", "b").expect("rename");
        assert_eq!(renamed.as_str(), "b.md");
        assert_eq!(listed(&store), vec!["b.md".to_string()]);
        assert_eq!(store.read("b.md").expect("read"), "body");
    }

    #[test]
    fn rename_onto_existing_note_fails_without_changes() {
        let dir = tempdir().expect("tempdir");
        let store = NoteStore::open(dir.path()).expect("open");
        store.write(Some("a.md"), "alpha").expect("a");
        store.write(Some("b.md"), "beta").expect("b");

        let err = store.rename("a.md", "b.md").expect_err("conflict");
        assert!(matches!(err, StoreError::AlreadyExists { .. }));
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(store.read("a.md").expect("read a"), "alpha");
        assert_eq!(store.read("b.md").expect("read b"), "beta");
    }

    #[test]
    fn rename_missing_note_fails() {
        let dir = tempdir().expect("tempdir");
        let store = NoteStore::open(dir.path()).expect("open");
        let err = store.rename("nope.md", "b.md").expect_err("missing");
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn delete_removes_note_and_reports_missing() {
        let dir = tempdir().expect("tempdir");
        let store = NoteStore::open(dir.path()).expect("open");
        store.write(Some("gone.md"), "bye").expect("write");

        store.delete("gone.md").expect("delete");
        assert!(listed(&store).is_empty());
        assert_eq!(store.read("gone.md").expect("lenient read"), "");

        let err = store.delete("gone.md").expect_err("second delete");
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn invalid_names_are_rejected_everywhere() {
        let dir = tempdir().expect("tempdir");
        let store = NoteStore::open(dir.path()).expect("open");

        let err = store.write(Some("../escape.md"), "x").expect_err("write");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(store.read("").is_err());
        assert!(store.delete("a/b.md").is_err());
        assert!(store.rename("a.md", ".hidden").is_err());
    }

    #[test]
    fn load_bundles_normalized_name() {
        let dir = tempdir().expect("tempdir");
        let store = NoteStore::open(dir.path()).expect("open");
        store.write(Some("plan"), "steps").expect("write");

        let note = store.load("plan").expect("load");
        assert_eq!(note.name.as_str(), "plan.md");
        assert_eq!(note.content, "steps");
    }
}
