//! File-backed filter lists: blocked tags and blocked publisher IDs.
//!
//! Each list persists as one comma-joined line in its own plain-text file
//! under a per-user local data directory. Appends keep the trailing-comma
//! convention (`tok1,tok2,...,` or an empty file); loading strips the
//! spurious empty token that splitting on the trailing comma produces.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::constants::constants;

/// Which of the two filter lists an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
  /// Blocked tags — uniqueness enforced on insert.
  Tag,
  /// Blocked publisher IDs — duplicates allowed.
  Uid,
}

impl FilterKind {
  fn file_name(self) -> &'static str {
    match self {
      FilterKind::Tag => &constants().tag_filter_file,
      FilterKind::Uid => &constants().uid_filter_file,
    }
  }
}

/// One in-memory filter list with an explicit loaded flag.
///
/// The flag (rather than a "non-empty means loaded" heuristic) keeps a
/// genuinely empty list distinguishable from a never-loaded one.
#[derive(Debug, Default)]
struct FilterList {
  items: Vec<String>,
  loaded: bool,
}

/// Owns both filter lists and their backing files.
///
/// Constructed once at application start and handed to the view-model;
/// there is no process-wide shared state. All methods take `&mut self`,
/// so the single-writer assumption is enforced by the borrow checker.
#[derive(Debug)]
pub struct FilterStore {
  dir: PathBuf,
  tag: FilterList,
  uid: FilterList,
}

impl FilterStore {
  /// Store rooted at an arbitrary directory. The directory must exist.
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into(), tag: FilterList::default(), uid: FilterList::default() }
  }

  /// Store rooted at the per-user local data directory, created if absent.
  pub fn open_default() -> Result<Self> {
    let proj_dirs =
      ProjectDirs::from("", "", "popfeed").context("could not determine a home directory for filter lists")?;
    let dir = proj_dirs.data_local_dir();
    fs::create_dir_all(dir).with_context(|| format!("creating filter list directory {}", dir.display()))?;
    Ok(Self::new(dir))
  }

  fn file_path(&self, kind: FilterKind) -> PathBuf {
    self.dir.join(kind.file_name())
  }

  fn list(&self, kind: FilterKind) -> &FilterList {
    match kind {
      FilterKind::Tag => &self.tag,
      FilterKind::Uid => &self.uid,
    }
  }

  fn list_mut(&mut self, kind: FilterKind) -> &mut FilterList {
    match kind {
      FilterKind::Tag => &mut self.tag,
      FilterKind::Uid => &mut self.uid,
    }
  }

  /// Load one list from its backing file. Idempotent — a second call is a no-op.
  ///
  /// A missing file is self-healed by creating an empty one. Any other I/O
  /// failure is logged and leaves the list empty; filtering for that category
  /// simply does not trigger. The loaded flag is set either way so a broken
  /// file is not re-read on every batch.
  pub fn load(&mut self, kind: FilterKind) {
    if self.list(kind).loaded {
      return;
    }
    let path = self.file_path(kind);
    let contents = match read_or_create(&path) {
      Ok(c) => c,
      Err(e) => {
        warn!(path = %path.display(), err = %e, "failed to read filter list, leaving it empty");
        String::new()
      }
    };

    let mut tokens: Vec<String> = contents.split(',').map(str::to_string).collect();
    // Splitting "a,b," yields a trailing "" (and an empty file yields one "" token).
    if tokens.last().is_some_and(|t| t.is_empty()) {
      tokens.pop();
    }

    let list = self.list_mut(kind);
    list.items.extend(tokens);
    list.loaded = true;
  }

  /// Load both lists.
  pub fn load_all(&mut self) {
    self.load(FilterKind::Tag);
    self.load(FilterKind::Uid);
  }

  /// Append a value to a list and its backing file.
  ///
  /// Tags are deduplicated: adding a tag already present is a no-op for both
  /// memory and file. UIDs append unconditionally. The in-memory list is only
  /// updated after the file append succeeds, and append failures are surfaced
  /// so the caller can retry.
  pub fn add(&mut self, kind: FilterKind, value: &str) -> Result<()> {
    self.load(kind);
    if kind == FilterKind::Tag && self.tag.items.iter().any(|t| t == value) {
      return Ok(());
    }

    let path = self.file_path(kind);
    let mut file = fs::OpenOptions::new()
      .create(true)
      .append(true)
      .open(&path)
      .with_context(|| format!("opening filter list {}", path.display()))?;
    file
      .write_all(format!("{value},").as_bytes())
      .with_context(|| format!("appending to filter list {}", path.display()))?;

    self.list_mut(kind).items.push(value.to_string());
    Ok(())
  }

  /// Blocked tags, in insertion order.
  pub fn tags(&self) -> &[String] {
    &self.tag.items
  }

  /// Blocked publisher IDs, in insertion order.
  pub fn uids(&self) -> &[String] {
    &self.uid.items
  }
}

/// Read a file's full contents, creating it empty if it does not exist.
fn read_or_create(path: &Path) -> io::Result<String> {
  match fs::read_to_string(path) {
    Ok(contents) => Ok(contents),
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      fs::write(path, "")?;
      Ok(String::new())
    }
    Err(e) => Err(e),
  }
}
