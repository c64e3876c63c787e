//! Seam between the rewrite engine and the editor that embeds it.
//!
//! The editor implements [`Host`] and calls
//! [`Rewriter::handle_content_changed`] from its change notification.
//! Writing the rewritten text back raises another notification; the
//! [`ReentrancyGuard`] turns that nested call into a no-op so one keystroke
//! triggers at most one rewrite.

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Options;
use crate::config::ConfigError;
use crate::engine::rewrite_with_caret;

/// The editor surface the rewriter reads and writes.
///
/// Caret offsets are character offsets into [`Host::text`].
pub trait Host {
    /// The full document text.
    fn text(&self) -> String;

    /// Replace the full document text.  The host maps the caret through the
    /// change with its own policy; [`Host::set_caret`] may follow.
    fn set_text(&mut self, text: &str);

    /// The caret position.
    fn caret(&self) -> usize;

    /// Move the caret.
    fn set_caret(&mut self, offset: usize);
}

/// Settings persisted by the host across sessions.
///
/// Stored as JSON: `{"lowercaseFirstWordOnly": false}`.  A missing field
/// takes its default and unknown fields are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Make `\l` lowercase only the first word (default: false).
    pub lowercase_first_word_only: bool,
}

impl Settings {
    /// Parse settings from their JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize settings to their JSON form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// The engine options these settings select.
    pub fn options(&self) -> Options {
        Options {
            lowercase_first_word_only: self.lowercase_first_word_only,
        }
    }
}

/// Where [`Settings`] are loaded from and saved to.
pub trait ConfigStore {
    /// Load saved settings, or `None` if nothing was saved yet.
    fn load(&self) -> Result<Option<Settings>, ConfigError>;

    /// Persist settings.
    fn save(&self, settings: &Settings) -> Result<(), ConfigError>;
}

/// Settings kept in a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for JsonFileStore {
    fn load(&self) -> Result<Option<Settings>, ConfigError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| ConfigError::Io(self.path.clone(), e))?;
        Settings::from_json(&content)
            .map(Some)
            .map_err(|e| ConfigError::Json(self.path.clone(), e))
    }

    fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        let json = settings
            .to_json()
            .map_err(|e| ConfigError::Json(self.path.clone(), e))?;
        std::fs::write(&self.path, json).map_err(|e| ConfigError::Io(self.path.clone(), e))
    }
}

/// Settings kept in memory, for hosts that persist them elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: RefCell<Option<Settings>>,
}

impl MemoryStore {
    pub fn new(saved: Option<Settings>) -> Self {
        Self {
            saved: RefCell::new(saved),
        }
    }

    /// The most recently saved settings.
    pub fn saved(&self) -> Option<Settings> {
        *self.saved.borrow()
    }
}

impl ConfigStore for MemoryStore {
    fn load(&self) -> Result<Option<Settings>, ConfigError> {
        Ok(self.saved())
    }

    fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        *self.saved.borrow_mut() = Some(*settings);
        Ok(())
    }
}

/// Marks a host write as in flight.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    held: Cell<bool>,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the guard, or `None` if it is already held.  The guard is
    /// released when the returned token drops.
    pub fn enter(&self) -> Option<GuardToken<'_>> {
        if self.held.replace(true) {
            return None;
        }
        Some(GuardToken { guard: self })
    }

    pub fn is_held(&self) -> bool {
        self.held.get()
    }
}

/// Scope of one acquisition of a [`ReentrancyGuard`].
#[derive(Debug)]
pub struct GuardToken<'a> {
    guard: &'a ReentrancyGuard,
}

impl Drop for GuardToken<'_> {
    fn drop(&mut self) {
        self.guard.held.set(false);
    }
}

/// What [`Rewriter::handle_content_changed`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Called while the rewriter's own write was in flight.
    Skipped,
    /// Nothing to rewrite; the host was not touched.
    Unchanged,
    /// The host text was replaced.  `caret` is where the caret was moved,
    /// or `None` when the host's own mapping placed it.
    Rewritten { caret: Option<usize> },
}

/// Connects the rewrite engine to a host editor and its persisted settings.
#[derive(Debug)]
pub struct Rewriter<S> {
    store: S,
    settings: Cell<Settings>,
    guard: ReentrancyGuard,
}

impl<S: ConfigStore> Rewriter<S> {
    /// Create a rewriter with settings loaded from `store`.  Missing or
    /// unreadable settings fall back to the defaults.
    pub fn new(store: S) -> Self {
        let settings = match store.load() {
            Ok(settings) => settings.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load settings, using defaults");
                Settings::default()
            }
        };
        Self {
            store,
            settings: Cell::new(settings),
            guard: ReentrancyGuard::new(),
        }
    }

    pub fn settings(&self) -> Settings {
        self.settings.get()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Toggle first-word-only lowercasing and persist the change.
    ///
    /// The new value takes effect even if saving fails.
    pub fn set_lowercase_first_word_only(&self, enabled: bool) -> Result<(), ConfigError> {
        let settings = Settings {
            lowercase_first_word_only: enabled,
        };
        self.settings.set(settings);
        tracing::debug!(enabled, "lowercase first word only changed");
        self.store.save(&settings)
    }

    /// Rewrite the host's text after an edit.
    pub fn handle_content_changed<H: Host + ?Sized>(&self, host: &mut H) -> Outcome {
        if self.guard.is_held() {
            tracing::trace!("skipping change raised by our own write");
            return Outcome::Skipped;
        }

        let text = host.text();
        let caret = host.caret();
        let result = rewrite_with_caret(&text, caret, &self.settings().options());
        if !result.changed {
            return Outcome::Unchanged;
        }

        let Some(_token) = self.guard.enter() else {
            return Outcome::Skipped;
        };
        host.set_text(&result.text);
        if let Some(caret) = result.caret {
            host.set_caret(caret);
        }
        tracing::debug!(caret = ?result.caret, "rewrote document");
        Outcome::Rewritten {
            caret: result.caret,
        }
    }
}

/// An in-memory [`Host`].
///
/// Replacing the text maps the caret the way editors map a cursor through a
/// single edit: the changed region is what lies between the common prefix
/// and the common suffix of the old and new text.  A caret before it stays,
/// a caret after it shifts by the length difference, and a caret inside it
/// moves to the end of the new text for that region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buffer {
    text: String,
    caret: usize,
}

impl Buffer {
    pub fn new(text: impl Into<String>, caret: usize) -> Self {
        let text = text.into();
        let caret = caret.min(text.chars().count());
        Self { text, caret }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl Host for Buffer {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.caret = map_offset(&self.text, text, self.caret);
        self.text = text.to_string();
    }

    fn caret(&self) -> usize {
        self.caret
    }

    fn set_caret(&mut self, offset: usize) {
        self.caret = offset.min(self.text.chars().count());
    }
}

/// Map a character offset in `old` to the matching offset in `new`.
fn map_offset(old: &str, new: &str, offset: usize) -> usize {
    let old: Vec<char> = old.chars().collect();
    let new: Vec<char> = new.chars().collect();
    let offset = offset.min(old.len());

    let prefix = old.iter().zip(&new).take_while(|(a, b)| a == b).count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();
    let old_end = old.len() - suffix;
    let new_end = new.len() - suffix;

    if offset <= prefix {
        offset
    } else if offset >= old_end {
        offset - old_end + new_end
    } else {
        new_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewriter() -> Rewriter<MemoryStore> {
        Rewriter::new(MemoryStore::default())
    }

    #[test]
    fn test_settings_default() {
        assert!(!Settings::default().lowercase_first_word_only);
    }

    #[test]
    fn test_settings_json() {
        let settings = Settings::from_json(r#"{"lowercaseFirstWordOnly": true}"#).unwrap();
        assert!(settings.lowercase_first_word_only);
        let json = settings.to_json().unwrap();
        assert!(json.contains("\"lowercaseFirstWordOnly\": true"));
    }

    #[test]
    fn test_settings_json_missing_and_unknown_fields() {
        assert_eq!(Settings::from_json("{}").unwrap(), Settings::default());
        let settings = Settings::from_json(r#"{"other": 1, "lowercaseFirstWordOnly": true}"#)
            .unwrap();
        assert!(settings.lowercase_first_word_only);
    }

    #[test]
    fn test_settings_json_invalid() {
        assert!(Settings::from_json(r#"{"lowercaseFirstWordOnly": "yes"}"#).is_err());
    }

    #[test]
    fn test_guard_is_scoped() {
        let guard = ReentrancyGuard::new();
        {
            let token = guard.enter();
            assert!(token.is_some());
            assert!(guard.is_held());
            assert!(guard.enter().is_none());
        }
        assert!(!guard.is_held());
        assert!(guard.enter().is_some());
    }

    #[test]
    fn test_handle_content_changed_rewrites_and_moves_caret() {
        let rewriter = rewriter();
        let mut buffer = Buffer::new("See [[Link Name\\l]] here", 18);
        let outcome = rewriter.handle_content_changed(&mut buffer);
        assert_eq!(outcome, Outcome::Rewritten { caret: Some(27) });
        assert_eq!(buffer.as_str(), "See [[Link Name|link name]] here");
        assert_eq!(buffer.caret(), 27);
    }

    #[test]
    fn test_handle_content_changed_without_match_leaves_host_alone() {
        let rewriter = rewriter();
        let mut buffer = Buffer::new("plain [[Link]]", 3);
        assert_eq!(
            rewriter.handle_content_changed(&mut buffer),
            Outcome::Unchanged
        );
        assert_eq!(buffer, Buffer::new("plain [[Link]]", 3));
    }

    #[test]
    fn test_handle_content_changed_caret_outside_uses_host_mapping() {
        let rewriter = rewriter();
        let text = "[[Link\\u]] and more";
        let mut buffer = Buffer::new(text, text.chars().count());
        let outcome = rewriter.handle_content_changed(&mut buffer);
        assert_eq!(outcome, Outcome::Rewritten { caret: None });
        assert_eq!(buffer.as_str(), "[[Link|LINK]] and more");
        assert_eq!(buffer.caret(), buffer.as_str().chars().count());
    }

    #[test]
    fn test_handle_content_changed_uses_settings() {
        let store = MemoryStore::new(Some(Settings {
            lowercase_first_word_only: true,
        }));
        let rewriter = Rewriter::new(store);
        let mut buffer = Buffer::new("[[Link Name]]\\l", 15);
        rewriter.handle_content_changed(&mut buffer);
        assert_eq!(buffer.as_str(), "[[Link Name|link Name]]");
    }

    #[test]
    fn test_set_lowercase_first_word_only_persists() {
        let rewriter = rewriter();
        rewriter.set_lowercase_first_word_only(true).unwrap();
        assert!(rewriter.settings().lowercase_first_word_only);
        assert_eq!(
            rewriter.store().saved(),
            Some(Settings {
                lowercase_first_word_only: true,
            })
        );

        let mut buffer = Buffer::new("[[Link Name\\l]]", 0);
        rewriter.handle_content_changed(&mut buffer);
        assert_eq!(buffer.as_str(), "[[Link Name|link Name]]");
    }

    /// A host that reports its own writes back to the rewriter, the way
    /// editor change notifications do.
    struct EchoingHost<'r> {
        buffer: Buffer,
        rewriter: &'r Rewriter<MemoryStore>,
        nested: Vec<Outcome>,
    }

    impl Host for EchoingHost<'_> {
        fn text(&self) -> String {
            self.buffer.text()
        }

        fn set_text(&mut self, text: &str) {
            self.buffer.set_text(text);
            let rewriter = self.rewriter;
            let outcome = rewriter.handle_content_changed(self);
            self.nested.push(outcome);
        }

        fn caret(&self) -> usize {
            self.buffer.caret()
        }

        fn set_caret(&mut self, offset: usize) {
            self.buffer.set_caret(offset);
        }
    }

    #[test]
    fn test_nested_notification_is_skipped() {
        let rewriter = rewriter();
        let mut host = EchoingHost {
            buffer: Buffer::new("[[A\\u]]", 7),
            rewriter: &rewriter,
            nested: Vec::new(),
        };

        let outcome = rewriter.handle_content_changed(&mut host);
        assert_eq!(outcome, Outcome::Rewritten { caret: Some(5) });
        assert_eq!(host.nested, vec![Outcome::Skipped]);
        assert_eq!(host.buffer.as_str(), "[[A]]");

        // The guard is released once the write returns.
        host.buffer = Buffer::new("[[b]]\\u", 7);
        let outcome = rewriter.handle_content_changed(&mut host);
        assert_eq!(outcome, Outcome::Rewritten { caret: Some(7) });
        assert_eq!(host.buffer.as_str(), "[[b|B]]");
        assert_eq!(host.nested, vec![Outcome::Skipped, Outcome::Skipped]);
    }

    #[test]
    fn test_json_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data.json"));
        assert_eq!(store.load().unwrap(), None);

        let rewriter = Rewriter::new(store);
        rewriter.set_lowercase_first_word_only(true).unwrap();

        let reloaded = Rewriter::new(JsonFileStore::new(dir.path().join("data.json")));
        assert!(reloaded.settings().lowercase_first_word_only);
    }

    #[test]
    fn test_json_file_store_invalid_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(matches!(store.load(), Err(ConfigError::Json(_, _))));

        let rewriter = Rewriter::new(store);
        assert_eq!(rewriter.settings(), Settings::default());
    }

    #[test]
    fn test_map_offset() {
        // Before the change.
        assert_eq!(map_offset("ab[[x]]cd", "ab[[x|X]]cd", 1), 1);
        // After the change.
        assert_eq!(map_offset("ab[[x]]cd", "ab[[x|X]]cd", 8), 10);
        // Inside the change.
        assert_eq!(map_offset("abcXYZdef", "abcQdef", 4), 4);
        assert_eq!(map_offset("abc", "abc", 2), 2);
        assert_eq!(map_offset("abc", "", 2), 0);
        assert_eq!(map_offset("", "abc", 0), 0);
    }

    #[test]
    fn test_buffer_clamps_caret() {
        let mut buffer = Buffer::new("abc", 10);
        assert_eq!(buffer.caret(), 3);
        buffer.set_caret(99);
        assert_eq!(buffer.caret(), 3);
    }
}
