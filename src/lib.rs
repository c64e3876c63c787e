//! Linkcase rewrites casing commands written inside or after wiki links into
//! links with a recased alias.
//!
//! A casing command is a backslash followed by one of `l` (lower), `u`
//! (upper), `t` (title) or `c` (capital).  It can trail a complete link
//! (`[[Target]]\l`) or sit just before its closing brackets
//! (`[[Target\l]]`):
//!
//! ```
//! use linkcase::{Options, rewrite};
//!
//! let options = Options::default();
//! assert_eq!(rewrite("[[Link Name\\l]]", &options), "[[Link Name|link name]]");
//! assert_eq!(rewrite("[[Link Name]]\\u", &options), "[[Link Name|LINK NAME]]");
//! ```
//!
//! Editors embed the engine through [`Rewriter`], which reads and writes the
//! document through the [`Host`] trait and keeps the caret right after the
//! link the user was typing in.

pub mod casing;
pub mod config;
mod engine;
pub mod host;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use casing::Command;
pub use engine::{Form, Occurrence, Rewrite, find_occurrences, rewrite, rewrite_with_caret};
pub use host::{
    Buffer, ConfigStore, GuardToken, Host, JsonFileStore, MemoryStore, Outcome,
    ReentrancyGuard, Rewriter, Settings,
};

/// Options consulted by the casing transforms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Make `\l` lowercase only the first word instead of the whole text.
    /// Default: false.
    pub lowercase_first_word_only: bool,
}
