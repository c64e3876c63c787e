//! The four link forms that carry a casing command.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::Options;
use crate::casing::Command;

static POSTFIX_ALIAS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[(?P<target>[^\]|]+)\|(?P<alias>[^\]]+)\]\]\\(?P<cmd>[lutc])")
        .expect("valid postfix alias pattern")
});

static POSTFIX_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[(?P<target>[^\]|\\]+)\]\]\\(?P<cmd>[lutc])")
        .expect("valid postfix link pattern")
});

static INLINE_ALIAS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[(?P<target>[^\]|]+)\|(?P<alias>[^\]\\]+)\\(?P<cmd>[lutc])\]\]")
        .expect("valid inline alias pattern")
});

static INLINE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[(?P<target>[^\]|\\]+)\\(?P<cmd>[lutc])\]\]")
        .expect("valid inline link pattern")
});

/// Which of the four syntaxes an occurrence was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Form {
    /// `[[target|alias]]\cmd`
    PostfixAlias,
    /// `[[target]]\cmd`
    PostfixLink,
    /// `[[target|alias\cmd]]`
    InlineAlias,
    /// `[[target\cmd]]`
    InlineLink,
}

impl Form {
    /// All forms in the order a rewrite pass applies them.  Postfix forms
    /// come first so a trailing command is never read as part of an inline
    /// link's target.
    pub const ALL: [Form; 4] = [
        Form::PostfixAlias,
        Form::PostfixLink,
        Form::InlineAlias,
        Form::InlineLink,
    ];

    /// Whether the command applies to an explicit alias rather than the
    /// target.
    pub fn has_alias(self) -> bool {
        matches!(self, Form::PostfixAlias | Form::InlineAlias)
    }

    fn pattern(self) -> &'static Regex {
        match self {
            Form::PostfixAlias => &POSTFIX_ALIAS,
            Form::PostfixLink => &POSTFIX_LINK,
            Form::InlineAlias => &INLINE_ALIAS,
            Form::InlineLink => &INLINE_LINK,
        }
    }

    /// Rewrite every occurrence of this form in `text`, or return `None`
    /// when nothing matched.
    ///
    /// `anchor` is a character offset that follows the rewrite: an
    /// occurrence starting before it and reaching it moves the anchor to
    /// the end of that occurrence's replacement, and occurrences wholly
    /// before it shift it by their change in length.
    pub(crate) fn rewrite_all(
        self,
        text: &str,
        options: &Options,
        anchor: &mut Option<usize>,
    ) -> Option<String> {
        let mut output = String::with_capacity(text.len());
        let mut copied_bytes = 0;
        let mut scanned_chars = 0;
        let mut written_chars = 0;
        let mut mapped = *anchor;
        let mut matched = false;

        for caps in self.pattern().captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let Some(parts) = Parts::from_captures(&caps) else {
                continue;
            };
            let gap = &text[copied_bytes..whole.start()];
            let gap_chars = gap.chars().count();
            let start = scanned_chars + gap_chars;
            let end = start + whole.as_str().chars().count();

            let replacement = parts.render(options);
            tracing::trace!(form = ?self, from = whole.as_str(), to = %replacement, "rewrote link");
            output.push_str(gap);
            output.push_str(&replacement);
            let new_end = written_chars + gap_chars + replacement.chars().count();

            match *anchor {
                Some(offset) if start < offset && offset <= end => mapped = Some(new_end),
                Some(offset) if end < offset => mapped = Some(offset - end + new_end),
                _ => {}
            }

            copied_bytes = whole.end();
            scanned_chars = end;
            written_chars = new_end;
            matched = true;
        }

        if !matched {
            return None;
        }
        output.push_str(&text[copied_bytes..]);
        *anchor = mapped;
        Some(output)
    }
}

/// Captured pieces of one match.
struct Parts<'t> {
    target: &'t str,
    alias: Option<&'t str>,
    command: Command,
}

impl<'t> Parts<'t> {
    fn from_captures(caps: &Captures<'t>) -> Option<Self> {
        let target = caps.name("target")?.as_str();
        let alias = caps.name("alias").map(|m| m.as_str());
        let command = Command::from_char(caps.name("cmd")?.as_str().chars().next()?)?;
        Some(Self {
            target,
            alias,
            command,
        })
    }

    fn render(&self, options: &Options) -> String {
        match self.alias {
            Some(alias) => {
                let alias = self.command.apply(alias, options);
                format!("[[{}|{}]]", self.target, alias)
            }
            None => {
                let alias = self.command.apply(self.target, options);
                if alias == self.target && self.command.drops_unchanged_alias() {
                    format!("[[{}]]", self.target)
                } else {
                    format!("[[{}|{}]]", self.target, alias)
                }
            }
        }
    }
}

/// One located match of a [`Form`].
///
/// `start` and `end` are character offsets into the scanned text, with
/// `end` exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub form: Form,
    pub start: usize,
    pub end: usize,
    pub target: String,
    pub alias: Option<String>,
    pub command: Command,
}

impl Occurrence {
    /// Whether a caret at `offset` counts as inside this occurrence.  Both
    /// ends are inclusive.
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// The text this occurrence is rewritten into.
    ///
    /// Target-only forms collapse back to a plain link when the command
    /// leaves the target unchanged, except for `\t`, which always writes
    /// the alias.  Alias forms always keep the alias.
    pub fn replacement(&self, options: &Options) -> String {
        Parts {
            target: &self.target,
            alias: self.alias.as_deref(),
            command: self.command,
        }
        .render(options)
    }
}

/// Find every non-overlapping occurrence of `form` in `text`, left to right.
pub fn find_occurrences(text: &str, form: Form) -> Vec<Occurrence> {
    let mut occurrences = Vec::new();
    let mut scanned_bytes = 0;
    let mut scanned_chars = 0;

    for caps in form.pattern().captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let start = scanned_chars + text[scanned_bytes..whole.start()].chars().count();
        let end = start + whole.as_str().chars().count();
        scanned_bytes = whole.end();
        scanned_chars = end;

        if let Some(parts) = Parts::from_captures(&caps) {
            occurrences.push(Occurrence {
                form,
                start,
                end,
                target: parts.target.to_string(),
                alias: parts.alias.map(str::to_string),
                command: parts.command,
            });
        }
    }

    occurrences
}
