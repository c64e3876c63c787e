//! Rewrite engine: finds casing commands in wiki links, rewrites them and
//! works out where the caret should land afterwards.

mod pattern;


pub use pattern::{Form, Occurrence, find_occurrences};

use crate::Options;

/// Result of [`rewrite_with_caret`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    /// The rewritten text.  Equal to the input when `changed` is false.
    pub text: String,
    /// Where the caret belongs in `text`, when it was inside a rewritten
    /// occurrence.  `None` leaves caret placement to the host.
    pub caret: Option<usize>,
    /// Whether `text` differs from the input.
    pub changed: bool,
}

/// Rewrite every casing command in `text`.
///
/// Each pass applies the forms in [`Form::ALL`] order, every form scanning
/// the output of the previous one.  Passes repeat until the text is stable,
/// which only takes more than one pass when a rewritten alias ends up
/// spelling a new command.  Every changing pass removes at least one
/// backslash, so this terminates.
pub fn rewrite(text: &str, options: &Options) -> String {
    rewrite_tracking(text, options, None).0
}

/// Rewrite `text` and relocate a caret sitting at character offset `caret`.
///
/// If the caret lies within an occurrence (ends inclusive), it moves to just
/// after the rewritten link.  Forms are searched in [`Form::ALL`] order and
/// the first occurrence of the first form that contains the caret wins, so
/// a caret on the boundary between two adjacent occurrences follows the
/// earlier form.  The end of that occurrence is carried through every later
/// form and pass, so a link rewritten again by a stacked command still puts
/// the caret after its final closing brackets.  Offsets past the end of
/// `text` are clamped.
pub fn rewrite_with_caret(text: &str, caret: usize, options: &Options) -> Rewrite {
    let caret = caret.min(text.chars().count());
    let relocated = Form::ALL.iter().find_map(|&form| {
        find_occurrences(text, form)
            .into_iter()
            .find(|occurrence| occurrence.contains(caret))
    });

    let (output, anchor) = rewrite_tracking(text, options, relocated.as_ref().map(|o| o.end));
    if output == text {
        return Rewrite {
            text: output,
            caret: None,
            changed: false,
        };
    }

    let new_caret = anchor.map(|offset| offset.min(output.chars().count()));
    if let (Some(occurrence), Some(new)) = (&relocated, new_caret) {
        tracing::debug!(
            form = ?occurrence.form,
            old = caret,
            new,
            "moved caret past rewritten link"
        );
    }

    Rewrite {
        text: output,
        caret: new_caret,
        changed: true,
    }
}

/// Run rewrite passes until the text is stable, carrying `anchor` through
/// every form.
fn rewrite_tracking(
    text: &str,
    options: &Options,
    mut anchor: Option<usize>,
) -> (String, Option<usize>) {
    let mut output = text.to_string();
    loop {
        let mut changed = false;
        for form in Form::ALL {
            if let Some(replaced) = form.rewrite_all(&output, options, &mut anchor) {
                output = replaced;
                changed = true;
            }
        }
        if !changed {
            return (output, anchor);
        }
    }
}
