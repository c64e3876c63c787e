//! WebAssembly bindings for Linkcase.
//!
//! This module provides JavaScript-friendly bindings for editor plugins.
//! Offsets exchanged with JavaScript are UTF-16 code units, the unit of
//! JavaScript string indices.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::Options;

/// JavaScript-friendly options struct.
///
/// All fields are optional and use camelCase naming for JavaScript conventions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JsOptions {
    /// Make `\l` lowercase only the first word (default: false).
    pub lowercase_first_word_only: Option<bool>,
}

impl JsOptions {
    /// Convert JavaScript options to Rust Options.
    fn to_options(&self) -> Options {
        let mut opts = Options::default();
        if let Some(v) = self.lowercase_first_word_only {
            opts.lowercase_first_word_only = v;
        }
        opts
    }
}

/// Rewrite result handed back to JavaScript.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsRewrite {
    /// The rewritten text.
    pub text: String,
    /// New caret offset in UTF-16 code units, or null to let the editor map
    /// the caret itself.
    pub caret: Option<usize>,
    /// Whether the text changed.  When false the editor should not be
    /// touched.
    pub changed: bool,
}

fn parse_options(options: JsValue) -> Result<Options, JsError> {
    let js_opts: JsOptions = if options.is_undefined() || options.is_null() {
        JsOptions::default()
    } else {
        serde_wasm_bindgen::from_value(options).map_err(|e| JsError::new(&e.to_string()))?
    };
    Ok(js_opts.to_options())
}

/// Rewrite every casing command in `text`.
///
/// # Arguments
///
/// * `text` - Document text
/// * `options` - Optional options as a JavaScript object
#[wasm_bindgen]
pub fn rewrite(text: &str, options: JsValue) -> Result<String, JsError> {
    let opts = parse_options(options)?;
    Ok(crate::rewrite(text, &opts))
}

/// Rewrite `text` and relocate the caret.
///
/// # Arguments
///
/// * `text` - Document text
/// * `caret` - Caret offset in UTF-16 code units
/// * `options` - Optional options as a JavaScript object
///
/// # Returns
///
/// An object with `text`, `caret` (number or null) and `changed`.
#[wasm_bindgen(js_name = rewriteAtCaret)]
pub fn rewrite_at_caret(text: &str, caret: usize, options: JsValue) -> Result<JsValue, JsError> {
    let opts = parse_options(options)?;
    let result = rewrite_utf16(text, caret, &opts);
    serde_wasm_bindgen::to_value(&result).map_err(|e| JsError::new(&e.to_string()))
}

fn rewrite_utf16(text: &str, caret: usize, options: &Options) -> JsRewrite {
    let result = crate::rewrite_with_caret(text, utf16_to_char_offset(text, caret), options);
    let caret = result
        .caret
        .map(|offset| char_to_utf16_offset(&result.text, offset));
    JsRewrite {
        text: result.text,
        caret,
        changed: result.changed,
    }
}

/// Convert a UTF-16 offset to a character offset.  An offset that splits a
/// surrogate pair counts the character it splits.
fn utf16_to_char_offset(text: &str, offset: usize) -> usize {
    let mut units = 0;
    for (index, ch) in text.chars().enumerate() {
        if units >= offset {
            return index;
        }
        units += ch.len_utf16();
    }
    text.chars().count()
}

fn char_to_utf16_offset(text: &str, offset: usize) -> usize {
    text.chars().take(offset).map(char::len_utf16).sum()
}
