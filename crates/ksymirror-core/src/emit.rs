//! Block-style YAML emitter for mirrored `.ksy` documents.
//!
//! Output rules:
//! - mapping keys keep their source order,
//! - every nested collection is indented two spaces under its parent, including
//!   sequences under a mapping key (no "indentless" sequences),
//! - strings spanning more than one line are emitted as literal blocks with
//!   the chomping indicator that round-trips their trailing newlines,
//! - everything else is rendered by `serde_yaml` so quoting stays correct.
//!
//! The result stays diff-friendly against the gallery's hand-written sources.

use std::fmt::Write as _;

use serde_yaml::value::TaggedValue;
use serde_yaml::{Mapping, Value};

use crate::error::{MirrorError, MirrorResult};
use crate::spec_id::SpecId;

const INDENT: usize = 2;

/// Render a document tree as YAML text.
pub fn to_ksy_string(spec: &SpecId, root: &Mapping) -> MirrorResult<String> {
    let mut emitter = Emitter {
        spec,
        out: String::new(),
    };
    if root.is_empty() {
        emitter.out.push_str("{}\n");
    } else {
        emitter.mapping(root, 0, false)?;
    }
    Ok(emitter.out)
}

struct Emitter<'a> {
    spec: &'a SpecId,
    out: String,
}

impl Emitter<'_> {
    fn pad(&mut self, indent: usize) {
        self.out.extend(std::iter::repeat(' ').take(indent));
    }

    /// Emit `map` with keys at column `indent`. With `inline_first`, the
    /// caller has already positioned the cursor for the first key (`- `).
    fn mapping(&mut self, map: &Mapping, indent: usize, inline_first: bool) -> MirrorResult<()> {
        for (i, (key, value)) in map.iter().enumerate() {
            if i > 0 || !inline_first {
                self.pad(indent);
            }
            let key = self.key(key)?;
            self.out.push_str(&key);
            self.out.push(':');
            self.node_after_indicator(value, indent)?;
        }
        Ok(())
    }

    fn sequence(&mut self, seq: &[Value], indent: usize, inline_first: bool) -> MirrorResult<()> {
        for (i, item) in seq.iter().enumerate() {
            if i > 0 || !inline_first {
                self.pad(indent);
            }
            self.out.push('-');
            match item {
                Value::Mapping(m) if !m.is_empty() => {
                    self.out.push(' ');
                    self.mapping(m, indent + INDENT, true)?;
                }
                Value::Sequence(s) if !s.is_empty() => {
                    self.out.push(' ');
                    self.sequence(s, indent + INDENT, true)?;
                }
                other => self.node_after_indicator(other, indent)?,
            }
        }
        Ok(())
    }

    /// Emit a node that follows `key:` or `-` on the current line. `indent`
    /// is the column of that key or dash.
    fn node_after_indicator(&mut self, value: &Value, indent: usize) -> MirrorResult<()> {
        match value {
            Value::Mapping(m) if !m.is_empty() => {
                self.out.push('\n');
                self.mapping(m, indent + INDENT, false)
            }
            Value::Sequence(s) if !s.is_empty() => {
                self.out.push('\n');
                self.sequence(s, indent + INDENT, false)
            }
            Value::Tagged(tagged) => self.tagged(tagged, indent),
            Value::String(s) if literal_block_eligible(s) => {
                self.literal_block(s, indent + INDENT);
                Ok(())
            }
            scalar => {
                let text = self.scalar(scalar)?;
                self.out.push(' ');
                self.out.push_str(&text);
                self.out.push('\n');
                Ok(())
            }
        }
    }

    fn tagged(&mut self, tagged: &TaggedValue, indent: usize) -> MirrorResult<()> {
        let _ = write!(self.out, " {}", tagged.tag);
        match &tagged.value {
            Value::Mapping(m) if !m.is_empty() => {
                self.out.push('\n');
                self.mapping(m, indent + INDENT, false)
            }
            Value::Sequence(s) if !s.is_empty() => {
                self.out.push('\n');
                self.sequence(s, indent + INDENT, false)
            }
            Value::Tagged(_) => Err(self.error("nested tags are not supported")),
            inner => self.node_after_indicator(inner, indent),
        }
    }

    fn literal_block(&mut self, text: &str, indent: usize) {
        let trailing = text.len() - text.trim_end_matches('\n').len();
        let chomp = match trailing {
            0 => "|-",
            1 => "|",
            _ => "|+",
        };
        self.out.push(' ');
        self.out.push_str(chomp);
        self.out.push('\n');

        for line in text.trim_end_matches('\n').split('\n') {
            if !line.is_empty() {
                self.pad(indent);
                self.out.push_str(line);
            }
            self.out.push('\n');
        }
        for _ in 1..trailing {
            self.out.push('\n');
        }
    }

    fn key(&self, key: &Value) -> MirrorResult<String> {
        match key {
            Value::Mapping(_) | Value::Sequence(_) | Value::Tagged(_) => {
                Err(self.error("complex mapping keys are not supported"))
            }
            scalar => self.scalar(scalar),
        }
    }

    /// Single-line rendering of a scalar.
    fn scalar(&self, value: &Value) -> MirrorResult<String> {
        match value {
            Value::Mapping(_) => return Ok("{}".to_string()),
            Value::Sequence(_) => return Ok("[]".to_string()),
            Value::String(s) if s.chars().any(|c| c.is_control() || is_unicode_break(c)) => {
                return Ok(double_quoted(s));
            }
            _ => {}
        }

        let rendered = serde_yaml::to_string(value).map_err(|e| self.error(e.to_string()))?;
        let rendered = rendered.trim_end_matches('\n');
        let rendered = rendered.strip_prefix("--- ").unwrap_or(rendered);
        if rendered.contains('\n') {
            // Folded by the underlying emitter; keep it on one line instead.
            return match value {
                Value::String(s) => Ok(double_quoted(s)),
                _ => Err(self.error("scalar did not render on a single line")),
            };
        }
        Ok(rendered.to_string())
    }

    fn error(&self, reason: impl Into<String>) -> MirrorError {
        MirrorError::Serialize {
            spec: self.spec.clone(),
            reason: reason.into(),
        }
    }
}

/// Whether `s` can be written as a literal block scalar without an explicit
/// indentation indicator and still read back identically.
fn literal_block_eligible(s: &str) -> bool {
    if s.lines().count() < 2 {
        return false;
    }
    if s.chars().any(|c| c.is_control() && c != '\n' && c != '\t') {
        return false;
    }
    // YAML treats NEL, LS and PS as line breaks inside block scalars.
    if s.chars().any(is_unicode_break) {
        return false;
    }
    if s.trim_end_matches('\n').is_empty() {
        return false;
    }
    match s.lines().find(|l| !l.is_empty()) {
        Some(first) => !first.starts_with([' ', '\t']),
        None => false,
    }
}

fn is_unicode_break(c: char) -> bool {
    matches!(c, '\u{85}' | '\u{2028}' | '\u{2029}')
}

fn double_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            '\u{2028}' | '\u{2029}' | '\u{feff}' => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c if c.is_control() => {
                let code = c as u32;
                if code <= 0xff {
                    let _ = write!(out, "\\x{code:02x}");
                } else {
                    let _ = write!(out, "\\u{code:04x}");
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
