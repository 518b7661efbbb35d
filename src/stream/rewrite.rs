//! Queued edits over a token buffer.
//!
//! Edits never touch the buffer. Each named program is a list of
//! instructions that is folded into at most one operation per token index
//! when rendering:
//!
//! - inserts at the same index combine, the later one rendering in front
//! - an insert at the start of a replaced range is folded into the
//!   replacement text, inserts strictly inside it are dropped
//! - a replace that covers an earlier one supersedes it; partially
//!   overlapping replaces are rejected (overlapping deletes merge)

use indexmap::IndexMap;
use smol_str::SmolStr;
use tracing::trace;

use crate::base::Token;
use crate::errors::{RecognitionError, RecognitionResult};

pub const DEFAULT_PROGRAM: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq)]
enum RewriteOp {
    InsertBefore {
        index: usize,
        text: SmolStr,
    },
    /// Replace `from..=to`; `None` deletes.
    Replace {
        from: usize,
        to: usize,
        text: Option<SmolStr>,
    },
}

impl RewriteOp {
    fn index(&self) -> usize {
        match self {
            Self::InsertBefore { index, .. } => *index,
            Self::Replace { from, .. } => *from,
        }
    }
}

/// Named programs of token edits.
#[derive(Debug, Clone, Default)]
pub struct TokenRewriter {
    programs: IndexMap<SmolStr, Vec<RewriteOp>>,
}

impl TokenRewriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn program_mut(&mut self, program: &str) -> &mut Vec<RewriteOp> {
        self.programs.entry(SmolStr::new(program)).or_default()
    }

    pub fn insert_before(&mut self, program: &str, index: usize, text: impl Into<SmolStr>) {
        let text = text.into();
        self.program_mut(program)
            .push(RewriteOp::InsertBefore { index, text });
    }

    pub fn insert_after(&mut self, program: &str, index: usize, text: impl Into<SmolStr>) {
        self.insert_before(program, index + 1, text);
    }

    pub fn replace(
        &mut self,
        program: &str,
        from: usize,
        to: usize,
        text: impl Into<SmolStr>,
    ) -> RecognitionResult<()> {
        self.push_replace(program, from, to, Some(text.into()))
    }

    pub fn delete(&mut self, program: &str, from: usize, to: usize) -> RecognitionResult<()> {
        self.push_replace(program, from, to, None)
    }

    fn push_replace(
        &mut self,
        program: &str,
        from: usize,
        to: usize,
        text: Option<SmolStr>,
    ) -> RecognitionResult<()> {
        if from > to {
            return Err(RecognitionError::invalid_argument(format!(
                "replace range {from}..{to} is reversed"
            )));
        }
        self.program_mut(program)
            .push(RewriteOp::Replace { from, to, text });
        Ok(())
    }

    /// Drop every instruction of `program` from `instruction` onwards.
    pub fn rollback(&mut self, program: &str, instruction: usize) {
        if let Some(ops) = self.programs.get_mut(program) {
            ops.truncate(instruction);
        }
    }

    pub fn delete_program(&mut self, program: &str) {
        self.rollback(program, 0);
    }

    /// Number of instructions queued in `program`.
    pub fn instruction_count(&self, program: &str) -> usize {
        self.programs.get(program).map_or(0, Vec::len)
    }

    pub fn program_names(&self) -> impl Iterator<Item = &str> {
        self.programs.keys().map(SmolStr::as_str)
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Text of `tokens[start..=stop]` with no edits applied.
    pub fn render_original(&self, tokens: &[Token], start: usize, stop: usize) -> String {
        tokens
            .iter()
            .take(stop.saturating_add(1))
            .skip(start)
            .filter(|t| !t.is_eof())
            .map(|t| t.text.as_str())
            .collect()
    }

    /// Text of the whole buffer with the default program applied.
    pub fn render_all(&self, tokens: &[Token]) -> RecognitionResult<String> {
        self.render(tokens, DEFAULT_PROGRAM, 0, tokens.len().saturating_sub(1))
    }

    /// Text of `tokens[start..=stop]` with `program` applied.
    pub fn render(
        &self,
        tokens: &[Token],
        program: &str,
        start: usize,
        stop: usize,
    ) -> RecognitionResult<String> {
        let Some(ops) = self.programs.get(program).filter(|ops| !ops.is_empty()) else {
            return Ok(self.render_original(tokens, start, stop));
        };
        let last = tokens.len().saturating_sub(1);
        let stop = stop.min(last);
        let by_index = reduce_to_single_op_per_index(ops)?;
        trace!(program, ops = by_index.len(), "rendering rewrite program");

        let mut out = String::new();
        let mut i = start;
        while i <= stop && i < tokens.len() {
            match by_index.get(&i) {
                Some(RewriteOp::InsertBefore { text, .. }) => {
                    out.push_str(text);
                    push_token(&mut out, &tokens[i]);
                    i += 1;
                }
                Some(RewriteOp::Replace { to, text, .. }) => {
                    if let Some(text) = text {
                        out.push_str(text);
                    }
                    i = to + 1;
                }
                None => {
                    push_token(&mut out, &tokens[i]);
                    i += 1;
                }
            }
        }

        // Inserts past the last token only render when the range reaches
        // the end of the buffer.
        if stop == last {
            let mut tail: Vec<_> = by_index
                .iter()
                .filter(|(index, _)| **index > last)
                .collect();
            tail.sort_by_key(|(index, _)| **index);
            for (_, op) in tail {
                if let RewriteOp::InsertBefore { text, .. } = op {
                    out.push_str(text);
                }
            }
        }
        Ok(out)
    }
}

fn push_token(out: &mut String, token: &Token) {
    if !token.is_eof() {
        out.push_str(&token.text);
    }
}

/// Fold a program into one operation per token index.
fn reduce_to_single_op_per_index(
    ops: &[RewriteOp],
) -> RecognitionResult<rustc_hash::FxHashMap<usize, RewriteOp>> {
    let mut rewrites: Vec<Option<RewriteOp>> = ops.iter().cloned().map(Some).collect();

    // Replaces against every earlier instruction.
    for i in 0..rewrites.len() {
        let Some(RewriteOp::Replace { from, to, text }) = rewrites[i].clone() else {
            continue;
        };
        let (mut from, mut to) = (from, to);
        for j in 0..i {
            match rewrites[j].clone() {
                Some(RewriteOp::InsertBefore { index, .. }) if index >= from && index <= to => {
                    if index == from {
                        // Folded into the replacement text below.
                        continue;
                    }
                    rewrites[j] = None;
                }
                Some(RewriteOp::Replace {
                    from: prev_from,
                    to: prev_to,
                    text: prev_text,
                }) => {
                    if prev_from >= from && prev_to <= to {
                        rewrites[j] = None;
                        continue;
                    }
                    let disjoint = prev_to < from || prev_from > to;
                    if disjoint {
                        continue;
                    }
                    if prev_text.is_none() && text.is_none() {
                        rewrites[j] = None;
                        from = from.min(prev_from);
                        to = to.max(prev_to);
                        rewrites[i] = Some(RewriteOp::Replace {
                            from,
                            to,
                            text: None,
                        });
                        continue;
                    }
                    return Err(RecognitionError::invalid_argument(format!(
                        "replace {from}..{to} overlaps previous replace {prev_from}..{prev_to}"
                    )));
                }
                _ => {}
            }
        }
    }

    // Inserts against every earlier instruction.
    for i in 0..rewrites.len() {
        let Some(RewriteOp::InsertBefore { index, text }) = rewrites[i].clone() else {
            continue;
        };
        let mut text = text;
        for j in 0..i {
            match rewrites[j].clone() {
                Some(RewriteOp::InsertBefore {
                    index: prev_index,
                    text: prev_text,
                }) if prev_index == index => {
                    text = SmolStr::from(format!("{text}{prev_text}"));
                    rewrites[i] = Some(RewriteOp::InsertBefore {
                        index,
                        text: text.clone(),
                    });
                    rewrites[j] = None;
                }
                Some(RewriteOp::Replace { from, to, text: rep }) if index == from => {
                    let merged = format!("{text}{}", rep.as_deref().unwrap_or(""));
                    rewrites[j] = Some(RewriteOp::Replace {
                        from,
                        to,
                        text: Some(SmolStr::from(merged)),
                    });
                    rewrites[i] = None;
                    break;
                }
                Some(RewriteOp::Replace { from, to, .. }) if index > from && index <= to => {
                    return Err(RecognitionError::invalid_argument(format!(
                        "insert at {index} falls inside previous replace {from}..{to}"
                    )));
                }
                _ => {}
            }
        }
    }

    // Inserts queued before a replace starting at the same index render in
    // front of the replacement text.
    for i in 0..rewrites.len() {
        let Some(RewriteOp::Replace { from, to, text }) = rewrites[i].clone() else {
            continue;
        };
        for j in 0..i {
            if let Some(RewriteOp::InsertBefore { index, text: ins }) = rewrites[j].clone() {
                if index == from {
                    let merged = format!("{ins}{}", text.as_deref().unwrap_or(""));
                    rewrites[i] = Some(RewriteOp::Replace {
                        from,
                        to,
                        text: Some(SmolStr::from(merged)),
                    });
                    rewrites[j] = None;
                }
            }
        }
    }

    let mut by_index = rustc_hash::FxHashMap::default();
    for op in rewrites.into_iter().flatten() {
        let index = op.index();
        if by_index.insert(index, op).is_some() {
            return Err(RecognitionError::invalid_argument(format!(
                "more than one rewrite operation at index {index}"
            )));
        }
    }
    Ok(by_index)
}
