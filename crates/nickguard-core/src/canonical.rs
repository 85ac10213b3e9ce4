//! Canonicalization of handles through an [`EquivalenceTable`]
//!
//! A fold pass walks the input left to right; at each position the longest
//! member starting there is replaced by its class representative, anything
//! else is copied through. Passes repeat until one changes nothing, so the
//! result is a fixed point of the fold.
//!
//! The working string never exceeds the length bound. A substitution that
//! would push it past the bound is not applied at that position; the rest
//! of the handle keeps folding. Because that decision depends only on the
//! string being folded, a canonical form folds to itself again.
//!
//! Declared groups can interact so that passes cycle between a few forms
//! instead of settling. The smallest form of the cycle is then taken as
//! canonical, which is reached again from any member of the cycle.

use crate::error::ConversionFailure;
use crate::table::EquivalenceTable;
use std::sync::Arc;

/// Upper bound on fold passes for one input
pub const MAX_FOLD_PASSES: usize = 16;

/// Folds handles into canonical form
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    table: Arc<EquivalenceTable>,
    max_len: usize,
}

impl Canonicalizer {
    /// Create canonicalizer over a table
    ///
    /// `max_len` bounds, in characters, both the input and every
    /// intermediate folded form.
    #[inline]
    #[must_use]
    pub fn new(table: Arc<EquivalenceTable>, max_len: usize) -> Self {
        Self { table, max_len }
    }

    /// Underlying table
    #[inline]
    #[must_use]
    pub fn table(&self) -> &EquivalenceTable {
        &self.table
    }

    /// Length bound in characters
    #[inline]
    #[must_use]
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Fold `input` into its canonical form
    ///
    /// Empty input yields empty output. If folding neither settles nor
    /// cycles within [`MAX_FOLD_PASSES`], the input is returned unfolded.
    ///
    /// # Errors
    /// [`ConversionFailure::HandleTooLong`] if `input` exceeds the bound.
    pub fn canonicalize(&self, input: &str) -> Result<String, ConversionFailure> {
        let len = input.chars().count();
        if len > self.max_len {
            return Err(ConversionFailure::HandleTooLong {
                len,
                max: self.max_len,
            });
        }

        if self.table.is_identity() {
            return Ok(input.to_string());
        }

        let mut current = input.to_string();
        let mut seen: Vec<String> = Vec::new();
        for _ in 0..MAX_FOLD_PASSES {
            let Some(next) = self.fold_once(&current) else {
                return Ok(current);
            };
            seen.push(current);

            if let Some(start) = seen.iter().position(|form| *form == next) {
                tracing::trace!(handle = input, cycle = seen.len() - start, "fold cycle");
                return Ok(seen.split_off(start).into_iter().min().unwrap_or(next));
            }
            current = next;
        }

        tracing::warn!(
            handle = input,
            passes = MAX_FOLD_PASSES,
            "folding did not settle, leaving handle unfolded"
        );
        Ok(input.to_string())
    }

    /// Canonicalize raw bytes, failing on invalid UTF-8
    ///
    /// # Errors
    /// [`ConversionFailure::InvalidUtf8`] plus everything
    /// [`Canonicalizer::canonicalize`] returns.
    pub fn canonicalize_bytes(&self, input: &[u8]) -> Result<String, ConversionFailure> {
        self.canonicalize(decode_handle(input)?)
    }

    /// One left-to-right substitution pass; `None` when nothing changed
    fn fold_once(&self, input: &str) -> Option<String> {
        let mut out = String::with_capacity(input.len());
        // Characters the working string may still grow by
        let mut slack = self.max_len.saturating_sub(input.chars().count());
        let mut changed = false;
        let mut pos = 0usize;

        while let Some(c) = input[pos..].chars().next() {
            match self.table.longest_match(c, &input[pos..], slack) {
                Some(sub) => {
                    let (representative, rep_len) = self.table.representative(sub.to);
                    out.push_str(representative);
                    slack = slack + sub.from_len - rep_len;
                    pos += sub.from.len();
                    changed = true;
                }
                None => {
                    out.push(c);
                    pos += c.len_utf8();
                }
            }
        }

        changed.then_some(out)
    }
}

/// Decode raw handle bytes as UTF-8
///
/// # Errors
/// [`ConversionFailure::InvalidUtf8`] with the length of the valid prefix.
pub fn decode_handle(bytes: &[u8]) -> Result<&str, ConversionFailure> {
    std::str::from_utf8(bytes).map_err(|e| ConversionFailure::InvalidUtf8 {
        valid_up_to: e.valid_up_to(),
    })
}
