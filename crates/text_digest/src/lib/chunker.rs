//! # Chunker
//!
//! Fixed-window splitting of input text. Windows are measured in `char`s so a
//! cut never lands inside a UTF-8 code point, but there is no awareness of
//! word or sentence boundaries.

use std::{iter, num::NonZeroUsize};

use itertools::Itertools;

/// Default window size, in characters
pub const DEFAULT_CHUNK_SIZE: NonZeroUsize = match NonZeroUsize::new(5000) {
    Some(size) => size,
    None => unreachable!(),
};

/// A contiguous slice of the input text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    /// Position in submission order, used for diagnostics
    pub index: usize,
    /// Byte offset of the segment within the input
    pub start: usize,
    pub text: &'a str,
}

/// Splits `text` into consecutive windows of at most `max_size` characters.
///
/// Empty input yields no segments. Concatenating the segment texts in order
/// reproduces `text` exactly.
pub fn split(text: &str, max_size: NonZeroUsize) -> Vec<Segment<'_>> {
    text.char_indices()
        .step_by(max_size.get())
        .map(|(offset, _)| offset)
        .chain(iter::once(text.len()))
        .tuple_windows()
        .enumerate()
        .map(|(index, (start, end))| Segment {
            index,
            start,
            text: &text[start..end],
        })
        .collect()
}
