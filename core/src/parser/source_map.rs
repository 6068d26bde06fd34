//! Offset bookkeeping between the text a caller hands in and the text the
//! grammar actually parses.
//!
//! Pattern parsing rewrites its input in layers (dedent, placeholder
//! substitution, then a wrapper prefix such as `<?php`). Each layer records
//! its edits so that node positions can be reported against the caller's
//! text.

use crate::parser::types::Span;

/// One replacement: `rewritten[new_start..new_end]` stands for
/// `source[orig_start..orig_end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edit {
    pub new_start: usize,
    pub new_end: usize,
    pub orig_start: usize,
    pub orig_end: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    prefix_len: usize,
    /// Edit layers, oldest first. Offsets within a layer are sorted.
    layers: Vec<Vec<Edit>>,
    original_len: usize,
}

impl SourceMap {
    pub fn identity(original_len: usize) -> Self {
        Self {
            prefix_len: 0,
            layers: Vec::new(),
            original_len,
        }
    }

    pub fn push_layer(&mut self, edits: Vec<Edit>) {
        if !edits.is_empty() {
            self.layers.push(edits);
        }
    }

    pub fn with_prefix(mut self, prefix_len: usize) -> Self {
        self.prefix_len = prefix_len;
        self
    }

    /// Map an offset in the parsed text back to the caller's text. Offsets
    /// inside the wrapper prefix clamp to 0, offsets past the caller's text
    /// clamp to its length.
    pub fn to_original(&self, offset: usize) -> usize {
        let mut pos = offset.saturating_sub(self.prefix_len);
        for layer in self.layers.iter().rev() {
            pos = map_through(layer, pos);
        }
        pos.min(self.original_len)
    }
}

fn map_through(edits: &[Edit], pos: usize) -> usize {
    let idx = edits.partition_point(|e| e.new_start <= pos);
    if idx == 0 {
        return pos;
    }
    let edit = edits[idx - 1];
    if pos >= edit.new_end {
        pos - edit.new_end + edit.orig_end
    } else if pos == edit.new_start {
        edit.orig_start
    } else {
        edit.orig_end
    }
}

/// Byte offset to line/column lookup over the caller's text.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { starts }
    }

    /// 1-based line, 0-based column.
    pub fn position(&self, offset: usize) -> (u32, u32) {
        let line = self.starts.partition_point(|&s| s <= offset).saturating_sub(1);
        let col = offset - self.starts[line];
        (line as u32 + 1, col as u32)
    }

    pub fn span(&self, start_byte: usize, end_byte: usize) -> Span {
        let (start_line, start_col) = self.position(start_byte);
        let (end_line, end_col) = self.position(end_byte);
        Span {
            start_byte,
            end_byte,
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_across_substitution() {
        // "$X + 1" rewritten to "__mv_X + 1"
        let mut map = SourceMap::identity(6);
        map.push_layer(vec![Edit {
            new_start: 0,
            new_end: 6,
            orig_start: 0,
            orig_end: 2,
        }]);
        assert_eq!(map.to_original(0), 0);
        assert_eq!(map.to_original(6), 2);
        assert_eq!(map.to_original(3), 2);
        assert_eq!(map.to_original(9), 5);
    }

    #[test]
    fn prefix_and_suffix_clamp() {
        let map = SourceMap::identity(4).with_prefix(6);
        assert_eq!(map.to_original(2), 0);
        assert_eq!(map.to_original(8), 2);
        assert_eq!(map.to_original(11), 4);
    }

    #[test]
    fn deletion_layer_maps_past_removed_text() {
        // "  a\n  b" dedented to "a\nb"
        let mut map = SourceMap::identity(7);
        map.push_layer(vec![
            Edit { new_start: 0, new_end: 0, orig_start: 0, orig_end: 2 },
            Edit { new_start: 2, new_end: 2, orig_start: 4, orig_end: 6 },
        ]);
        assert_eq!(map.to_original(0), 2);
        assert_eq!(map.to_original(2), 6);
        assert_eq!(map.to_original(3), 7);
    }

    #[test]
    fn line_index_positions() {
        let index = LineIndex::new("ab\ncd\n");
        assert_eq!(index.position(0), (1, 0));
        assert_eq!(index.position(4), (2, 1));
        assert_eq!(index.position(6), (3, 0));
    }
}
