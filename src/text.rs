//! Text buffer with O(1) line slicing.
//!
//! CRLF normalization and trailing-newline handling that the inline
//! differ and the split-layout buffer population both depend on having
//! exactly the same way.

use std::sync::Arc;

/// A text buffer optimized for line-based access.
///
/// - Stores bytes as `Arc<[u8]>` for cheap cloning.
/// - Precomputes line start offsets for O(1) line slicing.
/// - Tracks whether the original content ended with a trailing newline.
/// - Normalizes CRLF to LF internally.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    bytes: Arc<[u8]>,
    line_starts: Vec<usize>,
    trailing_newline: bool,
}

impl TextBuffer {
    /// Create a new `TextBuffer` from a string. Normalizes CRLF to LF.
    pub fn new(input: &str) -> Self {
        let normalized = normalize_crlf(input.as_bytes());
        let trailing_newline = normalized.last() == Some(&b'\n');
        let line_starts = compute_line_starts(&normalized);
        Self {
            bytes: normalized.into(),
            line_starts,
            trailing_newline,
        }
    }

    /// Create an empty `TextBuffer`.
    pub fn empty() -> Self {
        Self {
            bytes: Arc::from([]),
            line_starts: vec![0],
            trailing_newline: false,
        }
    }

    /// Whether the source text ended with a trailing newline.
    pub fn had_trailing_newline(&self) -> bool {
        self.trailing_newline
    }

    /// Number of lines in the buffer. An empty buffer has 0 lines.
    pub fn line_count(&self) -> usize {
        self.line_starts.len().saturating_sub(1)
    }

    /// Get the bytes for a specific line (0-indexed), excluding the
    /// trailing newline. Returns `None` if out of bounds.
    pub fn line(&self, line_num: usize) -> Option<&[u8]> {
        if line_num >= self.line_count() {
            return None;
        }
        let start = self.line_starts[line_num];
        let end = self.line_starts[line_num + 1];
        let end = if end > start && self.bytes.get(end - 1) == Some(&b'\n') {
            end - 1
        } else {
            end
        };
        Some(&self.bytes[start..end])
    }

    /// Get all lines as owned strings. Invalid UTF-8 is replaced with
    /// U+FFFD. The trailing empty element produced by a final newline is
    /// stripped.
    pub fn lines(&self) -> Vec<String> {
        (0..self.line_count())
            .filter_map(|i| {
                self.line(i)
                    .map(|b| String::from_utf8_lossy(b).into_owned())
            })
            .collect()
    }

    /// Reconstruct the full text, optionally forcing a trailing newline.
    pub fn join_lines(lines: &[String], trailing_newline: bool) -> String {
        let mut out = lines.join("\n");
        if trailing_newline && !lines.is_empty() {
            out.push('\n');
        }
        out
    }

    /// Raw byte length.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Is the buffer empty?
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Split text into lines the same way `TextBuffer` does, without
/// constructing a buffer. Used by `InlineDiffer` which only needs the
/// line array and the trailing-newline flag.
pub fn split_lines(text: &str) -> (Vec<String>, bool) {
    if text.is_empty() {
        return (Vec::new(), false);
    }
    let buf = TextBuffer::new(text);
    (buf.lines(), buf.had_trailing_newline())
}

fn normalize_crlf(input: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        if i + 1 < input.len() && input[i] == b'\r' && input[i + 1] == b'\n' {
            output.push(b'\n');
            i += 2;
        } else {
            output.push(input[i]);
            i += 1;
        }
    }
    output
}

fn compute_line_starts(bytes: &[u8]) -> Vec<usize> {
    let mut starts = vec![0];
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'\n' {
            starts.push(i + 1);
        }
    }
    if !bytes.is_empty() && bytes.last() != Some(&b'\n') {
        starts.push(bytes.len());
    }
    starts
}
