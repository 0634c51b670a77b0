//! Byte offset to line number mapping and brace matching.

/// Fixed number of lines assumed for a method body when brace matching
/// cannot find the closing brace.
pub const FALLBACK_BODY_LINES: usize = 10;

/// Maps byte offsets of a source text to 1-based line numbers
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
    len: usize,
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
        Self {
            starts,
            len: text.len(),
        }
    }

    /// 1-based line containing `offset`
    pub fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset).max(1)
    }

    /// Text of a 1-based line without its terminator
    pub fn line_text<'a>(&self, text: &'a str, line: usize) -> &'a str {
        if line == 0 || line > self.starts.len() {
            return "";
        }
        let start = self.starts[line - 1];
        let end = self.starts.get(line).copied().unwrap_or(self.len);
        text[start..end].trim_end_matches(['\n', '\r'])
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }
}

/// Find the byte offset of the `}` closing the block opened at `open_brace`.
///
/// Braces inside comments and string literals are counted like any other
/// brace, so the result can drift on such input.
pub fn find_block_end(text: &str, open_brace: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open_brace) != Some(&b'{') {
        return None;
    }

    let mut depth = 0usize;
    for (offset, byte) in bytes.iter().enumerate().skip(open_brace) {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// End line used when no balanced closing brace exists
pub fn fallback_line_end(line_start: usize) -> usize {
    line_start + FALLBACK_BODY_LINES
}

/// Resolve the last line of a body opened at `open_brace`
pub fn resolve_line_end(text: &str, lines: &LineIndex, open_brace: usize, line_start: usize) -> usize {
    match find_block_end(text, open_brace) {
        Some(close) => lines.line_of(close),
        None => fallback_line_end(line_start),
    }
}
