//! Code-context exclusion.
//!
//! Documentation that *describes* an attack string (a security README
//! quoting `ignore previous instructions` inside backticks) must not itself
//! trigger a block. The pattern matcher discards any match whose start lies
//! in a fenced code block (including the fence lines) or in an inline code
//! span.

use std::ops::Range;

/// Line-by-line tracker of markdown code fences.
#[derive(Debug, Default)]
pub struct CodeContext {
    open_fence: Option<Fence>,
}

#[derive(Debug, Clone, Copy)]
struct Fence {
    marker: char,
    len: usize,
}

/// Classification of a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineContext {
    /// Fence delimiter or a line inside a fenced block.
    Fenced,
    /// Ordinary text with the byte ranges of its inline code spans.
    Prose { spans: Vec<Range<usize>> },
}

impl LineContext {
    /// Returns `true` if a match starting at `byte_offset` is code.
    pub fn excludes(&self, byte_offset: usize) -> bool {
        match self {
            LineContext::Fenced => true,
            LineContext::Prose { spans } => spans.iter().any(|s| s.contains(&byte_offset)),
        }
    }
}

impl CodeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify the next line and advance the fence state.
    pub fn classify(&mut self, line: &str) -> LineContext {
        let fence = opening_fence(line);

        match (self.open_fence, fence) {
            (Some(open), Some(f)) if f.marker == open.marker && f.len >= open.len => {
                self.open_fence = None;
                LineContext::Fenced
            }
            (Some(_), _) => LineContext::Fenced,
            (None, Some(f)) => {
                self.open_fence = Some(f);
                LineContext::Fenced
            }
            (None, None) => LineContext::Prose {
                spans: inline_code_spans(line),
            },
        }
    }
}

/// Detect a ```` ``` ```` or `~~~` fence (three or more markers after at
/// most three spaces of indentation).
fn opening_fence(line: &str) -> Option<Fence> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let rest = &line[indent..];
    let marker = rest.chars().next()?;
    if marker != '`' && marker != '~' {
        return None;
    }
    let len = rest.chars().take_while(|&c| c == marker).count();
    (len >= 3).then_some(Fence { marker, len })
}

/// Byte ranges covered by inline code spans, delimiters included.
///
/// A span opens with a run of N backticks and closes at the next run of
/// exactly N backticks. An unclosed run is literal text.
pub fn inline_code_spans(line: &str) -> Vec<Range<usize>> {
    let bytes = line.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }
        let open_start = i;
        let run = backtick_run(bytes, i);
        let mut j = i + run;
        let mut closed = None;
        while j < bytes.len() {
            if bytes[j] == b'`' {
                let close_run = backtick_run(bytes, j);
                if close_run == run {
                    closed = Some(j + close_run);
                    break;
                }
                j += close_run;
            } else {
                j += 1;
            }
        }
        match closed {
            Some(end) => {
                spans.push(open_start..end);
                i = end;
            }
            None => i = open_start + run,
        }
    }

    spans
}

fn backtick_run(bytes: &[u8], start: usize) -> usize {
    bytes[start..].iter().take_while(|&&b| b == b'`').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_span_detection() {
        let line = "quote `ignore previous instructions` here";
        let spans = inline_code_spans(line);
        assert_eq!(spans.len(), 1);
        let start = line.find("ignore").unwrap();
        assert!(spans[0].contains(&start));
        assert!(!spans[0].contains(&line.find("here").unwrap()));
    }

    #[test]
    fn test_double_backtick_span() {
        let line = "a ``code with ` inside`` b";
        let spans = inline_code_spans(line);
        assert_eq!(spans, vec![2..24]);
    }

    #[test]
    fn test_unclosed_backtick_is_literal() {
        assert!(inline_code_spans("price is 5` maybe").is_empty());
    }

    #[test]
    fn test_fenced_block_tracking() {
        let mut ctx = CodeContext::new();
        assert!(matches!(ctx.classify("intro"), LineContext::Prose { .. }));
        assert_eq!(ctx.classify("```bash"), LineContext::Fenced);
        assert_eq!(ctx.classify("rm -rf /"), LineContext::Fenced);
        assert_eq!(ctx.classify("```"), LineContext::Fenced);
        assert!(matches!(ctx.classify("after"), LineContext::Prose { .. }));
    }

    #[test]
    fn test_mismatched_fence_marker_does_not_close() {
        let mut ctx = CodeContext::new();
        ctx.classify("~~~~");
        assert_eq!(ctx.classify("```"), LineContext::Fenced);
        assert_eq!(ctx.classify("still code"), LineContext::Fenced);
        assert_eq!(ctx.classify("~~~~"), LineContext::Fenced);
        assert!(matches!(ctx.classify("prose"), LineContext::Prose { .. }));
    }

    #[test]
    fn test_indented_code_is_not_a_fence() {
        let mut ctx = CodeContext::new();
        assert!(matches!(ctx.classify("    ```"), LineContext::Prose { .. }));
    }
}
