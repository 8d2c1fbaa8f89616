// Shared scanning primitives.
//
// Every parser in the crate walks a buffer of Unicode scalars and advances through
// `next_index`/`Cursor::advance`, so `/* ... */` comments are skipped in one place.
// Comments never nest: the first `*/` after an opening `/*` closes it.

use crate::error::ScanError;

pub fn scalars(source: &str) -> Vec<char> {
    source.chars().collect()
}

fn opens_comment(buf: &[char], index: usize) -> bool {
    buf.get(index) == Some(&'/') && buf.get(index + 1) == Some(&'*')
}

// Index just past the `*/` closing the comment opened at `open`.
fn comment_end(buf: &[char], open: usize) -> Result<usize, ScanError> {
    let mut i = open + 2;
    while i + 1 < buf.len() {
        if buf[i] == '*' && buf[i + 1] == '/' {
            return Ok(i + 2);
        }
        i += 1;
    }
    Err(ScanError::UnterminatedComment { offset: open })
}

/// First index at or after `index` that does not begin a comment.
pub fn first_index(buf: &[char], mut index: usize) -> Result<usize, ScanError> {
    while opens_comment(buf, index) {
        index = comment_end(buf, index)?;
    }
    Ok(index)
}

/// The index after `index`, skipping any comment that starts there.
pub fn next_index(buf: &[char], index: usize) -> Result<usize, ScanError> {
    first_index(buf, index + 1)
}

pub fn strip_comments(source: &str) -> Result<String, ScanError> {
    let buf = scalars(source);
    let mut out = String::with_capacity(source.len());
    let mut i = first_index(&buf, 0)?;
    while i < buf.len() {
        out.push(buf[i]);
        i = next_index(&buf, i)?;
    }
    Ok(out)
}

/// Mutable position over a scalar buffer.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    buf: &'a [char],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [char]) -> Result<Self, ScanError> {
        let pos = first_index(buf, 0)?;
        Ok(Self { buf, pos })
    }

    pub fn buffer(&self) -> &'a [char] {
        self.buf
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.buf.get(self.pos).copied()
    }

    /// Scalar `n` positions ahead, ignoring comments.
    pub fn peek_raw(&self, n: usize) -> Option<char> {
        self.buf.get(self.pos + n).copied()
    }

    pub fn advance(&mut self) -> Result<(), ScanError> {
        if !self.is_at_end() {
            self.pos = next_index(self.buf, self.pos)?;
        }
        Ok(())
    }

    // Inside quoted strings `/*` is literal text.
    pub fn advance_raw(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    /// Step past any comments starting at the current position.
    pub fn skip_comments(&mut self) -> Result<(), ScanError> {
        self.pos = first_index(self.buf, self.pos)?;
        Ok(())
    }

    pub fn skip_while(&mut self, mut pred: impl FnMut(char) -> bool) -> Result<(), ScanError> {
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.advance()?;
        }
        Ok(())
    }

    pub fn skip_whitespace(&mut self) -> Result<(), ScanError> {
        self.skip_while(char::is_whitespace)
    }
}

/// Split a leading unsigned numeric literal from its unit suffix.
///
/// Digits and at most one `.` form the number; a second `.` ends it and becomes part
/// of the unit. The unit runs to the first whitespace or the end of `buf`.
pub fn number_and_unit(buf: &[char]) -> (Option<f64>, Option<String>) {
    let mut i = 0usize;
    let mut seen_period = false;
    let mut seen_digit = false;
    while i < buf.len() {
        let ch = buf[i];
        if ch.is_ascii_digit() {
            seen_digit = true;
        } else if ch == '.' && !seen_period {
            seen_period = true;
        } else {
            break;
        }
        i += 1;
    }

    let value = if seen_digit {
        buf[..i].iter().collect::<String>().parse::<f64>().ok()
    } else {
        None
    };

    let unit_end = buf[i..]
        .iter()
        .position(|c| c.is_whitespace())
        .map(|p| i + p)
        .unwrap_or(buf.len());
    let unit = if unit_end > i {
        Some(buf[i..unit_end].iter().collect::<String>())
    } else {
        None
    };

    (value, unit)
}

pub fn number_and_unit_str(source: &str) -> (Option<f64>, Option<String>) {
    number_and_unit(&scalars(source))
}

/// 1-based line of `offset`, counted by the newlines before it.
pub fn line_number(buf: &[char], offset: usize) -> usize {
    let end = offset.min(buf.len());
    1 + buf[..end].iter().filter(|c| **c == '\n').count()
}

const SNIPPET_LEN: usize = 24;

pub fn diagnostic(source: &str, offset: usize) -> String {
    let buf = scalars(source);
    let line = line_number(&buf, offset);
    let snippet: String = buf
        .iter()
        .skip(offset)
        .take_while(|c| **c != '\n')
        .take(SNIPPET_LEN)
        .collect();
    if snippet.is_empty() {
        format!("line {line}: >>> end of input <<<")
    } else {
        format!("line {line}: >>> {snippet} <<<")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comments_without_nesting() {
        let stripped = strip_comments("Test/String /*** ** test/ */ a test").expect("strip");
        assert_eq!(stripped, "Test/String  a test");
    }

    #[test]
    fn inner_comment_opener_does_not_nest() {
        let stripped = strip_comments("a/* one /* two */b */").expect("strip");
        assert_eq!(stripped, "ab */");
    }

    #[test]
    fn adjacent_comments_are_skipped_together() {
        let stripped = strip_comments("/*x*//*y*/z").expect("strip");
        assert_eq!(stripped, "z");
    }

    #[test]
    fn unterminated_comment_reports_opening_offset() {
        let err = strip_comments("abc /* never closed").expect_err("unterminated");
        assert_eq!(err, ScanError::UnterminatedComment { offset: 4 });
    }

    #[test]
    fn star_slash_reusing_the_opener_does_not_close() {
        let err = strip_comments("/*/").expect_err("unterminated");
        assert_eq!(err.offset(), 0);
    }

    #[test]
    fn cursor_advances_over_comments() {
        let buf = scalars("/*lead*/a/*mid*/b");
        let mut cursor = Cursor::new(&buf).expect("cursor");
        assert_eq!(cursor.peek(), Some('a'));
        cursor.advance().expect("advance");
        assert_eq!(cursor.peek(), Some('b'));
        cursor.advance().expect("advance");
        assert!(cursor.is_at_end());
    }

    #[test]
    fn extracts_number_and_unit() {
        assert_eq!(number_and_unit_str("3.5pt"), (Some(3.5), Some("pt".to_string())));
        assert_eq!(number_and_unit_str("50%"), (Some(50.0), Some("%".to_string())));
        assert_eq!(number_and_unit_str("12"), (Some(12.0), None));
        assert_eq!(number_and_unit_str("em"), (None, Some("em".to_string())));
    }

    #[test]
    fn second_period_ends_the_number() {
        assert_eq!(
            number_and_unit_str("1.2.3px"),
            (Some(1.2), Some(".3px".to_string()))
        );
    }

    #[test]
    fn unit_stops_at_whitespace() {
        assert_eq!(
            number_and_unit_str("10px solid"),
            (Some(10.0), Some("px".to_string()))
        );
    }

    #[test]
    fn diagnostic_counts_lines_from_one() {
        let text = diagnostic("a\nb\nc x", 6);
        assert_eq!(text, "line 3: >>> x <<<");
        assert_eq!(diagnostic("abc", 3), "line 1: >>> end of input <<<");
    }
}
