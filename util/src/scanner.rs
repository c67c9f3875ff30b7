//! Text scanning with the `Scanner` type.

use std::borrow::Cow;
use std::fmt;
use std::str;

use crate::chars::{is_digit, is_space, is_token};

/// Result type of the scanner operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A line and column inside the scanned input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Current line.
    line: usize,
    /// Current column.
    col: usize,
}

impl Position {
    const START: Position = Position { line: 1, col: 1 };

    /// Returns the line, starting at 1.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Returns the column, starting at 1.
    pub fn col(&self) -> usize {
        self.col
    }
}

/// Reading byte slice while keep the line and column.
///
/// Besides plain byte reads, the scanner understands SIP quoting: a `"`
/// that is not preceded by an unescaped `\` opens a quoted region, and
/// terminators are not recognized until the matching closing quote. This is
/// what [`Scanner::read_until`] and [`Scanner::read_through`] rely on.
///
/// A single saved position can be held with [`Scanner::mark`] and returned
/// to with [`Scanner::reset`].
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    /// The input bytes slice to be read.
    src: &'a [u8],
    /// Current position
    pos: Position,
    /// Current index.
    idx: usize,
    /// Saved index and position for lookahead.
    mark: Option<(usize, Position)>,
}

impl<'a> Scanner<'a> {
    /// Create a `Scanner` from a byte slice.
    ///
    /// The `line` and `col` will always start from 1.
    pub const fn new(src: &'a [u8]) -> Self {
        Scanner {
            src,
            pos: Position::START,
            idx: 0,
            mark: None,
        }
    }

    /// Returns the current line and column.
    pub fn position(&self) -> &Position {
        &self.pos
    }

    /// Returns how many bytes were read so far.
    #[inline]
    pub fn offset(&self) -> usize {
        self.idx
    }

    /// Returns `true` if all bytes where read
    #[inline(always)]
    pub fn is_eof(&self) -> bool {
        self.idx >= self.src.len()
    }

    /// Get the current byte without advance, `None` at the end of input.
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.src.get(self.idx).copied()
    }

    /// Get the byte before the current one, `None` at the beginning of input.
    #[inline]
    pub fn previous(&self) -> Option<u8> {
        self.idx.checked_sub(1).and_then(|i| self.src.get(i).copied())
    }

    /// Get `n` bytes without advance.
    pub fn peek_n(&self, n: usize) -> Option<&'a [u8]> {
        self.src.get(self.idx..self.idx + n)
    }

    /// Moves one byte forward and returns the byte read.
    #[inline]
    pub fn advance(&mut self) -> Option<u8> {
        self.next()
    }

    /// Returns the bytes not read yet.
    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        &self.src[self.idx.min(self.src.len())..]
    }

    /// Checks whether the remaining input starts with `pat`.
    #[inline]
    pub fn starts_with(&self, pat: &[u8]) -> bool {
        self.remaining().starts_with(pat)
    }

    /// Same as [`Scanner::starts_with`] but ignoring ASCII case.
    pub fn starts_with_ignore_case(&self, pat: &[u8]) -> bool {
        self.peek_n(pat.len()).is_some_and(|b| b.eq_ignore_ascii_case(pat))
    }

    /// `read_while()` will call the `func` closure for
    /// each element in the slice and advance
    /// while the closure returns `true`.
    ///
    /// # Returns
    ///
    /// A slice of bytes from the starting position to the position
    /// where the closure `func` returns `false` or the end of the slice
    /// is reached.
    #[inline(always)]
    pub fn read_while<F>(&mut self, func: F) -> &'a [u8]
    where
        F: Fn(u8) -> bool,
    {
        let start = self.idx;
        let src = self.src;

        while self.idx < src.len() && func(src[self.idx]) {
            self.bump(src[self.idx]);
        }

        &src[start..self.idx]
    }

    /// Reads up to, not including, the first byte found in `terminators`.
    ///
    /// Terminators inside a quoted region are skipped. If no terminator is
    /// found the rest of the input is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// # use util::Scanner;
    /// let mut scanner = Scanner::new(br#""a,b" <sip:x>, next"#);
    ///
    /// assert_eq!(scanner.read_until(b","), br#""a,b" <sip:x>"#);
    /// assert_eq!(scanner.peek(), Some(b','));
    /// ```
    pub fn read_until(&mut self, terminators: &[u8]) -> &'a [u8] {
        let start = self.idx;
        let mut quoted = false;
        let mut escaped = false;

        while let Some(b) = self.peek() {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                quoted = !quoted;
            } else if !quoted && terminators.contains(&b) {
                break;
            }
            self.bump(b);
        }

        &self.src[start..self.idx]
    }

    /// Same as [`Scanner::read_until`] but also consumes the terminator,
    /// which is returned together with the bytes read.
    pub fn read_through(&mut self, terminators: &[u8]) -> (&'a [u8], Option<u8>) {
        let read = self.read_until(terminators);
        let terminator = self.next();

        (read, terminator)
    }

    /// Reads a run of token characters.
    #[inline]
    pub fn read_word(&mut self) -> &'a [u8] {
        self.read_while(is_token)
    }

    /// Skips spaces and tabs.
    #[inline]
    pub fn skip_ws(&mut self) {
        self.read_while(is_space);
    }

    /// Skips spaces, tabs and occurrences of `extra`.
    #[inline]
    pub fn skip_ws_or(&mut self, extra: u8) {
        self.read_while(|b| is_space(b) || b == extra);
    }

    /// Reads the current byte if it is one of `any_of`.
    pub fn consume(&mut self, any_of: &[u8]) -> Option<u8> {
        self.consume_if(|b| any_of.contains(&b))
    }

    /// Call the `func` closure for next byte and read it if
    /// the closure returns `true`.
    ///
    /// # Returns
    ///
    /// The byte readed.
    #[inline(always)]
    pub fn consume_if<F>(&mut self, func: F) -> Option<u8>
    where
        F: FnOnce(u8) -> bool,
    {
        match self.peek() {
            Some(matched) if func(matched) => {
                self.bump(matched);
                Some(matched)
            }
            _ => None,
        }
    }

    /// Read next byte if equals to `b`.
    ///
    /// # Errors
    ///
    /// This method will return an error if the byte is not
    /// equal to `b` or if the slice reached the end.
    pub fn must_read(&mut self, b: u8) -> Result<()> {
        let Some(n) = self.peek() else {
            return self.error(ErrorKind::Eof);
        };
        if b != n {
            return self.error(ErrorKind::Char { expected: b, found: n });
        }
        self.bump(n);
        Ok(())
    }

    /// Reads a quoted string and returns its unescaped content.
    ///
    /// The scanner must be at the opening `"`. Both quotes are consumed and
    /// every `\x` pair is replaced by `x`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use util::Scanner;
    /// let mut scanner = Scanner::new(br#""J Rosenberg \\\"" <sip:x>"#);
    ///
    /// assert_eq!(scanner.read_quoted().unwrap(), r#"J Rosenberg \""#);
    /// assert_eq!(scanner.remaining(), b" <sip:x>");
    /// ```
    pub fn read_quoted(&mut self) -> Result<Cow<'a, str>> {
        self.must_read(b'"')?;
        let start = self.idx;
        let mut unescaped: Option<Vec<u8>> = None;

        loop {
            let Some(b) = self.peek() else {
                return self.error(ErrorKind::Unterminated);
            };
            match b {
                b'"' => break,
                b'\\' => {
                    let buf = unescaped.get_or_insert_with(|| self.src[start..self.idx].to_vec());
                    self.bump(b);
                    let Some(escaped) = self.peek() else {
                        return self.error(ErrorKind::Unterminated);
                    };
                    buf.push(escaped);
                    self.bump(escaped);
                }
                _ => {
                    if let Some(buf) = unescaped.as_mut() {
                        buf.push(b);
                    }
                    self.bump(b);
                }
            }
        }
        let end = self.idx;
        // closing quote
        self.bump(b'"');

        match unescaped {
            None => match str::from_utf8(&self.src[start..end]) {
                Ok(s) => Ok(Cow::Borrowed(s)),
                Err(_) => self.error(ErrorKind::Utf8),
            },
            Some(buf) => match String::from_utf8(buf) {
                Ok(s) => Ok(Cow::Owned(s)),
                Err(_) => self.error(ErrorKind::Utf8),
            },
        }
    }

    /// Saves the current position.
    ///
    /// # Panics
    ///
    /// Panics if a position is already saved.
    pub fn mark(&mut self) {
        assert!(self.mark.is_none(), "scanner position marked twice");
        self.mark = Some((self.idx, self.pos));
    }

    /// Returns to the position saved by [`Scanner::mark`] and clears it.
    ///
    /// # Panics
    ///
    /// Panics if no position is saved.
    pub fn reset(&mut self) {
        let Some((idx, pos)) = self.mark.take() else {
            panic!("scanner reset without a marked position");
        };
        self.idx = idx;
        self.pos = pos;
    }

    /// Clears the saved position, keeping the current one.
    ///
    /// # Panics
    ///
    /// Panics if no position is saved.
    pub fn unmark(&mut self) {
        assert!(self.mark.take().is_some(), "scanner unmarked without a marked position");
    }

    /// Checks, ignoring leading whitespace and ASCII case, whether `token` is
    /// the next thing in the input. The position is left unchanged.
    ///
    /// # Panics
    ///
    /// Panics if a position is already marked.
    pub fn is_next(&mut self, token: &[u8]) -> bool {
        self.mark();
        self.skip_ws();
        let found = self.starts_with_ignore_case(token);
        self.reset();

        found
    }

    /// Read a `u32` number from the slice.
    ///
    /// This method reads until an invalid digit is found.
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_num()
    }

    /// Read a `u16` number from the slice.
    ///
    /// This method reads until an invalid digit is found.
    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_num()
    }

    /// Read number in the slice.
    ///
    /// This method read until an invalid digit is found.
    pub fn read_num<N>(&mut self) -> Result<N>
    where
        N: lexical_core::FromLexical,
    {
        let digits = self.peek_digits();
        match lexical_core::parse::<N>(digits) {
            Ok(value) if !digits.is_empty() => {
                self.read_while(is_digit);
                Ok(value)
            }
            _ => self.error(ErrorKind::Num),
        }
    }

    fn peek_digits(&self) -> &'a [u8] {
        let rem = self.remaining();
        let n = rem.iter().position(|&b| !is_digit(b)).unwrap_or(rem.len());

        &rem[..n]
    }

    #[inline(always)]
    fn bump(&mut self, byte: u8) {
        if byte == b'\n' {
            self.pos.col = 1;
            self.pos.line += 1;
        } else {
            self.pos.col += 1;
        }
        self.idx += 1;
    }

    /// Builds an error at the current position.
    pub fn error<T>(&self, kind: ErrorKind) -> Result<T> {
        Err(Error {
            kind,
            line: self.pos.line,
            col: self.pos.col,
        })
    }
}

impl Iterator for Scanner<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<Self::Item> {
        let byte = self.peek()?;
        self.bump(byte);
        Some(byte)
    }
}

/// Errors that can occur while reading the src.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind {
    /// End of file reached.
    Eof,
    /// A specific byte was expected.
    Char {
        /// The byte expected.
        expected: u8,
        /// The byte found.
        found: u8,
    },
    /// Not a number, or out of range.
    Num,
    /// A quoted string was not closed.
    Unterminated,
    /// Invalid UTF-8.
    Utf8,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Eof => f.write_str("unexpected end of input"),
            ErrorKind::Char { expected, found } => {
                write!(f, "expected '{}' found '{}'", *expected as char, *found as char)
            }
            ErrorKind::Num => f.write_str("invalid number"),
            ErrorKind::Unterminated => f.write_str("unterminated quoted string"),
            ErrorKind::Utf8 => f.write_str("invalid utf-8"),
        }
    }
}

/// A scanner failure and where it happened.
#[derive(Debug, PartialEq, Eq, Clone, thiserror::Error)]
#[error("{kind} at line {line} column {col}")]
pub struct Error {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Line of the failure.
    pub line: usize,
    /// Column of the failure.
    pub col: usize,
}
