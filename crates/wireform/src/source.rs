//! Buffered character-level input cursor.
//!
//! [`Source`] wraps any [`CharRead`] and exposes the cursor contract the
//! lexers are written against: `current`/`next` with carriage-return folding,
//! a single-slot pushback (`stash_current`), whitespace and predicate scans,
//! and literal assertion. Positions are tracked per character and surface in
//! every [`ParseError`].

use std::io;

use crate::error::ParseError;

/// Cursor location in a character stream. `index` counts consumed
/// characters; `line` and `column` are 1-based and describe the character
/// currently under the cursor. Used only for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub index: usize,
    pub line: usize,
    pub column: usize,
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Producer of characters for a [`Source`].
///
/// `len` reports the total character count when the stream is bounded and
/// cheap to measure; an unbounded source returns `None`, which makes
/// [`Source::has_next`] the sole termination signal.
pub trait CharRead {
    fn next_char(&mut self) -> io::Result<Option<char>>;

    fn len(&self) -> Option<usize> {
        None
    }
}

/// In-memory text source with a known length.
pub struct StrChars<'a> {
    chars: core::str::Chars<'a>,
    len: usize,
}

impl<'a> StrChars<'a> {
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars(),
            len: text.chars().count(),
        }
    }
}

impl CharRead for StrChars<'_> {
    fn next_char(&mut self) -> io::Result<Option<char>> {
        Ok(self.chars.next())
    }

    fn len(&self) -> Option<usize> {
        Some(self.len)
    }
}

/// Blocking character source over any `io::Read`, decoding UTF-8
/// incrementally. Length is unknown.
pub struct ReaderChars<R> {
    reader: R,
    buf: Vec<u8>,
    at: usize,
    eof: bool,
}

impl<R: io::Read> ReaderChars<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            at: 0,
            eof: false,
        }
    }

    fn fill(&mut self) -> io::Result<()> {
        if self.at > 0 {
            self.buf.drain(..self.at);
            self.at = 0;
        }
        let mut chunk = [0u8; 4096];
        let n = self.reader.read(&mut chunk)?;
        if n == 0 {
            self.eof = true;
        } else {
            self.buf.extend_from_slice(&chunk[..n]);
        }
        Ok(())
    }
}

impl<R: io::Read> CharRead for ReaderChars<R> {
    fn next_char(&mut self) -> io::Result<Option<char>> {
        loop {
            let pending = &self.buf[self.at..];
            let (ch, size) = bstr::decode_utf8(pending);
            match ch {
                Some(c) => {
                    self.at += size;
                    return Ok(Some(c));
                }
                // `size == 0` means the buffer is drained; a non-zero size
                // with no char is either an incomplete tail (keep reading)
                // or genuinely invalid UTF-8.
                None if size == 0 => {
                    if self.eof {
                        return Ok(None);
                    }
                    self.fill()?;
                }
                None => {
                    if !self.eof && pending.len() < 4 {
                        self.fill()?;
                        continue;
                    }
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "stream is not valid UTF-8",
                    ));
                }
            }
        }
    }
}

/// Buffered character cursor over a [`CharRead`].
pub struct Source<'a> {
    inner: Box<dyn CharRead + 'a>,
    current: Option<char>,
    /// One-character lookahead pulled for `has_next` but not yet consumed.
    ahead: Option<Option<char>>,
    stashed: bool,
    pos: Position,
}

impl<'a> Source<'a> {
    #[must_use]
    pub fn of_str(text: &'a str) -> Self {
        Self::new(StrChars::new(text))
    }

    pub fn from_reader(reader: impl io::Read + 'a) -> Self {
        Self::new(ReaderChars::new(reader))
    }

    pub fn new(inner: impl CharRead + 'a) -> Self {
        Self {
            inner: Box::new(inner),
            current: None,
            ahead: None,
            stashed: false,
            pos: Position {
                index: 0,
                line: 1,
                column: 0,
            },
        }
    }

    /// The character under the cursor, or `None` once the stream is
    /// exhausted (and before the first `next`).
    #[must_use]
    pub fn current(&self) -> Option<char> {
        self.current
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.pos
    }

    #[must_use]
    pub fn len(&self) -> Option<usize> {
        self.inner.len()
    }

    /// Marks the current character to be replayed by the next `next` call.
    /// Single slot: stashing twice before consuming is a no-op.
    pub fn stash_current(&mut self) {
        self.stashed = true;
    }

    /// Advances the cursor and returns the new current character. `\r` is
    /// folded away: CRLF is delivered as its LF, a bare `\r` is skipped.
    pub fn next(&mut self) -> Result<Option<char>, ParseError> {
        if self.stashed {
            self.stashed = false;
            return Ok(self.current);
        }
        loop {
            match self.pull()? {
                Some('\r') => {
                    self.pos.index += 1;
                }
                Some(c) => {
                    self.pos.index += 1;
                    if c == '\n' {
                        self.pos.line += 1;
                        self.pos.column = 0;
                    } else {
                        self.pos.column += 1;
                    }
                    self.current = Some(c);
                    return Ok(self.current);
                }
                None => {
                    self.current = None;
                    return Ok(None);
                }
            }
        }
    }

    /// Whether another character remains (stashed, buffered, or unread).
    pub fn has_next(&mut self) -> Result<bool, ParseError> {
        if self.stashed {
            return Ok(self.current.is_some());
        }
        if self.ahead.is_none() {
            let pulled = self
                .inner
                .next_char()
                .map_err(|source| ParseError::Io {
                    source,
                    position: self.pos,
                })?;
            self.ahead = Some(pulled);
        }
        Ok(matches!(self.ahead, Some(Some(_))))
    }

    /// Advances to the next non-whitespace character.
    pub fn next_non_space(&mut self) -> Result<Option<char>, ParseError> {
        loop {
            match self.next()? {
                Some(c) if c.is_whitespace() => {}
                other => return Ok(other),
            }
        }
    }

    /// Advances until `stop` matches, collecting the characters in between.
    /// The matching character is consumed (it becomes `current`) but is not
    /// part of the returned text.
    pub fn next_until(
        &mut self,
        stop: impl Fn(char) -> bool,
    ) -> Result<String, ParseError> {
        let mut collected = String::new();
        loop {
            match self.next()? {
                Some(c) if stop(c) => return Ok(collected),
                Some(c) => collected.push(c),
                None => return Ok(collected),
            }
        }
    }

    /// Advances through an expected literal tail, failing with the
    /// mismatched character and its position.
    pub fn assert_next_are(&mut self, literal: &str) -> Result<(), ParseError> {
        for expected in literal.chars() {
            match self.next()? {
                Some(found) if found == expected => {}
                Some(found) => {
                    return Err(ParseError::MismatchedLiteral {
                        expected,
                        found,
                        position: self.pos,
                    });
                }
                None => return Err(ParseError::UnexpectedEnd { position: self.pos }),
            }
        }
        Ok(())
    }

    /// A positioned "unexpected character" error for the current cursor.
    #[must_use]
    pub fn unexpected(&self, found: char) -> ParseError {
        ParseError::UnexpectedCharacter {
            found,
            position: self.pos,
        }
    }

    /// A positioned "unexpected end of input" error for the current cursor.
    #[must_use]
    pub fn unexpected_end(&self) -> ParseError {
        ParseError::UnexpectedEnd { position: self.pos }
    }

    fn pull(&mut self) -> Result<Option<char>, ParseError> {
        if let Some(ahead) = self.ahead.take() {
            return Ok(ahead);
        }
        self.inner.next_char().map_err(|source| ParseError::Io {
            source,
            position: self.pos,
        })
    }
}
