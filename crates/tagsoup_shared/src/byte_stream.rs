use std::fmt::{Debug, Formatter};
use std::io::Read;
use std::{fmt, io};

pub const CHAR_LF: char = '\u{000A}';
pub const CHAR_CR: char = '\u{000D}';

/// Defines a single character in the stream. Eof is denoted as a separate element so callers
/// can match on it instead of checking bounds everywhere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Character {
    /// Standard UTF character
    Ch(char),
    /// Stream buffer empty and closed
    StreamEnd,
}

use Character::*;

impl From<Character> for char {
    fn from(c: Character) -> Self {
        match c {
            Ch(c) => c,
            StreamEnd => 0x0000 as char,
        }
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Ch(ch) => write!(f, "{ch}"),
            StreamEnd => write!(f, "StreamEnd"),
        }
    }
}

impl Character {
    /// Returns true when the character is a whitespace
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Ch(c) if c.is_whitespace())
    }

    /// Returns true when the character is an ascii letter
    pub fn is_ascii_alphabetic(&self) -> bool {
        matches!(self, Ch(c) if c.is_ascii_alphabetic())
    }
}

/// Configuration structure for a character stream.
pub struct Config {
    /// Treat any CRLF pairs as a single LF
    pub cr_lf_as_one: bool,
    /// Replace any CR (without a pairing LF) with LF
    pub replace_cr_as_lf: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cr_lf_as_one: true,
            replace_cr_as_lf: true,
        }
    }
}

/// Decoded character buffer the scanner reads from. Markup is decoded up front so the scanner
/// can look ahead an arbitrary number of characters (conditional comments need 30).
pub struct CharStream {
    /// Decoded characters
    buffer: Vec<char>,
    /// Current position in the buffer
    position: usize,
    /// Line/column bookkeeping
    location: LocationHandler,
    /// Configuration for the stream
    config: Config,
}

impl Default for CharStream {
    fn default() -> Self {
        Self::new(None)
    }
}

impl CharStream {
    /// Create a new, empty stream
    #[must_use]
    pub fn new(config: Option<Config>) -> Self {
        Self {
            buffer: Vec::new(),
            position: 0,
            location: LocationHandler::new(Location::default()),
            config: config.unwrap_or_default(),
        }
    }

    /// Create a stream whose locations start at the given location instead of 1:1. Used for
    /// markup that is injected in the middle of another document.
    #[must_use]
    pub fn with_start_location(start: Location) -> Self {
        let mut stream = Self::new(None);
        stream.location = LocationHandler::new(start);
        stream
    }

    /// Populates the stream with the given string
    pub fn read_from_str(&mut self, s: &str) {
        self.buffer = self.normalize(s);
        self.position = 0;
        self.location.reset();
    }

    /// Reads everything from the given reader. Invalid UTF-8 sequences are replaced.
    pub fn read_from(&mut self, mut reader: impl Read) -> io::Result<()> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        self.read_from_str(&String::from_utf8_lossy(&bytes));
        Ok(())
    }

    fn normalize(&self, s: &str) -> Vec<char> {
        let mut out = Vec::with_capacity(s.len());
        let mut chars = s.chars().peekable();
        while let Some(c) = chars.next() {
            if c == CHAR_CR {
                if self.config.cr_lf_as_one && chars.peek() == Some(&CHAR_LF) {
                    continue;
                }
                if self.config.replace_cr_as_lf {
                    out.push(CHAR_LF);
                    continue;
                }
            }
            out.push(c);
        }
        out
    }

    /// Returns the current character without moving the position
    pub fn read(&self) -> Character {
        self.look_ahead(0)
    }

    /// Returns the current character and moves to the next one
    pub fn read_and_next(&mut self) -> Character {
        let c = self.read();
        if let Ch(ch) = c {
            self.location.inc(ch);
            self.position += 1;
        }
        c
    }

    /// Returns the character at the given offset from the current position
    pub fn look_ahead(&self, offset: usize) -> Character {
        match self.buffer.get(self.position + offset) {
            Some(c) => Ch(*c),
            None => StreamEnd,
        }
    }

    /// Skips the given number of characters
    pub fn next_n(&mut self, n: usize) {
        for _ in 0..n {
            if self.read_and_next() == StreamEnd {
                break;
            }
        }
    }

    /// Returns (at most) the next `len` characters as a string without consuming them
    pub fn peek_str(&self, len: usize) -> String {
        let end = usize::min(self.position + len, self.buffer.len());
        self.buffer[self.position..end].iter().collect()
    }

    /// Returns true when the upcoming characters match the given string
    pub fn starts_with(&self, s: &str, ignore_case: bool) -> bool {
        let mut offset = 0;
        for expected in s.chars() {
            match self.look_ahead(offset) {
                Ch(c) if c == expected => {}
                Ch(c) if ignore_case && c.eq_ignore_ascii_case(&expected) => {}
                _ => return false,
            }
            offset += 1;
        }
        true
    }

    /// Consumes the given string when the stream starts with it
    pub fn consume_if(&mut self, s: &str, ignore_case: bool) -> bool {
        if !self.starts_with(s, ignore_case) {
            return false;
        }
        self.next_n(s.chars().count());
        true
    }

    /// Returns true when all characters are consumed
    pub fn eof(&self) -> bool {
        self.position >= self.buffer.len()
    }

    /// Current location in the stream
    pub fn location(&self) -> Location {
        self.location.cur_location.clone()
    }
}

/// Location holds the start position of the given element in the data source
#[derive(Clone, PartialEq, Eq)]
pub struct Location {
    /// Line number, starting with 1
    pub line: usize,
    /// Column number, starting with 1
    pub column: usize,
    /// Character offset, starting with 0
    pub offset: usize,
}

impl Default for Location {
    /// Default to line 1, column 1
    fn default() -> Self {
        Self::new(1, 1, 0)
    }
}

impl Location {
    /// Create a new Location
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

impl Debug for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}:{})", self.line, self.column)
    }
}

/// LocationHandler is a wrapper that will deal with line/column locations in the stream
pub struct LocationHandler {
    /// The start offset of the location. Normally this is 1:1, but can be different in case of inline streams
    pub start_location: Location,
    /// The current location of the stream
    pub cur_location: Location,
}

impl LocationHandler {
    /// Create a new LocationHandler. Start_location can be set in case the stream is
    /// not starting at 1:1
    pub fn new(start_location: Location) -> Self {
        Self {
            cur_location: start_location.clone(),
            start_location,
        }
    }

    /// Moves back to the start location
    pub fn reset(&mut self) {
        self.cur_location = self.start_location.clone();
    }

    /// Will increase the current location based on the given character
    pub fn inc(&mut self, ch: char) {
        if ch == CHAR_LF {
            self.cur_location.line += 1;
            self.cur_location.column = 1;
        } else {
            self.cur_location.column += 1;
        }
        self.cur_location.offset += 1;
    }
}
