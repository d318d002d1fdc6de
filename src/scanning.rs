use crate::error_handling::*;
use log::{debug, trace};
use std::collections::VecDeque;
use std::fmt;
use std::io::{BufRead, Cursor, StdinLock};

/// Where a [`Token`] came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLocation {
    pub filename: String,
    /// The first line of a source is 1.
    pub line: usize,
    /// The first character on a line is 1.
    pub character: usize,
}

impl SourceLocation {
    pub fn new(filename: impl Into<String>, line: usize, character: usize) -> Self {
        Self{filename: filename.into(), line, character}
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line, self.character)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// Contents of a quoted string, without the quotes.
    string(String),
    symbol(String),
    number(f64),
    boolean(bool),
    end_of_line,
    end_of_file,
}

impl TokenKind {
    pub fn name(&self) -> &'static str {
        use TokenKind::*;
        match self {
            string(_) => "string",
            symbol(_) => "symbol",
            number(_) => "number",
            boolean(_) => "boolean",
            end_of_line => "end of line",
            end_of_file => "end of file",
        }
    }
}

/// One lexical unit. Tokens are never modified after the scanner builds them.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    kind: TokenKind,
    location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, location: SourceLocation) -> Self {
        Self{kind, location}
    }

    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    fn mismatch(&self, expected: &'static str) -> CalcError {
        CalcError::wrong_variant{expected, found: self.kind.name()}
    }

    pub fn string(&self) -> Result<&str> {
        match &self.kind {
            TokenKind::string(content) => Ok(content),
            _ => Err(self.mismatch("string")),
        }
    }

    pub fn symbol(&self) -> Result<&str> {
        match &self.kind {
            TokenKind::symbol(content) => Ok(content),
            _ => Err(self.mismatch("symbol")),
        }
    }

    pub fn number(&self) -> Result<f64> {
        match self.kind {
            TokenKind::number(value) => Ok(value),
            _ => Err(self.mismatch("number")),
        }
    }

    pub fn boolean(&self) -> Result<bool> {
        match self.kind {
            TokenKind::boolean(value) => Ok(value),
            _ => Err(self.mismatch("boolean")),
        }
    }

    /// The canonical printed form. End markers have none.
    pub fn text(&self) -> Result<String> {
        match self.kind {
            TokenKind::end_of_line | TokenKind::end_of_file => Err(self.mismatch("printable")),
            _ => Ok(self.to_string()),
        }
    }

    pub fn is_symbol(&self, expected: &str) -> bool {
        matches!(&self.kind, TokenKind::symbol(content) if content == expected)
    }

    pub fn is_end_of_line(&self) -> bool {
        self.kind == TokenKind::end_of_line
    }

    pub fn is_end_of_file(&self) -> bool {
        self.kind == TokenKind::end_of_file
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TokenKind::*;
        match &self.kind {
            string(content) | symbol(content) => write!(f, "{content}"),
            number(value) => write!(f, "{value}"),
            boolean(value) => write!(f, "{value}"),
            end_of_line => write!(f, "<end of line>"),
            end_of_file => write!(f, "<end of file>"),
        }
    }
}

pub trait TokenSource {
    fn next(&mut self) -> Result<Token>;
}

/// Discards tokens up to and including the next end of line or end of file.
pub fn skip_line<S: TokenSource + ?Sized>(source: &mut S) -> Result<()> {
    loop {
        let token = source.next()?;
        if token.is_end_of_line() || token.is_end_of_file() {
            return Ok(());
        }
    }
}

/// Hands out a fixed list of tokens.
pub struct SimpleScanner {
    tokens: VecDeque<Token>,
}

impl SimpleScanner {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self{tokens: tokens.into()}
    }
}

impl TokenSource for SimpleScanner {
    fn next(&mut self) -> Result<Token> {
        self.tokens.pop_front().ok_or(CalcError::abrupt_end)
    }
}

/// Reads input one line at a time and presents it as tokens.
///
/// A line is tokenized completely the first time one of its tokens is
/// requested. A lexical error takes the place of every token of the line it
/// occurs on; lines before and after it in the same read are unaffected.
/// Reading from a live source blocks until a whole line is available.
pub struct Scanner<R> {
    reader: R,
    filename: String,
    current_line: usize,
    pending: VecDeque<Result<Token>>,
}

impl<R: BufRead> Scanner<R> {
    /// Reported line numbers start at `start_line`.
    pub fn new(reader: R, start_line: usize) -> Self {
        Self{
            reader,
            filename: "<stdin>".into(),
            current_line: start_line,
            pending: VecDeque::new(),
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    /// Line number the next line read will be reported as.
    pub fn line(&self) -> usize {
        self.current_line
    }

    fn read_ahead(&mut self) -> Result<()> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            debug!("{}: end of input at line {}", self.filename, self.current_line);
            let location = SourceLocation::new(&self.filename, self.current_line, 1);
            self.pending.push_back(Ok(Token::new(TokenKind::end_of_file, location)));
            return Ok(());
        }

        let (tokens, next_line) = LineLexer::new(&line, &self.filename, self.current_line).tokenize();
        debug!("{}:{}: scanned {} tokens", self.filename, self.current_line, tokens.len());
        self.current_line = next_line;
        self.pending.extend(tokens);
        Ok(())
    }
}

impl Scanner<StdinLock<'static>> {
    pub fn stdin(start_line: usize) -> Self {
        Self::new(std::io::stdin().lock(), start_line)
    }
}

impl Scanner<Cursor<String>> {
    /// Scans a fixed string. Once it is used up the scanner reports end of
    /// file on every call.
    pub fn from_string(string: impl Into<String>) -> Self {
        Self::new(Cursor::new(string.into()), 1).with_filename("<string>")
    }
}

impl<R: BufRead> TokenSource for Scanner<R> {
    fn next(&mut self) -> Result<Token> {
        if self.pending.is_empty() {
            self.read_ahead()?;
        }
        self.pending.pop_front().unwrap_or(Err(CalcError::abrupt_end))
    }
}

fn is_blank(character: char) -> bool {
    matches!(character, ' ' | '\t' | '\x0b' | '\x0c')
}

fn is_newline(character: char) -> bool {
    character == '\n' || character == '\r'
}

fn is_word_character(character: char) -> bool {
    character.is_ascii_alphabetic() || character == '_'
}

/// Tokenizes the text of a single line read by a [`Scanner`].
struct LineLexer<'a> {
    chars: Vec<char>,
    index: usize,
    /// Index where the current line begins.
    line_offset: usize,
    line: usize,
    filename: &'a str,
}

impl<'a> LineLexer<'a> {
    fn new(text: &str, filename: &'a str, line: usize) -> Self {
        Self{chars: text.chars().collect(), index: 0, line_offset: 0, line, filename}
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.index + offset).copied()
    }

    fn count<P: Fn(char) -> bool>(&self, from: usize, predicate: P) -> usize {
        self.chars
            .get(from..)
            .map_or(0, |rest| rest.iter().take_while(|c| predicate(**c)).count())
    }

    fn text(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }

    fn location(&self) -> SourceLocation {
        SourceLocation::new(self.filename, self.line, self.index - self.line_offset + 1)
    }

    fn skip_whitespace(&mut self) {
        self.index += self.count(self.index, is_blank);
    }

    /// Consumes a newline at the cursor, if there is one.
    fn consume_newline(&mut self) -> bool {
        match self.peek_at(0) {
            Some('\r') if self.peek_at(1) == Some('\n') => self.index += 2,
            Some(c) if is_newline(c) => self.index += 1,
            _ => return false,
        }
        self.line += 1;
        self.line_offset = self.index;
        true
    }

    /// Returns the tokens and the number of the line that follows. A line
    /// with a lexical error yields that error alone.
    fn tokenize(mut self) -> (Vec<Result<Token>>, usize) {
        let mut tokens = Vec::new();
        let mut line_start = 0;
        let mut ended = false;
        let mut failed = false;
        loop {
            self.skip_whitespace();
            let Some(character) = self.peek_at(0) else {
                break;
            };
            match self.read(character) {
                Ok(token) => {
                    trace!("{}: {:?}", token.location(), token.kind());
                    ended = token.is_end_of_line();
                    tokens.push(Ok(token));
                    if ended {
                        line_start = tokens.len();
                    }
                },
                Err(error) => {
                    debug!("{error}");
                    tokens.truncate(line_start);
                    tokens.push(Err(error));
                    line_start = tokens.len();
                    self.index += self.count(self.index, |c| !is_newline(c));
                    ended = self.consume_newline();
                    failed = !ended;
                },
            }
        }

        // the last line of a source may lack its newline
        if !ended {
            if !failed {
                tokens.push(Ok(Token::new(TokenKind::end_of_line, self.location())));
            }
            self.line += 1;
        }
        (tokens, self.line)
    }

    fn read(&mut self, character: char) -> Result<Token> {
        let location = self.location();

        if is_newline(character) {
            self.consume_newline();
            return Ok(Token::new(TokenKind::end_of_line, location));
        }

        let is_negative_number = character == '-' && self.peek_at(1).is_some_and(|c| c.is_ascii_digit());
        if character.is_ascii_digit() || is_negative_number {
            return self.read_number(location);
        }

        if let Some(token) = self.read_boolean(&location) {
            return Ok(token);
        }

        if character == '"' {
            self.read_string(location)
        } else if character.is_ascii_alphabetic() {
            Ok(self.read_word(location))
        } else {
            self.read_operator(character, location)
        }
    }

    fn read_number(&mut self, location: SourceLocation) -> Result<Token> {
        let start = self.index;
        let mut end = start;
        if self.chars[end] == '-' {
            end += 1;
        }

        let mut seen_dot = false;
        while let Some(&c) = self.chars.get(end) {
            match c {
                '0'..='9' => end += 1,
                '.' if !seen_dot => {
                    seen_dot = true;
                    end += 1;
                },
                _ => break,
            }
        }
        end += self.exponent_length(end);

        let content = self.text(start, end);
        self.index = end;
        match content.parse() {
            Ok(value) => Ok(Token::new(TokenKind::number(value), location)),
            Err(_) => Err(CalcError::invalid_number(location, content)),
        }
    }

    /// Length of an `e`, optional `-`, and digits starting at `at`, or 0 if
    /// there is no complete exponent there.
    fn exponent_length(&self, at: usize) -> usize {
        if !matches!(self.chars.get(at), Some('e' | 'E')) {
            return 0;
        }
        let sign = usize::from(self.chars.get(at + 1) == Some(&'-'));
        match self.count(at + 1 + sign, |c| c.is_ascii_digit()) {
            0 => 0,
            digits => 1 + sign + digits,
        }
    }

    fn matches_word(&self, word: &str) -> bool {
        let length = word.len();
        match self.chars.get(self.index..self.index + length) {
            Some(candidate) => {
                candidate.iter().copied().eq(word.chars())
                    && !self.peek_at(length).is_some_and(is_word_character)
            },
            None => false,
        }
    }

    fn read_boolean(&mut self, location: &SourceLocation) -> Option<Token> {
        let (length, value) = [("true", true), ("false", false)]
            .into_iter()
            .find(|(word, _)| self.matches_word(word))
            .map(|(word, value)| (word.len(), value))?;
        self.index += length;
        Some(Token::new(TokenKind::boolean(value), location.clone()))
    }

    fn read_string(&mut self, location: SourceLocation) -> Result<Token> {
        let body = self.index + 1;
        let closing = body + self.count(body, |c| c != '"' && !is_newline(c));
        if self.chars.get(closing) != Some(&'"') {
            return Err(CalcError::unterminated_string(location));
        }
        let content = self.text(body, closing);
        self.index = closing + 1;
        Ok(Token::new(TokenKind::string(content), location))
    }

    fn read_word(&mut self, location: SourceLocation) -> Token {
        let length = self.count(self.index, is_word_character);
        let content = self.text(self.index, self.index + length);
        self.index += length;
        Token::new(TokenKind::symbol(content), location)
    }

    fn operator_length(&self, character: char) -> usize {
        let next = self.peek_at(1);
        match character {
            '+' | '-' | '*' | '/' | '^' | '%' | '(' | ')' => 1,
            '&' | '|' | '=' if next == Some(character) => 2,
            '>' | '<' if next == Some('=') => 2,
            '>' | '<' => 1,
            _ => 0,
        }
    }

    fn read_operator(&mut self, character: char, location: SourceLocation) -> Result<Token> {
        let length = self.operator_length(character);
        if length == 0 {
            return Err(CalcError::invalid_character(location, character));
        }
        let content = self.text(self.index, self.index + length);
        self.index += length;
        Ok(Token::new(TokenKind::symbol(content), location))
    }
}
