use std::collections::VecDeque;

use crate::chars::{
    is_alpha, is_blank, is_blankz, is_break, is_breakz, is_uri_symbol, utf8_sequence_start,
};
use crate::reader::Reader;
use crate::token::{Token, TokenKind};
use crate::{Encoding, Mark, ReaderError, ScalarStyle, ScannerError};

/// A candidate position where a simple key may start.
///
/// The stack always holds one entry per flow level plus one for the block
/// context. When the `:` of a simple key is found, a KEY token is inserted
/// retroactively at the recorded queue position.
#[derive(Copy, Clone, Default)]
struct SimpleKey {
    possible: bool,
    required: bool,
    /// The stream-wide number of the token the KEY would become.
    token_number: usize,
    mark: Mark,
}

/// Converts the decoded character buffer into a queue of tokens.
///
/// The scanner resolves indentation, block vs flow context, and simple-key
/// lookahead; the parser drains the queue through
/// [`Parser::scan`](crate::Parser::scan) or the event machinery.
pub(crate) struct Scanner<'r> {
    reader: Reader<'r>,
    /// The position of the next unread character.
    mark: Mark,
    stream_start_produced: bool,
    pub(crate) stream_end_produced: bool,
    /// The number of unclosed `[` and `{` indicators.
    flow_level: usize,
    pub(crate) tokens: VecDeque<Token>,
    /// How many tokens have been handed to the parser.
    pub(crate) tokens_parsed: usize,
    /// Is the head of the queue ready for dequeueing?
    pub(crate) token_available: bool,
    /// Columns of the open block collections; strictly increasing bottom to
    /// top.
    indents: Vec<i64>,
    indent: i64,
    simple_key_allowed: bool,
    simple_keys: Vec<SimpleKey>,
}

impl<'r> Scanner<'r> {
    pub(crate) fn new() -> Self {
        Self {
            reader: Reader::new(),
            mark: Mark::default(),
            stream_start_produced: false,
            stream_end_produced: false,
            flow_level: 0,
            tokens: VecDeque::with_capacity(16),
            tokens_parsed: 0,
            token_available: false,
            indents: Vec::with_capacity(16),
            indent: 0,
            simple_key_allowed: false,
            simple_keys: Vec::with_capacity(16),
        }
    }

    pub(crate) fn set_input(&mut self, input: &'r mut dyn std::io::BufRead) {
        self.reader.set_source(input);
    }

    pub(crate) fn set_encoding(&mut self, encoding: Encoding) {
        self.reader.set_encoding(encoding);
    }

    /// Produce the next token.
    ///
    /// The first token is always STREAM-START; after STREAM-END has been
    /// produced, every further call returns another STREAM-END.
    pub(crate) fn next_token(&mut self) -> Result<Token, ScannerError> {
        if self.stream_end_produced {
            return Ok(Token::new(TokenKind::StreamEnd, self.mark, self.mark));
        }
        if !self.token_available {
            self.fetch_more_tokens()?;
        }
        let token = self
            .tokens
            .pop_front()
            .expect("token queue is empty after fetch");
        self.token_available = false;
        self.tokens_parsed += 1;
        if matches!(token.kind, TokenKind::StreamEnd) {
            self.stream_end_produced = true;
        }
        Ok(token)
    }

    /// Fetch tokens until the head of the queue can be dequeued: it must
    /// exist, and no unresolved simple key may still point at it.
    pub(crate) fn fetch_more_tokens(&mut self) -> Result<(), ScannerError> {
        loop {
            let mut need_more = self.tokens.is_empty();
            if !need_more {
                self.purge_stale_simple_keys()?;
                for key in &self.simple_keys {
                    if key.possible && key.token_number == self.tokens_parsed {
                        need_more = true;
                        break;
                    }
                }
            }
            if !need_more {
                break;
            }
            self.fetch_next_token()?;
        }
        self.token_available = true;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Buffer cursor.
    // ------------------------------------------------------------------

    fn look(&self, at: usize) -> Option<char> {
        self.reader.chars.get(at).copied()
    }

    fn ch(&self) -> Option<char> {
        self.look(0)
    }

    fn check(&self, wanted: char) -> bool {
        self.ch() == Some(wanted)
    }

    fn check_at(&self, wanted: char, at: usize) -> bool {
        self.look(at) == Some(wanted)
    }

    fn triple(&self, wanted: char) -> bool {
        self.check(wanted) && self.check_at(wanted, 1) && self.check_at(wanted, 2)
    }

    fn at_end(&self) -> bool {
        self.ch().is_none()
    }

    fn is_digit(&self) -> bool {
        self.ch().is_some_and(|ch| ch.is_ascii_digit())
    }

    fn digit(&self) -> u32 {
        self.ch()
            .and_then(|ch| ch.to_digit(10))
            .expect("expected a decimal digit")
    }

    fn hex_at(&self, at: usize) -> Option<u32> {
        self.look(at).and_then(|ch| ch.to_digit(16))
    }

    fn want(&mut self, length: usize) -> Result<(), ReaderError> {
        self.reader.want(length)
    }

    /// Consume one character that is not a line break.
    fn skip(&mut self) {
        let popped = self
            .reader
            .chars
            .pop_front()
            .expect("skipped past the end of input");
        self.mark.index += popped.len_utf8() as u64;
        self.mark.column += 1;
        self.reader.unread -= 1;
    }

    /// Consume one line break, including a CR LF pair.
    fn skip_break(&mut self) {
        if self.check('\r') && self.check_at('\n', 1) {
            self.mark.index += 2;
            self.mark.column = 0;
            self.mark.line += 1;
            self.reader.unread -= 2;
            self.reader.chars.drain(..2);
        } else if let Some(front) = self.ch() {
            if is_break(front) {
                self.mark.index += front.len_utf8() as u64;
                self.mark.column = 0;
                self.mark.line += 1;
                self.reader.unread -= 1;
                self.reader.chars.pop_front();
            }
        }
    }

    /// Consume one character into `string`.
    fn read_into(&mut self, string: &mut String) {
        let popped = self
            .reader
            .chars
            .pop_front()
            .expect("read past the end of input");
        string.push(popped);
        self.mark.index += popped.len_utf8() as u64;
        self.mark.column += 1;
        self.reader.unread -= 1;
    }

    /// Consume one line break into `string`. CR, LF, CR LF, and NEL all
    /// normalize to `\n`; LS and PS are kept verbatim.
    fn read_break_into(&mut self, string: &mut String) {
        if self.check('\r') && self.check_at('\n', 1) {
            string.push('\n');
            self.reader.chars.drain(..2);
            self.mark.index += 2;
            self.mark.column = 0;
            self.mark.line += 1;
            self.reader.unread -= 2;
        } else if let Some(front) = self.ch() {
            if is_break(front) {
                self.reader.chars.pop_front();
                if front == '\u{2028}' || front == '\u{2029}' {
                    string.push(front);
                } else {
                    string.push('\n');
                }
                self.mark.index += front.len_utf8() as u64;
                self.mark.column = 0;
                self.mark.line += 1;
                self.reader.unread -= 1;
            }
        }
    }

    fn fail<T>(
        &self,
        context: &'static str,
        context_mark: Mark,
        problem: &'static str,
    ) -> Result<T, ScannerError> {
        Err(ScannerError::Problem {
            context,
            context_mark,
            problem,
            problem_mark: self.mark,
        })
    }

    // ------------------------------------------------------------------
    // Dispatch.
    // ------------------------------------------------------------------

    fn fetch_next_token(&mut self) -> Result<(), ScannerError> {
        self.want(1)?;
        if !self.stream_start_produced {
            self.fetch_stream_start();
            return Ok(());
        }
        self.skip_to_next_token()?;
        self.purge_stale_simple_keys()?;
        self.unroll_indent(self.mark.column as i64);
        self.want(4)?;

        let Some(ch) = self.ch() else {
            return self.fetch_stream_end();
        };

        if self.mark.column == 0 {
            if ch == '%' {
                return self.fetch_directive();
            }
            if self.triple('-') && is_blankz(self.look(3)) {
                return self.fetch_document_indicator(TokenKind::DocumentStart);
            }
            if self.triple('.') && is_blankz(self.look(3)) {
                return self.fetch_document_indicator(TokenKind::DocumentEnd);
            }
        }

        match ch {
            '[' => return self.fetch_flow_collection_start(TokenKind::FlowSequenceStart),
            '{' => return self.fetch_flow_collection_start(TokenKind::FlowMappingStart),
            ']' => return self.fetch_flow_collection_end(TokenKind::FlowSequenceEnd),
            '}' => return self.fetch_flow_collection_end(TokenKind::FlowMappingEnd),
            ',' => return self.fetch_flow_entry(),
            '*' => return self.fetch_anchor(true),
            '&' => return self.fetch_anchor(false),
            '!' => return self.fetch_tag(),
            '\'' => return self.fetch_flow_scalar(true),
            '"' => return self.fetch_flow_scalar(false),
            '|' if self.flow_level == 0 => return self.fetch_block_scalar(true),
            '>' if self.flow_level == 0 => return self.fetch_block_scalar(false),
            '-' if is_blankz(self.look(1)) => return self.fetch_block_entry(),
            '?' if self.flow_level > 0 || is_blankz(self.look(1)) => return self.fetch_key(),
            ':' if self.flow_level > 0 || is_blankz(self.look(1)) => return self.fetch_value(),
            _ => {}
        }

        let cannot_start_plain = matches!(
            ch,
            '-' | '?'
                | ':'
                | ','
                | '['
                | ']'
                | '{'
                | '}'
                | '#'
                | '&'
                | '*'
                | '!'
                | '|'
                | '>'
                | '\''
                | '"'
                | '%'
                | '@'
                | '`'
        ) || is_blankz(ch);
        let starts_plain = !cannot_start_plain
            || (ch == '-' && !is_blank(self.look(1)))
            || (self.flow_level == 0 && matches!(ch, '?' | ':') && !is_blankz(self.look(1)));
        if starts_plain {
            return self.fetch_plain_scalar();
        }

        self.fail(
            "while scanning for the next token",
            self.mark,
            "found character that cannot start any token",
        )
    }

    /// Skip blanks, comments, and line breaks up to the next token, tracking
    /// where a simple key becomes possible again.
    fn skip_to_next_token(&mut self) -> Result<(), ScannerError> {
        loop {
            self.want(1)?;
            if self.mark.column == 0 && self.check('\u{feff}') {
                self.skip();
            }
            self.want(1)?;
            // Tabs may separate tokens only where a simple key cannot start.
            while self.check(' ')
                || ((self.flow_level > 0 || !self.simple_key_allowed) && self.check('\t'))
            {
                self.skip();
                self.want(1)?;
            }
            if self.check('#') {
                while !is_breakz(self.ch()) {
                    self.skip();
                    self.want(1)?;
                }
            }
            if !is_break(self.ch()) {
                break;
            }
            self.want(2)?;
            self.skip_break();
            if self.flow_level == 0 {
                self.simple_key_allowed = true;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Simple keys, indentation, flow level.
    // ------------------------------------------------------------------

    /// Drop candidates whose key can no longer appear: a simple key must stay
    /// on one line and within 1024 characters of its start.
    fn purge_stale_simple_keys(&mut self) -> Result<(), ScannerError> {
        for key in &mut self.simple_keys {
            if key.possible
                && (key.mark.line < self.mark.line || key.mark.index + 1024 < self.mark.index)
            {
                if key.required {
                    return Err(ScannerError::Problem {
                        context: "while scanning a simple key",
                        context_mark: key.mark,
                        problem: "could not find expected ':'",
                        problem_mark: self.mark,
                    });
                }
                key.possible = false;
            }
        }
        Ok(())
    }

    fn save_simple_key(&mut self) -> Result<(), ScannerError> {
        let required = self.flow_level == 0 && self.indent == self.mark.column as i64;
        if self.simple_key_allowed {
            let key = SimpleKey {
                possible: true,
                required,
                token_number: self.tokens_parsed + self.tokens.len(),
                mark: self.mark,
            };
            self.remove_simple_key()?;
            *self
                .simple_keys
                .last_mut()
                .expect("simple key stack is empty") = key;
        }
        Ok(())
    }

    fn remove_simple_key(&mut self) -> Result<(), ScannerError> {
        let key = self
            .simple_keys
            .last_mut()
            .expect("simple key stack is empty");
        if key.possible && key.required {
            let mark = key.mark;
            return Err(ScannerError::Problem {
                context: "while scanning a simple key",
                context_mark: mark,
                problem: "could not find expected ':'",
                problem_mark: self.mark,
            });
        }
        key.possible = false;
        Ok(())
    }

    fn push_flow_level(&mut self) {
        self.simple_keys.push(SimpleKey::default());
        self.flow_level += 1;
    }

    fn pop_flow_level(&mut self) {
        if self.flow_level > 0 {
            self.flow_level -= 1;
            self.simple_keys.pop();
        }
    }

    /// In block context, open a new collection at `column` by pushing the
    /// indent and queueing a BLOCK-*-START token. With `number`, the token is
    /// inserted at that stream position instead of appended.
    fn roll_indent(&mut self, column: i64, number: Option<usize>, kind: TokenKind, mark: Mark) {
        if self.flow_level > 0 {
            return;
        }
        if self.indent < column {
            self.indents.push(self.indent);
            self.indent = column;
            let token = Token::new(kind, mark, mark);
            match number {
                None => self.tokens.push_back(token),
                Some(number) => self.tokens.insert(number - self.tokens_parsed, token),
            }
        }
    }

    /// Pop indents above `column`, emitting one BLOCK-END per popped level.
    fn unroll_indent(&mut self, column: i64) {
        if self.flow_level > 0 {
            return;
        }
        while self.indent > column {
            self.tokens
                .push_back(Token::new(TokenKind::BlockEnd, self.mark, self.mark));
            self.indent = self.indents.pop().expect("indent stack is empty");
        }
    }

    // ------------------------------------------------------------------
    // Fetchers.
    // ------------------------------------------------------------------

    fn fetch_stream_start(&mut self) {
        self.indent = -1;
        self.simple_keys.push(SimpleKey::default());
        self.simple_key_allowed = true;
        self.stream_start_produced = true;
        let token = Token::new(
            TokenKind::StreamStart {
                encoding: self.reader.encoding,
            },
            self.mark,
            self.mark,
        );
        self.tokens.push_back(token);
    }

    fn fetch_stream_end(&mut self) -> Result<(), ScannerError> {
        if self.mark.column != 0 {
            self.mark.column = 0;
            self.mark.line += 1;
        }
        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        self.tokens
            .push_back(Token::new(TokenKind::StreamEnd, self.mark, self.mark));
        Ok(())
    }

    fn fetch_directive(&mut self) -> Result<(), ScannerError> {
        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_directive()?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_document_indicator(&mut self, kind: TokenKind) -> Result<(), ScannerError> {
        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        let start_mark = self.mark;
        self.skip();
        self.skip();
        self.skip();
        self.tokens.push_back(Token::new(kind, start_mark, self.mark));
        Ok(())
    }

    fn fetch_flow_collection_start(&mut self, kind: TokenKind) -> Result<(), ScannerError> {
        self.save_simple_key()?;
        self.push_flow_level();
        self.simple_key_allowed = true;
        let start_mark = self.mark;
        self.skip();
        self.tokens.push_back(Token::new(kind, start_mark, self.mark));
        Ok(())
    }

    fn fetch_flow_collection_end(&mut self, kind: TokenKind) -> Result<(), ScannerError> {
        self.remove_simple_key()?;
        self.pop_flow_level();
        self.simple_key_allowed = false;
        let start_mark = self.mark;
        self.skip();
        self.tokens.push_back(Token::new(kind, start_mark, self.mark));
        Ok(())
    }

    fn fetch_flow_entry(&mut self) -> Result<(), ScannerError> {
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        let start_mark = self.mark;
        self.skip();
        self.tokens
            .push_back(Token::new(TokenKind::FlowEntry, start_mark, self.mark));
        Ok(())
    }

    fn fetch_block_entry(&mut self) -> Result<(), ScannerError> {
        if self.flow_level == 0 {
            if !self.simple_key_allowed {
                return self.fail(
                    "",
                    self.mark,
                    "block sequence entries are not allowed in this context",
                );
            }
            self.roll_indent(
                self.mark.column as i64,
                None,
                TokenKind::BlockSequenceStart,
                self.mark,
            );
        }
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        let start_mark = self.mark;
        self.skip();
        self.tokens
            .push_back(Token::new(TokenKind::BlockEntry, start_mark, self.mark));
        Ok(())
    }

    fn fetch_key(&mut self) -> Result<(), ScannerError> {
        if self.flow_level == 0 {
            if !self.simple_key_allowed {
                return self.fail("", self.mark, "mapping keys are not allowed in this context");
            }
            self.roll_indent(
                self.mark.column as i64,
                None,
                TokenKind::BlockMappingStart,
                self.mark,
            );
        }
        self.remove_simple_key()?;
        self.simple_key_allowed = self.flow_level == 0;
        let start_mark = self.mark;
        self.skip();
        self.tokens
            .push_back(Token::new(TokenKind::Key, start_mark, self.mark));
        Ok(())
    }

    fn fetch_value(&mut self) -> Result<(), ScannerError> {
        let key = *self
            .simple_keys
            .last()
            .expect("simple key stack is empty");
        if key.possible {
            // The saved candidate turned out to be a key after all. Insert
            // the KEY token at its recorded position, and possibly a
            // BLOCK-MAPPING-START just before it.
            self.tokens.insert(
                key.token_number - self.tokens_parsed,
                Token::new(TokenKind::Key, key.mark, key.mark),
            );
            self.simple_keys
                .last_mut()
                .expect("simple key stack is empty")
                .possible = false;
            self.roll_indent(
                key.mark.column as i64,
                Some(key.token_number),
                TokenKind::BlockMappingStart,
                key.mark,
            );
            self.simple_key_allowed = false;
        } else {
            if self.flow_level == 0 {
                if !self.simple_key_allowed {
                    return self.fail(
                        "",
                        self.mark,
                        "mapping values are not allowed in this context",
                    );
                }
                self.roll_indent(
                    self.mark.column as i64,
                    None,
                    TokenKind::BlockMappingStart,
                    self.mark,
                );
            }
            self.simple_key_allowed = self.flow_level == 0;
        }
        let start_mark = self.mark;
        self.skip();
        self.tokens
            .push_back(Token::new(TokenKind::Value, start_mark, self.mark));
        Ok(())
    }

    fn fetch_anchor(&mut self, alias: bool) -> Result<(), ScannerError> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_anchor(alias)?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_tag(&mut self) -> Result<(), ScannerError> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_tag()?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_block_scalar(&mut self, literal: bool) -> Result<(), ScannerError> {
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        let token = self.scan_block_scalar(literal)?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_flow_scalar(&mut self, single: bool) -> Result<(), ScannerError> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_flow_scalar(single)?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_plain_scalar(&mut self) -> Result<(), ScannerError> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_plain_scalar()?;
        self.tokens.push_back(token);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Scanners proper.
    // ------------------------------------------------------------------

    fn scan_directive(&mut self) -> Result<Token, ScannerError> {
        let start_mark = self.mark;
        self.skip();
        let name = self.scan_directive_name(start_mark)?;
        let kind = if name == "YAML" {
            let (major, minor) = self.scan_version_directive_value(start_mark)?;
            TokenKind::VersionDirective { major, minor }
        } else if name == "TAG" {
            let (handle, prefix) = self.scan_tag_directive_value(start_mark)?;
            TokenKind::TagDirective { handle, prefix }
        } else {
            return self.fail(
                "while scanning a directive",
                start_mark,
                "found unknown directive name",
            );
        };
        let end_mark = self.mark;

        self.want(1)?;
        while is_blank(self.ch()) {
            self.skip();
            self.want(1)?;
        }
        if self.check('#') {
            while !is_breakz(self.ch()) {
                self.skip();
                self.want(1)?;
            }
        }
        if !is_breakz(self.ch()) {
            return self.fail(
                "while scanning a directive",
                start_mark,
                "did not find expected comment or line break",
            );
        }
        if is_break(self.ch()) {
            self.want(2)?;
            self.skip_break();
        }
        Ok(Token::new(kind, start_mark, end_mark))
    }

    fn scan_directive_name(&mut self, start_mark: Mark) -> Result<String, ScannerError> {
        let mut name = String::new();
        self.want(1)?;
        while is_alpha(self.ch()) {
            self.read_into(&mut name);
            self.want(1)?;
        }
        if name.is_empty() {
            return self.fail(
                "while scanning a directive",
                start_mark,
                "could not find expected directive name",
            );
        }
        if !is_blankz(self.ch()) {
            return self.fail(
                "while scanning a directive",
                start_mark,
                "found unexpected non-alphabetical character",
            );
        }
        Ok(name)
    }

    fn scan_version_directive_value(
        &mut self,
        start_mark: Mark,
    ) -> Result<(i32, i32), ScannerError> {
        self.want(1)?;
        while is_blank(self.ch()) {
            self.skip();
            self.want(1)?;
        }
        let major = self.scan_version_number(start_mark)?;
        if !self.check('.') {
            return self.fail(
                "while scanning a %YAML directive",
                start_mark,
                "did not find expected digit or '.' character",
            );
        }
        self.skip();
        let minor = self.scan_version_number(start_mark)?;
        Ok((major, minor))
    }

    fn scan_version_number(&mut self, start_mark: Mark) -> Result<i32, ScannerError> {
        const MAX_NUMBER_LENGTH: usize = 9;
        let mut value: i32 = 0;
        let mut length = 0;
        self.want(1)?;
        while self.is_digit() {
            length += 1;
            if length > MAX_NUMBER_LENGTH {
                return self.fail(
                    "while scanning a %YAML directive",
                    start_mark,
                    "found extremely long version number",
                );
            }
            value = value * 10 + self.digit() as i32;
            self.skip();
            self.want(1)?;
        }
        if length == 0 {
            return self.fail(
                "while scanning a %YAML directive",
                start_mark,
                "did not find expected version number",
            );
        }
        Ok(value)
    }

    fn scan_tag_directive_value(
        &mut self,
        start_mark: Mark,
    ) -> Result<(String, String), ScannerError> {
        self.want(1)?;
        while is_blank(self.ch()) {
            self.skip();
            self.want(1)?;
        }
        let handle = self.scan_tag_handle(true, start_mark)?;
        self.want(1)?;
        if !is_blank(self.ch()) {
            return self.fail(
                "while scanning a %TAG directive",
                start_mark,
                "did not find expected whitespace",
            );
        }
        while is_blank(self.ch()) {
            self.skip();
            self.want(1)?;
        }
        let prefix = self.scan_tag_uri(true, true, None, start_mark)?;
        self.want(1)?;
        if !is_blankz(self.ch()) {
            return self.fail(
                "while scanning a %TAG directive",
                start_mark,
                "did not find expected whitespace or line break",
            );
        }
        Ok((handle, prefix))
    }

    fn scan_anchor(&mut self, alias: bool) -> Result<Token, ScannerError> {
        let start_mark = self.mark;
        self.skip();
        let mut name = String::new();
        self.want(1)?;
        while is_alpha(self.ch()) {
            self.read_into(&mut name);
            self.want(1)?;
        }
        let end_mark = self.mark;
        let followed_ok = is_blankz(self.ch())
            || matches!(self.ch(), Some('?' | ':' | ',' | ']' | '}' | '%' | '@' | '`'));
        if name.is_empty() || !followed_ok {
            return self.fail(
                if alias {
                    "while scanning an alias"
                } else {
                    "while scanning an anchor"
                },
                start_mark,
                "did not find expected alphabetic or numeric character",
            );
        }
        let kind = if alias {
            TokenKind::Alias { value: name }
        } else {
            TokenKind::Anchor { value: name }
        };
        Ok(Token::new(kind, start_mark, end_mark))
    }

    fn scan_tag(&mut self) -> Result<Token, ScannerError> {
        let start_mark = self.mark;
        self.want(2)?;

        let handle;
        let suffix;
        if self.check_at('<', 1) {
            // Verbatim tag: !<uri>
            handle = String::new();
            self.skip();
            self.skip();
            suffix = self.scan_tag_uri(true, false, None, start_mark)?;
            if !self.check('>') {
                return self.fail(
                    "while scanning a tag",
                    start_mark,
                    "did not find the expected '>'",
                );
            }
            self.skip();
        } else {
            let first = self.scan_tag_handle(false, start_mark)?;
            if first.len() > 1 && first.starts_with('!') && first.ends_with('!') {
                // A named handle: !name!suffix
                handle = first;
                suffix = self.scan_tag_uri(false, false, None, start_mark)?;
            } else {
                // Either !suffix on the primary handle, or the bare
                // non-specific tag `!` with an empty handle.
                let rest = self.scan_tag_uri(false, false, Some(&first), start_mark)?;
                if rest.is_empty() {
                    handle = String::new();
                    suffix = String::from("!");
                } else {
                    handle = String::from("!");
                    suffix = rest;
                }
            }
        }

        self.want(1)?;
        if !is_blankz(self.ch()) && (self.flow_level == 0 || !self.check(',')) {
            return self.fail(
                "while scanning a tag",
                start_mark,
                "did not find expected whitespace or line break",
            );
        }
        let end_mark = self.mark;
        Ok(Token::new(
            TokenKind::Tag { handle, suffix },
            start_mark,
            end_mark,
        ))
    }

    fn scan_tag_handle(&mut self, directive: bool, start_mark: Mark) -> Result<String, ScannerError> {
        let context = if directive {
            "while scanning a tag directive"
        } else {
            "while scanning a tag"
        };
        let mut handle = String::new();
        self.want(1)?;
        if !self.check('!') {
            return self.fail(context, start_mark, "did not find expected '!'");
        }
        self.read_into(&mut handle);
        self.want(1)?;
        while is_alpha(self.ch()) {
            self.read_into(&mut handle);
            self.want(1)?;
        }
        if self.check('!') {
            self.read_into(&mut handle);
        } else if directive && handle != "!" {
            // A %TAG handle must be closed by a second '!'.
            return self.fail(
                "while parsing a tag directive",
                start_mark,
                "did not find expected '!'",
            );
        }
        Ok(handle)
    }

    fn scan_tag_uri(
        &mut self,
        uri_char: bool,
        directive: bool,
        head: Option<&str>,
        start_mark: Mark,
    ) -> Result<String, ScannerError> {
        let head = head.unwrap_or("");
        let mut length = head.len();
        let mut uri = String::new();
        // The handle's leading '!' is not part of the suffix.
        if length > 1 {
            uri.push_str(&head[1..]);
        }
        self.want(1)?;
        loop {
            let Some(ch) = self.ch() else { break };
            let accepted = is_alpha(ch)
                || is_uri_symbol(ch)
                || (uri_char && matches!(ch, ',' | '[' | ']'));
            if !accepted {
                break;
            }
            if ch == '%' {
                self.scan_uri_escapes(directive, start_mark, &mut uri)?;
            } else {
                self.read_into(&mut uri);
            }
            length += 1;
            self.want(1)?;
        }
        if length == 0 {
            return self.fail(
                if directive {
                    "while parsing a %TAG directive"
                } else {
                    "while parsing a tag"
                },
                start_mark,
                "did not find expected tag URI",
            );
        }
        Ok(uri)
    }

    /// Decode a run of `%HH` escapes into one character. The escaped octets
    /// form a UTF-8 sequence whose length is checked against its leading
    /// octet.
    fn scan_uri_escapes(
        &mut self,
        directive: bool,
        start_mark: Mark,
        uri: &mut String,
    ) -> Result<(), ScannerError> {
        let context = if directive {
            "while parsing a %TAG directive"
        } else {
            "while parsing a tag"
        };
        let mut value: u32 = 0;
        let mut remaining = 0usize;
        let mut started = false;
        loop {
            self.want(3)?;
            let escaped = self.check('%');
            let (Some(hi), Some(lo)) = (self.hex_at(1), self.hex_at(2)) else {
                return self.fail(context, start_mark, "did not find URI escaped octet");
            };
            if !escaped {
                return self.fail(context, start_mark, "did not find URI escaped octet");
            }
            let octet = ((hi << 4) | lo) as u8;
            if started {
                if octet & 0xc0 != 0x80 {
                    return self.fail(
                        context,
                        start_mark,
                        "found an incorrect trailing UTF-8 octet",
                    );
                }
                value = (value << 6) | u32::from(octet & 0x3f);
            } else {
                started = true;
                let Some(start) = utf8_sequence_start(octet) else {
                    return self.fail(
                        context,
                        start_mark,
                        "found an incorrect leading UTF-8 octet",
                    );
                };
                (remaining, value) = start;
            }
            self.skip();
            self.skip();
            self.skip();
            remaining -= 1;
            if remaining == 0 {
                break;
            }
        }
        let Some(ch) = char::from_u32(value) else {
            return self.fail(
                context,
                start_mark,
                "found an invalid Unicode character escape",
            );
        };
        uri.push(ch);
        Ok(())
    }

    fn scan_block_scalar(&mut self, literal: bool) -> Result<Token, ScannerError> {
        let start_mark = self.mark;
        self.skip();
        self.want(1)?;

        // Chomping and indentation indicators, in either order.
        // -1 strips trailing breaks, 1 keeps them, 0 clips to one.
        let mut chomping: i32 = 0;
        let mut increment: i64 = 0;
        if self.check('+') || self.check('-') {
            chomping = if self.check('+') { 1 } else { -1 };
            self.skip();
            self.want(1)?;
            if self.is_digit() {
                if self.check('0') {
                    return self.fail(
                        "while scanning a block scalar",
                        start_mark,
                        "found an indentation indicator equal to 0",
                    );
                }
                increment = i64::from(self.digit());
                self.skip();
            }
        } else if self.is_digit() {
            if self.check('0') {
                return self.fail(
                    "while scanning a block scalar",
                    start_mark,
                    "found an indentation indicator equal to 0",
                );
            }
            increment = i64::from(self.digit());
            self.skip();
            self.want(1)?;
            if self.check('+') || self.check('-') {
                chomping = if self.check('+') { 1 } else { -1 };
                self.skip();
            }
        }

        self.want(1)?;
        while is_blank(self.ch()) {
            self.skip();
            self.want(1)?;
        }
        if self.check('#') {
            while !is_breakz(self.ch()) {
                self.skip();
                self.want(1)?;
            }
        }
        if !is_breakz(self.ch()) {
            return self.fail(
                "while scanning a block scalar",
                start_mark,
                "did not find expected comment or line break",
            );
        }
        if is_break(self.ch()) {
            self.want(2)?;
            self.skip_break();
        }

        let mut end_mark = self.mark;
        let mut indent: i64 = if increment == 0 {
            0
        } else if self.indent >= 0 {
            self.indent + increment
        } else {
            increment
        };

        let mut string = String::new();
        let mut leading_break = String::new();
        let mut trailing_breaks = String::new();
        let mut leading_blank = false;
        self.scan_block_scalar_breaks(&mut indent, &mut trailing_breaks, start_mark, &mut end_mark)?;

        self.want(1)?;
        while self.mark.column as i64 == indent && !self.at_end() {
            // Fold a single break between non-blank lines, unless literal.
            let trailing_blank = is_blank(self.ch());
            if !literal && leading_break.starts_with('\n') && !leading_blank && !trailing_blank {
                if trailing_breaks.is_empty() {
                    string.push(' ');
                }
                leading_break.clear();
            } else {
                string.push_str(&leading_break);
                leading_break.clear();
            }
            string.push_str(&trailing_breaks);
            trailing_breaks.clear();
            leading_blank = is_blank(self.ch());
            while !is_breakz(self.ch()) {
                self.read_into(&mut string);
                self.want(1)?;
            }
            self.want(2)?;
            self.read_break_into(&mut leading_break);
            self.scan_block_scalar_breaks(
                &mut indent,
                &mut trailing_breaks,
                start_mark,
                &mut end_mark,
            )?;
        }

        if chomping != -1 {
            string.push_str(&leading_break);
        }
        if chomping == 1 {
            string.push_str(&trailing_breaks);
        }

        let style = if literal {
            ScalarStyle::Literal
        } else {
            ScalarStyle::Folded
        };
        Ok(Token::new(
            TokenKind::Scalar {
                value: string,
                style,
            },
            start_mark,
            end_mark,
        ))
    }

    /// Consume the indentation and empty lines between block-scalar content
    /// lines, accumulating the breaks. On the first call with no explicit
    /// indentation indicator, the content indent is determined here.
    fn scan_block_scalar_breaks(
        &mut self,
        indent: &mut i64,
        breaks: &mut String,
        start_mark: Mark,
        end_mark: &mut Mark,
    ) -> Result<(), ScannerError> {
        let mut max_indent: i64 = 0;
        *end_mark = self.mark;
        loop {
            self.want(1)?;
            while (*indent == 0 || (self.mark.column as i64) < *indent) && self.check(' ') {
                self.skip();
                self.want(1)?;
            }
            if self.mark.column as i64 > max_indent {
                max_indent = self.mark.column as i64;
            }
            if (*indent == 0 || (self.mark.column as i64) < *indent) && self.check('\t') {
                return self.fail(
                    "while scanning a block scalar",
                    start_mark,
                    "found a tab character where an indentation space is expected",
                );
            }
            if !is_break(self.ch()) {
                break;
            }
            self.want(2)?;
            self.read_break_into(breaks);
            *end_mark = self.mark;
        }
        if *indent == 0 {
            *indent = max_indent.max(self.indent + 1).max(1);
        }
        Ok(())
    }

    fn scan_flow_scalar(&mut self, single: bool) -> Result<Token, ScannerError> {
        let quote = if single { '\'' } else { '"' };
        let start_mark = self.mark;
        self.skip();

        let mut string = String::new();
        let mut leading_break = String::new();
        let mut trailing_breaks = String::new();
        let mut whitespaces = String::new();

        loop {
            self.want(4)?;
            if self.mark.column == 0
                && (self.triple('-') || self.triple('.'))
                && is_blankz(self.look(3))
            {
                return self.fail(
                    "while scanning a quoted scalar",
                    start_mark,
                    "found unexpected document indicator",
                );
            }
            if self.at_end() {
                return self.fail(
                    "while scanning a quoted scalar",
                    start_mark,
                    "found unexpected end of stream",
                );
            }

            self.want(2)?;
            let mut leading_blanks = false;
            while !is_blankz(self.ch()) {
                if single && self.check('\'') && self.check_at('\'', 1) {
                    // '' is an escaped single quote.
                    string.push('\'');
                    self.skip();
                    self.skip();
                } else if self.check(quote) {
                    break;
                } else if !single && self.check('\\') && is_break(self.look(1)) {
                    // An escaped break eats the break and the following
                    // indentation.
                    self.want(3)?;
                    self.skip();
                    self.skip_break();
                    leading_blanks = true;
                    break;
                } else if !single && self.check('\\') {
                    self.scan_double_quoted_escape(&mut string, start_mark)?;
                } else {
                    self.read_into(&mut string);
                }
                self.want(2)?;
            }
            self.want(1)?;
            if self.check(quote) {
                break;
            }

            self.want(1)?;
            while is_blank(self.ch()) || is_break(self.ch()) {
                if is_blank(self.ch()) {
                    if leading_blanks {
                        self.skip();
                    } else {
                        self.read_into(&mut whitespaces);
                    }
                } else {
                    self.want(2)?;
                    if leading_blanks {
                        self.read_break_into(&mut trailing_breaks);
                    } else {
                        whitespaces.clear();
                        self.read_break_into(&mut leading_break);
                        leading_blanks = true;
                    }
                }
                self.want(1)?;
            }

            if leading_blanks {
                if leading_break.starts_with('\n') {
                    if trailing_breaks.is_empty() {
                        string.push(' ');
                    } else {
                        string.push_str(&trailing_breaks);
                        trailing_breaks.clear();
                    }
                    leading_break.clear();
                } else {
                    string.push_str(&leading_break);
                    string.push_str(&trailing_breaks);
                    leading_break.clear();
                    trailing_breaks.clear();
                }
            } else {
                string.push_str(&whitespaces);
                whitespaces.clear();
            }
        }

        self.skip();
        let end_mark = self.mark;
        let style = if single {
            ScalarStyle::SingleQuoted
        } else {
            ScalarStyle::DoubleQuoted
        };
        Ok(Token::new(
            TokenKind::Scalar {
                value: string,
                style,
            },
            start_mark,
            end_mark,
        ))
    }

    fn scan_double_quoted_escape(
        &mut self,
        string: &mut String,
        start_mark: Mark,
    ) -> Result<(), ScannerError> {
        let mut code_length = 0usize;
        match self.look(1) {
            Some('0') => string.push('\0'),
            Some('a') => string.push('\x07'),
            Some('b') => string.push('\x08'),
            Some('t' | '\t') => string.push('\t'),
            Some('n') => string.push('\n'),
            Some('v') => string.push('\x0b'),
            Some('f') => string.push('\x0c'),
            Some('r') => string.push('\r'),
            Some('e') => string.push('\x1b'),
            Some(' ') => string.push(' '),
            Some('"') => string.push('"'),
            Some('/') => string.push('/'),
            Some('\\') => string.push('\\'),
            Some('N') => string.push('\u{0085}'),
            Some('_') => string.push('\u{00a0}'),
            Some('L') => string.push('\u{2028}'),
            Some('P') => string.push('\u{2029}'),
            Some('x') => code_length = 2,
            Some('u') => code_length = 4,
            Some('U') => code_length = 8,
            _ => {
                return self.fail(
                    "while parsing a quoted scalar",
                    start_mark,
                    "found unknown escape character",
                );
            }
        }
        self.skip();
        self.skip();

        if code_length > 0 {
            self.want(code_length)?;
            let mut value: u32 = 0;
            for at in 0..code_length {
                let Some(digit) = self.hex_at(at) else {
                    return self.fail(
                        "while parsing a quoted scalar",
                        start_mark,
                        "did not find expected hexadecimal number",
                    );
                };
                value = (value << 4) + digit;
            }
            // Surrogate code points and anything past U+10FFFF are invalid.
            let Some(ch) = char::from_u32(value) else {
                return self.fail(
                    "while parsing a quoted scalar",
                    start_mark,
                    "found invalid Unicode character escape code",
                );
            };
            string.push(ch);
            for _ in 0..code_length {
                self.skip();
            }
        }
        Ok(())
    }

    fn scan_plain_scalar(&mut self) -> Result<Token, ScannerError> {
        let mut string = String::new();
        let mut leading_break = String::new();
        let mut trailing_breaks = String::new();
        let mut whitespaces = String::new();
        let mut leading_blanks = false;
        let indent = self.indent + 1;
        let start_mark = self.mark;
        let mut end_mark = self.mark;

        loop {
            self.want(4)?;
            if self.mark.column == 0
                && (self.triple('-') || self.triple('.'))
                && is_blankz(self.look(3))
            {
                break;
            }
            if self.check('#') {
                break;
            }
            while !is_blankz(self.ch()) {
                if self.flow_level > 0
                    && self.check(':')
                    && matches!(self.look(1), Some(',' | '?' | '[' | ']' | '{' | '}'))
                {
                    return self.fail(
                        "while scanning a plain scalar",
                        start_mark,
                        "found unexpected ':'",
                    );
                }
                if (self.check(':') && is_blankz(self.look(1)))
                    || (self.flow_level > 0
                        && matches!(self.ch(), Some(',' | '[' | ']' | '{' | '}')))
                {
                    break;
                }
                // Before the next word, fold the accumulated breaks or flush
                // the accumulated spaces.
                if leading_blanks || !whitespaces.is_empty() {
                    if leading_blanks {
                        if leading_break.starts_with('\n') {
                            if trailing_breaks.is_empty() {
                                string.push(' ');
                            } else {
                                string.push_str(&trailing_breaks);
                                trailing_breaks.clear();
                            }
                            leading_break.clear();
                        } else {
                            string.push_str(&leading_break);
                            string.push_str(&trailing_breaks);
                            leading_break.clear();
                            trailing_breaks.clear();
                        }
                        leading_blanks = false;
                    } else {
                        string.push_str(&whitespaces);
                        whitespaces.clear();
                    }
                }
                self.read_into(&mut string);
                end_mark = self.mark;
                self.want(2)?;
            }
            if !(is_blank(self.ch()) || is_break(self.ch())) {
                break;
            }
            self.want(1)?;
            while is_blank(self.ch()) || is_break(self.ch()) {
                if is_blank(self.ch()) {
                    if leading_blanks
                        && (self.mark.column as i64) < indent
                        && self.check('\t')
                    {
                        return self.fail(
                            "while scanning a plain scalar",
                            start_mark,
                            "found a tab character that violates indentation",
                        );
                    }
                    if leading_blanks {
                        self.skip();
                    } else {
                        self.read_into(&mut whitespaces);
                    }
                } else {
                    self.want(2)?;
                    if leading_blanks {
                        self.read_break_into(&mut trailing_breaks);
                    } else {
                        whitespaces.clear();
                        self.read_break_into(&mut leading_break);
                        leading_blanks = true;
                    }
                }
                self.want(1)?;
            }
            if self.flow_level == 0 && (self.mark.column as i64) < indent {
                break;
            }
        }

        // A multi-line plain scalar re-allows a simple key on the next line.
        if leading_blanks {
            self.simple_key_allowed = true;
        }
        Ok(Token::new(
            TokenKind::Scalar {
                value: string,
                style: ScalarStyle::Plain,
            },
            start_mark,
            end_mark,
        ))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn scan_all(input: &str) -> Result<Vec<TokenKind>, ScannerError> {
        let mut bytes = input.as_bytes();
        let mut scanner = Scanner::new();
        scanner.set_input(&mut bytes);
        let mut kinds = Vec::new();
        loop {
            let token = scanner.next_token()?;
            let done = matches!(token.kind, TokenKind::StreamEnd);
            kinds.push(token.kind);
            if done {
                return Ok(kinds);
            }
        }
    }

    fn scalar(value: &str, style: ScalarStyle) -> TokenKind {
        TokenKind::Scalar {
            value: String::from(value),
            style,
        }
    }

    #[test]
    fn block_mapping_with_simple_keys() {
        let kinds = scan_all("a: 1\nb:\n  c: 2\n").unwrap();
        assert_eq!(
            kinds,
            vec![
                TokenKind::StreamStart {
                    encoding: Encoding::Utf8
                },
                TokenKind::BlockMappingStart,
                TokenKind::Key,
                scalar("a", ScalarStyle::Plain),
                TokenKind::Value,
                scalar("1", ScalarStyle::Plain),
                TokenKind::Key,
                scalar("b", ScalarStyle::Plain),
                TokenKind::Value,
                TokenKind::BlockMappingStart,
                TokenKind::Key,
                scalar("c", ScalarStyle::Plain),
                TokenKind::Value,
                scalar("2", ScalarStyle::Plain),
                TokenKind::BlockEnd,
                TokenKind::BlockEnd,
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn flow_sequence() {
        let kinds = scan_all("[a, b]\n").unwrap();
        assert_eq!(
            kinds,
            vec![
                TokenKind::StreamStart {
                    encoding: Encoding::Utf8
                },
                TokenKind::FlowSequenceStart,
                scalar("a", ScalarStyle::Plain),
                TokenKind::FlowEntry,
                scalar("b", ScalarStyle::Plain),
                TokenKind::FlowSequenceEnd,
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn block_sequence_entries() {
        let kinds = scan_all("- a\n- b\n").unwrap();
        assert_eq!(
            kinds,
            vec![
                TokenKind::StreamStart {
                    encoding: Encoding::Utf8
                },
                TokenKind::BlockSequenceStart,
                TokenKind::BlockEntry,
                scalar("a", ScalarStyle::Plain),
                TokenKind::BlockEntry,
                scalar("b", ScalarStyle::Plain),
                TokenKind::BlockEnd,
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn literal_scalar_strip_chomping() {
        let kinds = scan_all("|-\n  line1\n  line2\n\n").unwrap();
        assert_eq!(kinds[1], scalar("line1\nline2", ScalarStyle::Literal));
    }

    #[test]
    fn literal_scalar_keep_chomping() {
        let kinds = scan_all("|+\n  line1\n\n").unwrap();
        assert_eq!(kinds[1], scalar("line1\n\n", ScalarStyle::Literal));
    }

    #[test]
    fn literal_scalar_clip_chomping() {
        let kinds = scan_all("|\n  line1\n\n").unwrap();
        assert_eq!(kinds[1], scalar("line1\n", ScalarStyle::Literal));
    }

    #[test]
    fn folded_scalar_folds_lines() {
        let kinds = scan_all(">\n  one\n  two\n\n  three\n").unwrap();
        assert_eq!(kinds[1], scalar("one two\nthree\n", ScalarStyle::Folded));
    }

    #[test]
    fn zero_indentation_indicator_is_an_error() {
        assert!(scan_all("|0\n  x\n").is_err());
    }

    #[test]
    fn plain_scalar_folds_line_breaks() {
        let kinds = scan_all("one\ntwo\n\nthree\n").unwrap();
        assert_eq!(kinds[1], scalar("one two\nthree", ScalarStyle::Plain));
    }

    #[test]
    fn single_quoted_escaped_quote() {
        let kinds = scan_all("'it''s'\n").unwrap();
        assert_eq!(kinds[1], scalar("it's", ScalarStyle::SingleQuoted));
    }

    #[test]
    fn double_quoted_escapes() {
        let kinds = scan_all("\"a\\tb\\u263A\\x41\"\n").unwrap();
        assert_eq!(kinds[1], scalar("a\tb\u{263a}A", ScalarStyle::DoubleQuoted));
    }

    #[test]
    fn double_quoted_escaped_break() {
        let kinds = scan_all("\"one \\\n  two\"\n").unwrap();
        assert_eq!(kinds[1], scalar("one two", ScalarStyle::DoubleQuoted));
    }

    #[test]
    fn directives_and_document_markers() {
        let kinds = scan_all("%YAML 1.2\n---\nx\n...\n").unwrap();
        assert_eq!(
            kinds,
            vec![
                TokenKind::StreamStart {
                    encoding: Encoding::Utf8
                },
                TokenKind::VersionDirective { major: 1, minor: 2 },
                TokenKind::DocumentStart,
                scalar("x", ScalarStyle::Plain),
                TokenKind::DocumentEnd,
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn tag_shorthand_forms() {
        let kinds = scan_all("!!str a\n").unwrap();
        assert_eq!(
            kinds[1],
            TokenKind::Tag {
                handle: String::from("!!"),
                suffix: String::from("str"),
            }
        );

        let kinds = scan_all("!local b\n").unwrap();
        assert_eq!(
            kinds[1],
            TokenKind::Tag {
                handle: String::from("!"),
                suffix: String::from("local"),
            }
        );

        let kinds = scan_all("!<tag:example.com,2000:app/foo> c\n").unwrap();
        assert_eq!(
            kinds[1],
            TokenKind::Tag {
                handle: String::new(),
                suffix: String::from("tag:example.com,2000:app/foo"),
            }
        );
    }

    #[test]
    fn tag_directive_with_uri_escapes() {
        let kinds = scan_all("%TAG !e! tag:example.com,2000:%C3%A9\n---\nx\n").unwrap();
        assert_eq!(
            kinds[1],
            TokenKind::TagDirective {
                handle: String::from("!e!"),
                prefix: String::from("tag:example.com,2000:é"),
            }
        );
    }

    #[test]
    fn anchor_and_alias_tokens() {
        let kinds = scan_all("a: &x 1\nb: *x\n").unwrap();
        assert!(kinds.contains(&TokenKind::Anchor {
            value: String::from("x")
        }));
        assert!(kinds.contains(&TokenKind::Alias {
            value: String::from("x")
        }));
    }

    #[test]
    fn overlong_simple_key_loses_candidacy() {
        let mut input = "a".repeat(1100);
        input.push_str(": v\n");
        assert!(scan_all(&input).is_err());
    }

    #[test]
    fn empty_input_produces_stream_markers_only() {
        let kinds = scan_all("").unwrap();
        assert_eq!(
            kinds,
            vec![
                TokenKind::StreamStart {
                    encoding: Encoding::Utf8
                },
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn explicit_key_indicator() {
        let kinds = scan_all("? key\n: value\n").unwrap();
        assert_eq!(
            kinds,
            vec![
                TokenKind::StreamStart {
                    encoding: Encoding::Utf8
                },
                TokenKind::BlockMappingStart,
                TokenKind::Key,
                scalar("key", ScalarStyle::Plain),
                TokenKind::Value,
                scalar("value", ScalarStyle::Plain),
                TokenKind::BlockEnd,
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn comments_are_invisible_to_the_token_stream() {
        let with_comments = scan_all("# leading\na: 1 # trailing\n").unwrap();
        let without = scan_all("a: 1\n").unwrap();
        assert_eq!(with_comments, without);
    }

    #[test]
    fn plain_scalar_may_contain_colons() {
        let kinds = scan_all("a:b\n").unwrap();
        assert_eq!(kinds[1], scalar("a:b", ScalarStyle::Plain));
    }

    #[test]
    fn quoted_scalar_folds_continuation_lines() {
        let kinds = scan_all("'a\n  b'\n").unwrap();
        assert_eq!(kinds[1], scalar("a b", ScalarStyle::SingleQuoted));
    }

    #[test]
    fn mid_stream_bom_is_skipped_at_column_zero() {
        let kinds = scan_all("a: 1\n\u{feff}b: 2\n").unwrap();
        let keys: Vec<_> = kinds
            .iter()
            .filter(|kind| matches!(kind, TokenKind::Scalar { .. }))
            .collect();
        assert_eq!(keys.len(), 4);
    }

    #[test]
    fn tab_indentation_cannot_start_a_token() {
        assert!(scan_all("a: 1\n\tb: 2\n").is_err());
    }

    #[test]
    fn crlf_breaks_normalize_like_lf() {
        let dos = scan_all("a: 1\r\nb: 2\r\n").unwrap();
        let unix = scan_all("a: 1\nb: 2\n").unwrap();
        assert_eq!(dos, unix);
    }

    #[test]
    fn flow_entries_allow_tab_separators() {
        let kinds = scan_all("[a,\tb]\n").unwrap();
        assert!(kinds.contains(&scalar("b", ScalarStyle::Plain)));
    }
}
