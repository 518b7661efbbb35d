//! Lazily filled token buffer with channel filtering.

use text_size::TextSize;
use tracing::trace;

use super::{IntStream, Mark, MarkStack, TokenSource};
use crate::base::{Channel, DEFAULT_CHANNEL, EOF, INVALID_TOKEN_TYPE, Token, TokenType};
use crate::errors::RecognitionResult;

/// Random-access buffer over a [`TokenSource`].
///
/// Tokens are pulled only when lookahead or consumption reaches the end of
/// the buffer. The buffer keeps every token it has pulled, so positions saved
/// by marks stay valid for the lifetime of the stream.
///
/// The stream is tuned to one channel: tokens on other channels stay in the
/// buffer (they keep their index and render in [`BufferedTokenStream::text`])
/// but `la`, `lt` and `consume` step over them. The buffer always ends with a
/// single `EOF` token.
pub struct BufferedTokenStream<T: TokenSource> {
    source: T,
    tokens: Vec<Token>,
    /// Index of the current on-channel token
    p: usize,
    channel: Channel,
    started: bool,
    exhausted: bool,
    marks: MarkStack<usize>,
}

impl<T: TokenSource> BufferedTokenStream<T> {
    pub fn new(source: T) -> Self {
        Self::with_channel(source, DEFAULT_CHANNEL)
    }

    pub fn with_channel(source: T, channel: Channel) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            p: 0,
            channel,
            started: false,
            exhausted: false,
            marks: MarkStack::new(),
        }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn token_source(&self) -> &T {
        &self.source
    }

    /// Tokens buffered so far, every channel included.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Buffered token at absolute index `i`.
    pub fn get(&self, i: usize) -> Option<&Token> {
        self.tokens.get(i)
    }

    /// Pull everything the source has left.
    pub fn fill(&mut self) {
        while !self.exhausted {
            self.fetch();
        }
    }

    // =========================================================================
    // Buffer management
    // =========================================================================

    /// Append one token from the source, or the closing `EOF` token.
    fn fetch(&mut self) {
        if self.exhausted {
            return;
        }
        let index = self.tokens.len();
        let mut token = match self.source.next_token() {
            Some(token) => token,
            None => self.closing_eof(),
        };
        if token.token_type == EOF {
            self.exhausted = true;
            token.channel = self.channel;
        }
        token.index = Some(index);
        trace!(index, ttype = token.token_type, "buffered token");
        self.tokens.push(token);
    }

    /// The synthesized end-of-input token, placed right after the last
    /// buffered token.
    fn closing_eof(&self) -> Token {
        match self.tokens.last() {
            Some(last) => {
                let (line, column) = last.text.chars().fold((last.line, last.column), |(l, c), ch| {
                    if ch == '\n' { (l + 1, 0) } else { (l, c + 1) }
                });
                Token::eof(last.range.end(), line, column)
            }
            None => Token::eof(TextSize::new(0), 1, 0),
        }
    }

    /// Make sure index `i` is buffered (or the buffer is complete).
    fn sync(&mut self, i: usize) {
        while self.tokens.len() <= i && !self.exhausted {
            self.fetch();
        }
    }

    /// First on-channel index at or after `i`. Never moves past `EOF`.
    fn skip_off_channel(&mut self, mut i: usize) -> usize {
        loop {
            self.sync(i);
            match self.tokens.get(i) {
                Some(token) if token.channel != self.channel && token.token_type != EOF => i += 1,
                Some(_) => return i,
                None => return self.tokens.len().saturating_sub(1),
            }
        }
    }

    fn start(&mut self) {
        if !self.started {
            self.started = true;
            self.p = self.skip_off_channel(0);
        }
    }

    // =========================================================================
    // Token lookahead
    // =========================================================================

    /// Token `k` on-channel positions from the cursor (`lt(1)` is current,
    /// `lt(-1)` the previous on-channel token). `lt(0)` is `None`.
    pub fn lt(&mut self, k: isize) -> Option<&Token> {
        self.start();
        if k == 0 {
            return None;
        }
        if k < 0 {
            return self.lb(k.unsigned_abs());
        }
        let mut i = self.p;
        for _ in 1..k {
            if self.tokens.get(i).is_some_and(Token::is_eof) {
                break;
            }
            i = self.skip_off_channel(i + 1);
        }
        self.tokens.get(i)
    }

    /// Look back `k` on-channel tokens.
    pub fn lb(&mut self, k: usize) -> Option<&Token> {
        self.start();
        let mut i = self.p;
        let mut seen = 0;
        while seen < k && i > 0 {
            i -= 1;
            if self.tokens[i].channel == self.channel {
                seen += 1;
            }
        }
        if seen < k {
            return None;
        }
        self.tokens.get(i)
    }

    /// Original text of tokens `start..=stop`, every channel included and
    /// `EOF` excluded.
    pub fn text(&mut self, start: usize, stop: usize) -> String {
        self.sync(stop);
        self.tokens
            .iter()
            .skip(start)
            .take((stop + 1).saturating_sub(start))
            .filter(|t| !t.is_eof())
            .map(|t| t.text.as_str())
            .collect()
    }

    /// Text of the whole input.
    pub fn full_text(&mut self) -> String {
        self.fill();
        let stop = self.tokens.len().saturating_sub(1);
        self.text(0, stop)
    }
}

impl<T: TokenSource> IntStream for BufferedTokenStream<T> {
    fn la(&mut self, i: isize) -> TokenType {
        self.lt(i).map_or(INVALID_TOKEN_TYPE, |t| t.token_type)
    }

    fn consume(&mut self) {
        self.start();
        if self.tokens.get(self.p).is_some_and(|t| !t.is_eof()) {
            self.p = self.skip_off_channel(self.p + 1);
        }
    }

    fn index(&self) -> usize {
        self.p
    }

    fn seek(&mut self, index: usize) {
        self.started = true;
        self.p = self.skip_off_channel(index);
    }

    fn mark(&mut self) -> Mark {
        self.start();
        self.marks.push(self.p)
    }

    fn rewind(&mut self, mark: Mark) -> RecognitionResult<()> {
        let index = self.marks.rewind(mark)?;
        self.seek(index);
        Ok(())
    }

    fn release(&mut self, mark: Mark) -> RecognitionResult<()> {
        self.marks.release(mark)
    }

    fn mark_depth(&self) -> usize {
        self.marks.depth()
    }

    fn source_name(&self) -> &str {
        self.source.source_name()
    }

    fn current_symbol(&mut self) -> Token {
        match self.lt(1) {
            Some(token) => token.clone(),
            None => self.closing_eof(),
        }
    }
}
