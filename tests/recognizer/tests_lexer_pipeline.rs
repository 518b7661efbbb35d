//! A hand-written lexer feeding the calculator parser.

use llstar::base::{Bitset, EOF, HIDDEN_CHANNEL, TokenType};
use llstar::errors::{ErrorCode, RecognitionResult};
use llstar::recognizer::{Lexer, LexerSource, Recognize, RecognizerOptions, TokenRules};
use llstar::stream::{IntStream, StringStream, TokenSource};

use crate::helpers::calc::Calc;
use crate::helpers::fixtures::{EQ, ID, INT, LPAREN, PLUS, RPAREN, SEMI, WS};

/// The calculator's tokens as character-level rules.
struct CalcLexer {
    lexer: Lexer<StringStream>,
}

impl CalcLexer {
    fn source(text: &str) -> LexerSource<CalcLexer> {
        Self::source_with(text, RecognizerOptions::default())
    }

    fn source_with(text: &str, options: RecognizerOptions) -> LexerSource<CalcLexer> {
        LexerSource::new(CalcLexer {
            lexer: Lexer::with_options(StringStream::new(text).with_name("calc.txt"), options),
        })
    }

    fn one_or_more(&mut self, low: char, high: char) -> RecognitionResult<()> {
        self.lexer.match_range(low, high)?;
        while (low as TokenType..=high as TokenType).contains(&self.lexer.input().la(1)) {
            self.lexer.match_range(low, high)?;
        }
        Ok(())
    }

    fn single(&mut self, c: char, ttype: TokenType) -> RecognitionResult<()> {
        self.lexer.match_char(c)?;
        self.lexer.set_type(ttype);
        Ok(())
    }
}

impl TokenRules for CalcLexer {
    type Chars = StringStream;

    fn lexer(&mut self) -> &mut Lexer<StringStream> {
        &mut self.lexer
    }

    fn lexer_ref(&self) -> &Lexer<StringStream> {
        &self.lexer
    }

    fn next_rule(&mut self) -> RecognitionResult<()> {
        match char::from_u32(self.lexer.input().la(1) as u32) {
            Some('a'..='z') => {
                self.one_or_more('a', 'z')?;
                self.lexer.set_type(ID);
            }
            Some('0'..='9') => {
                self.one_or_more('0', '9')?;
                self.lexer.set_type(INT);
            }
            Some('=') => self.single('=', EQ)?,
            Some(';') => self.single(';', SEMI)?,
            Some('(') => self.single('(', LPAREN)?,
            Some(')') => self.single(')', RPAREN)?,
            Some('+') => self.single('+', PLUS)?,
            Some(' ' | '\t' | '\n') => {
                let ws = Bitset::of(&[' ' as TokenType, '\t' as TokenType, '\n' as TokenType]);
                self.lexer.match_set(&ws)?;
                while ws.member(self.lexer.input().la(1)) {
                    self.lexer.match_set(&ws)?;
                }
                self.lexer.set_type(WS);
                self.lexer.set_channel(HIDDEN_CHANNEL);
            }
            Some('/') if self.lexer.input().la(2) == '/' as TokenType => {
                while ![EOF, '\n' as TokenType].contains(&self.lexer.input().la(1)) {
                    self.lexer.match_any()?;
                }
                self.lexer.skip();
            }
            _ => return Err(self.lexer.no_viable_char("calculator tokens")),
        }
        Ok(())
    }
}

#[test]
fn test_lexer_feeds_parser() {
    let mut calc = Calc::new(CalcLexer::source("x = (a) b;\n// total\ny = x + 1;"));
    let root = calc.prog().expect("parses");
    assert_eq!(calc.tree_string(root), "(= x (( a b)) (= y (+ x 1))");
    assert!(calc.parser.diagnostics().is_empty());
    assert_eq!(calc.input().source_name(), "calc.txt");

    let tokens = calc.parser.tokens();
    let y = tokens
        .tokens()
        .iter()
        .find(|t| t.text == "y")
        .expect("y was buffered");
    assert_eq!((y.line, y.column), (3, 0));
}

#[test]
fn test_lexical_errors_stay_with_the_lexer() {
    let mut calc = Calc::new(CalcLexer::source("x = 1 ? ;"));
    let root = calc.prog().expect("parses");
    assert_eq!(calc.tree_string(root), "(= x 1)");
    assert!(calc.parser.diagnostics().is_empty());

    let lexical = calc.parser.tokens().token_source().diagnostics();
    assert_eq!(lexical.len(), 1);
    assert_eq!(lexical[0].code, ErrorCode::E0101);
    assert_eq!((lexical[0].line, lexical[0].column), (1, 6));
}

#[test]
fn test_lexer_error_budget_ends_token_stream() {
    let options = RecognizerOptions::default().with_max_errors(1);
    let mut source = CalcLexer::source_with("x ? ? y", options);
    let types: Vec<_> = std::iter::from_fn(|| source.next_token())
        .map(|t| t.token_type)
        .collect();
    assert_eq!(types, vec![ID, WS, WS]);
    assert!(source.take_fatal().is_some_and(|e| e.failure().is_some()));
    let codes: Vec<_> = source.diagnostics().iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::E0101, ErrorCode::E0101, ErrorCode::E0902]);
}
