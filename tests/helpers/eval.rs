//! A tree grammar over the calculator's output, written the way generated
//! tree walkers drive the runtime.
//!
//! ```text
//! prog : stat+ ;
//! stat : ^('=' ID expr) ;
//! expr : ^('+' expr expr) | ID | INT ;
//! ```

use llstar::base::Vocabulary;
use llstar::dfa::{Dfa, DfaBuilder};
use llstar::errors::RecognitionResult;
use llstar::predict;
use llstar::recognizer::{Recognize, RecognizerState, Rule, TreeParser};
use llstar::stream::IntStream;
use llstar::tree::{NodeId, TreeNodeStream};
use once_cell::sync::Lazy;

use super::fixtures::{EQ, ID, INT, NAMES, PLUS};

pub const PROG: Rule = Rule::new(0, "prog");
pub const STAT: Rule = Rule::new(1, "stat");
pub const EXPR: Rule = Rule::new(2, "expr");

pub static EXPR_DFA: Lazy<Dfa> = Lazy::new(|| {
    DfaBuilder::new(1, "3:1: expr : ( ^('+' expr expr) | ID | INT );")
        .edge(0, PLUS, 1)
        .edge(0, ID, 2)
        .edge(0, INT, 3)
        .accept(1, 1)
        .accept(2, 2)
        .accept(3, 3)
        .build()
        .expect("valid automaton")
});

/// Evaluates assignments, recording each variable in assignment order.
pub struct Eval<'t> {
    pub walker: TreeParser<'t>,
    pub env: Vec<(String, i64)>,
}

impl<'t> Eval<'t> {
    pub fn new(nodes: TreeNodeStream<'t>) -> Self {
        Self {
            walker: TreeParser::new(nodes, Vocabulary::Tokens(NAMES)),
            env: Vec::new(),
        }
    }

    fn text(&self, node: Option<NodeId>) -> String {
        node.map(|n| self.walker.tree().text(n)).unwrap_or_default()
    }

    pub fn prog(&mut self) -> RecognitionResult<()> {
        let Some(start) = self.walker.enter_rule(PROG)? else {
            return Ok(());
        };
        let outcome = (|| -> RecognitionResult<()> {
            loop {
                self.stat()?;
                if self.input().la(1) != EQ {
                    return Ok(());
                }
            }
        })();
        self.walker.exit_rule(start, outcome)
    }

    fn stat(&mut self) -> RecognitionResult<()> {
        let Some(start) = self.walker.enter_rule(STAT)? else {
            return Ok(());
        };
        let outcome = (|| -> RecognitionResult<()> {
            self.walker.match_token(EQ)?;
            self.walker.match_down()?;
            let name = self.walker.match_token(ID)?;
            let value = self.expr()?;
            self.walker.match_up()?;
            let name = self.text(name);
            self.env.push((name, value));
            Ok(())
        })();
        self.walker.exit_rule(start, outcome)
    }

    fn expr(&mut self) -> RecognitionResult<i64> {
        let Some(start) = self.walker.enter_rule(EXPR)? else {
            return Ok(0);
        };
        let outcome = self.expr_body();
        self.walker.exit_rule(start, outcome)
    }

    fn expr_body(&mut self) -> RecognitionResult<i64> {
        match predict(self, &EXPR_DFA)? {
            1 => {
                self.walker.match_token(PLUS)?;
                self.walker.match_down()?;
                let left = self.expr()?;
                let right = self.expr()?;
                self.walker.match_up()?;
                Ok(left + right)
            }
            2 => {
                let name = self.input().current_symbol().text;
                let bound = self
                    .env
                    .iter()
                    .rev()
                    .find(|(n, _)| n.as_str() == name.as_str())
                    .map(|&(_, value)| value);
                let Some(value) = bound else {
                    return Err(self.failed_predicate("expr", "defined"));
                };
                self.walker.match_token(ID)?;
                Ok(value)
            }
            _ => {
                let literal = self.walker.match_token(INT)?;
                Ok(self.text(literal).parse().unwrap_or_default())
            }
        }
    }
}

impl<'t> Recognize for Eval<'t> {
    type Input = TreeNodeStream<'t>;

    fn input(&mut self) -> &mut TreeNodeStream<'t> {
        self.walker.input()
    }

    fn state(&self) -> &RecognizerState {
        self.walker.state()
    }

    fn state_mut(&mut self) -> &mut RecognizerState {
        self.walker.state_mut()
    }
}
