//! Table-driven decision automata.
//!
//! Each adaptive decision of a grammar owns one immutable [`Dfa`]:
//! - a transition table keyed by `(state, token type)`
//! - an accept table mapping terminal states to alternative numbers
//! - special states that need predicates or full simulation to resolve
//!
//! Automata are built once (from packed tables or with [`DfaBuilder`]) and
//! shared read-only, typically from a `static` behind a lazy initializer.
//! [`predict`] runs one against a recognizer's input.

mod packed;
mod predict;

use std::collections::BTreeMap;

pub use packed::{PACKED_FORMAT_VERSION, PackedDfa};
pub use predict::predict;

use crate::base::{Bitset, EOF, TokenType};
use crate::errors::{RecognitionError, RecognitionResult};

/// Alternative number, 1-based in declaration order.
pub type Alt = u32;
/// Decision number within a grammar.
pub type DecisionId = u32;
/// State number within one automaton; state 0 is the start state.
pub type StateId = u32;
/// Semantic predicate number, resolved by the recognizer.
pub type PredicateId = u32;

/// One automaton state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DfaState {
    /// Alternative predicted when this state is reached
    pub accept: Option<Alt>,
    /// Index into the automaton's special states
    pub special: Option<usize>,
    /// Taken when no table edge matches (end-of-token in lexer decisions)
    pub eot: Option<StateId>,
    /// Taken on `EOF`
    pub eof: Option<StateId>,
    /// Token type of `edges[0]`
    pub min: TokenType,
    pub edges: Vec<Option<StateId>>,
}

impl DfaState {
    pub fn edge(&self, ttype: TokenType) -> Option<StateId> {
        let offset = usize::try_from(ttype.checked_sub(self.min)?).ok()?;
        self.edges.get(offset).copied().flatten()
    }

    /// Token types with an outgoing edge, `EOF` included.
    pub fn viable_types(&self) -> Bitset {
        let mut set = Bitset::new(0);
        for (offset, edge) in self.edges.iter().enumerate() {
            if edge.is_some() {
                set.add_type(self.min + offset as TokenType);
            }
        }
        if self.eof.is_some() {
            set.add_type(EOF);
        }
        set
    }
}

/// A predicate-gated edge of a special state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicatedEdge {
    /// Lookahead the edge applies to, `None` for any
    pub class: Option<TokenType>,
    /// Evaluated at the decision start; `None` always passes
    pub predicate: Option<PredicateId>,
    pub target: StateId,
}

/// Resolution recipe for a state the table alone cannot decide.
///
/// Resolution order: predicated edges in declaration order, then full
/// simulation of `simulate` (lowest viable alternative wins), then
/// `fallback`. Special states never consume input; the chosen target state
/// reads the same lookahead again.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecialState {
    pub predicated: Vec<PredicatedEdge>,
    pub simulate: Vec<Alt>,
    pub fallback: Option<StateId>,
}

impl SpecialState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated(mut self, class: Option<TokenType>, predicate: PredicateId, target: StateId) -> Self {
        self.predicated.push(PredicatedEdge {
            class,
            predicate: Some(predicate),
            target,
        });
        self
    }

    /// An ungated edge, taken when `class` (or anything) is the lookahead.
    pub fn on(mut self, class: Option<TokenType>, target: StateId) -> Self {
        self.predicated.push(PredicatedEdge {
            class,
            predicate: None,
            target,
        });
        self
    }

    pub fn simulate(mut self, alts: &[Alt]) -> Self {
        self.simulate.extend_from_slice(alts);
        self
    }

    pub fn fallback(mut self, target: StateId) -> Self {
        self.fallback = Some(target);
        self
    }
}

/// Outcome of one table lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Consume and continue from the state
    Next(StateId),
    /// The target state predicts the alternative
    Accept(Alt),
    /// Consume and resolve the special target state
    Special(StateId),
    /// No viable alternative
    None,
}

/// An immutable decision automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dfa {
    decision: DecisionId,
    description: &'static str,
    states: Vec<DfaState>,
    specials: Vec<SpecialState>,
    alternatives: Vec<Alt>,
}

impl Dfa {
    fn new(
        decision: DecisionId,
        description: &'static str,
        states: Vec<DfaState>,
        specials: Vec<SpecialState>,
    ) -> RecognitionResult<Self> {
        if states.is_empty() {
            return Err(RecognitionError::invalid_argument(format!(
                "decision {decision} has no states"
            )));
        }
        let count = states.len() as u64;
        let check = |target: StateId, what: &str| {
            if u64::from(target) < count {
                Ok(())
            } else {
                Err(RecognitionError::invalid_argument(format!(
                    "decision {decision}: {what} targets missing state {target}"
                )))
            }
        };
        for state in &states {
            for target in state.edges.iter().flatten() {
                check(*target, "edge")?;
            }
            if let Some(target) = state.eot {
                check(target, "eot edge")?;
            }
            if let Some(target) = state.eof {
                check(target, "eof edge")?;
            }
            if state.special.is_some_and(|s| s >= specials.len()) {
                return Err(RecognitionError::invalid_argument(format!(
                    "decision {decision}: unknown special state"
                )));
            }
        }
        for special in &specials {
            for edge in &special.predicated {
                check(edge.target, "predicated edge")?;
            }
            if let Some(target) = special.fallback {
                check(target, "fallback")?;
            }
        }

        let mut alternatives: Vec<Alt> = states
            .iter()
            .filter_map(|s| s.accept)
            .chain(specials.iter().flat_map(|s| s.simulate.iter().copied()))
            .collect();
        alternatives.sort_unstable();
        alternatives.dedup();

        Ok(Self {
            decision,
            description,
            states,
            specials,
            alternatives,
        })
    }

    pub fn decision(&self) -> DecisionId {
        self.decision
    }

    /// Grammar text of the decision, for diagnostics.
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Every alternative the automaton can predict, ascending.
    pub fn alternatives(&self) -> &[Alt] {
        &self.alternatives
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn state(&self, id: StateId) -> RecognitionResult<&DfaState> {
        self.states.get(id as usize).ok_or_else(|| {
            RecognitionError::invalid_argument(format!(
                "decision {}: no state {id}",
                self.decision
            ))
        })
    }

    pub fn special(&self, index: usize) -> Option<&SpecialState> {
        self.specials.get(index)
    }

    /// Alternative predicted by `state`, if it is an accept state.
    pub fn accept_alt(&self, state: StateId) -> Option<Alt> {
        self.states.get(state as usize).and_then(|s| s.accept)
    }

    /// Look up the transition out of `state` on `ttype`.
    ///
    /// Table edges win over the end-of-token edge, which wins over the
    /// `EOF` edge.
    pub fn step(&self, state: StateId, ttype: TokenType) -> Step {
        let Some(from) = self.states.get(state as usize) else {
            return Step::None;
        };
        let target = from
            .edge(ttype)
            .or(from.eot)
            .or(if ttype == EOF { from.eof } else { None });
        match target {
            Some(target) => self.classify(target),
            None => Step::None,
        }
    }

    fn classify(&self, target: StateId) -> Step {
        match self.states.get(target as usize) {
            Some(s) if s.special.is_some() => Step::Special(target),
            Some(DfaState {
                accept: Some(alt), ..
            }) => Step::Accept(*alt),
            Some(_) => Step::Next(target),
            None => Step::None,
        }
    }
}

// ============================================================================
// Builder
// ============================================================================

#[derive(Debug, Clone, Default)]
struct StateDraft {
    accept: Option<Alt>,
    special: Option<usize>,
    eot: Option<StateId>,
    eof: Option<StateId>,
    edges: BTreeMap<TokenType, StateId>,
}

/// Builds an automaton state by state.
///
/// ```
/// use llstar::dfa::DfaBuilder;
///
/// // r : 'x' | 'y' ;
/// let dfa = DfaBuilder::new(0, "r : X | Y ;")
///     .edge(0, 4, 1)
///     .edge(0, 5, 2)
///     .accept(1, 1)
///     .accept(2, 2)
///     .build()
///     .unwrap();
/// assert_eq!(dfa.alternatives(), &[1, 2]);
/// ```
#[derive(Debug, Clone)]
pub struct DfaBuilder {
    decision: DecisionId,
    description: &'static str,
    states: Vec<StateDraft>,
    specials: Vec<SpecialState>,
}

impl DfaBuilder {
    pub fn new(decision: DecisionId, description: &'static str) -> Self {
        Self {
            decision,
            description,
            states: vec![StateDraft::default()],
            specials: Vec::new(),
        }
    }

    fn draft(&mut self, state: StateId) -> &mut StateDraft {
        let index = state as usize;
        if self.states.len() <= index {
            self.states.resize_with(index + 1, StateDraft::default);
        }
        &mut self.states[index]
    }

    fn touch(&mut self, state: StateId) {
        self.draft(state);
    }

    /// Edge on a single token type. `EOF` becomes the state's EOF edge.
    pub fn edge(mut self, from: StateId, ttype: TokenType, to: StateId) -> Self {
        self.touch(to);
        if ttype == EOF {
            self.draft(from).eof = Some(to);
        } else {
            self.draft(from).edges.insert(ttype, to);
        }
        self
    }

    /// Edges on every type in `low..=high`.
    pub fn range(mut self, from: StateId, low: TokenType, high: TokenType, to: StateId) -> Self {
        for ttype in low..=high {
            self = self.edge(from, ttype, to);
        }
        self
    }

    /// Edges on every member of `set`.
    pub fn set(mut self, from: StateId, set: &Bitset, to: StateId) -> Self {
        for ttype in set.types() {
            self = self.edge(from, ttype, to);
        }
        self
    }

    pub fn eot(mut self, from: StateId, to: StateId) -> Self {
        self.touch(to);
        self.draft(from).eot = Some(to);
        self
    }

    pub fn accept(mut self, state: StateId, alt: Alt) -> Self {
        self.draft(state).accept = Some(alt);
        self
    }

    pub fn special(mut self, state: StateId, special: SpecialState) -> Self {
        for edge in &special.predicated {
            self.touch(edge.target);
        }
        if let Some(target) = special.fallback {
            self.touch(target);
        }
        let index = self.specials.len();
        self.specials.push(special);
        self.draft(state).special = Some(index);
        self
    }

    pub fn build(self) -> RecognitionResult<Dfa> {
        let states = self
            .states
            .into_iter()
            .map(|draft| {
                let (min, edges) = match (
                    draft.edges.first_key_value(),
                    draft.edges.last_key_value(),
                ) {
                    (Some((&min, _)), Some((&max, _))) => {
                        let mut edges = vec![None; (max - min) as usize + 1];
                        for (&ttype, &to) in &draft.edges {
                            edges[(ttype - min) as usize] = Some(to);
                        }
                        (min, edges)
                    }
                    _ => (0, Vec::new()),
                };
                DfaState {
                    accept: draft.accept,
                    special: draft.special,
                    eot: draft.eot,
                    eof: draft.eof,
                    min,
                    edges,
                }
            })
            .collect();
        Dfa::new(self.decision, self.description, states, self.specials)
    }
}
