//! Running a decision automaton against live input.

use tracing::{trace, warn};

use super::{Alt, Dfa, SpecialState, StateId, Step};
use crate::errors::{FailureKind, RecognitionResult};
use crate::recognizer::{Recognize, Speculation, synpred};
use crate::stream::IntStream;

/// Where a special state sends the walk.
enum Resolution {
    State(StateId),
    Alt(Alt),
    Stuck,
}

/// Predict which alternative of `dfa`'s decision the input starts.
///
/// The input is marked on entry and rewound on every exit path, so the
/// cursor is where it was before the call. Lookahead walks the table;
/// special states resolve through predicates, then full simulation, then
/// their fallback edge. Full simulation parses each candidate alternative
/// speculatively from the decision start and picks the lowest that
/// succeeds.
///
/// A walk that finds no edge fails with `NoViableAlt`, whose expected set
/// holds the token types the failing state had edges for. While
/// backtracking the failure carries no record.
pub fn predict<R: Recognize + ?Sized>(recognizer: &mut R, dfa: &Dfa) -> RecognitionResult<Alt> {
    let mut guard = Speculation::begin(recognizer);
    let outcome = walk(&mut *guard, dfa);
    guard.finish()?;
    outcome
}

fn walk<R: Recognize + ?Sized>(recognizer: &mut R, dfa: &Dfa) -> RecognitionResult<Alt> {
    let start = recognizer.input().index();
    let max_lookahead = recognizer.state().options().max_lookahead;
    let mut s: StateId = 0;
    let mut depth = 0usize;
    // Special states do not consume; bound the hops between consumptions.
    let mut hops = 0usize;

    loop {
        let state = dfa.state(s)?;
        if let Some(index) = state.special {
            hops += 1;
            if hops > dfa.state_count() {
                return Err(no_viable(recognizer, dfa, s));
            }
            let Some(special) = dfa.special(index) else {
                return Err(no_viable(recognizer, dfa, s));
            };
            match resolve_special(recognizer, dfa, start, special)? {
                Resolution::Alt(alt) => {
                    trace!(decision = dfa.decision(), alt, depth, "predicted by simulation");
                    return Ok(alt);
                }
                Resolution::State(next) if next != s => {
                    s = next;
                    continue;
                }
                Resolution::State(_) | Resolution::Stuck => {
                    return Err(no_viable(recognizer, dfa, s));
                }
            }
        }
        if let Some(alt) = state.accept {
            trace!(decision = dfa.decision(), alt, depth, "predicted");
            return Ok(alt);
        }
        if depth >= max_lookahead {
            warn!(
                decision = dfa.decision(),
                max_lookahead, "prediction hit the lookahead bound"
            );
            return Err(no_viable(recognizer, dfa, s));
        }

        let la = recognizer.input().la(1);
        match dfa.step(s, la) {
            Step::Accept(alt) => {
                trace!(decision = dfa.decision(), alt, depth = depth + 1, "predicted");
                return Ok(alt);
            }
            Step::Next(next) | Step::Special(next) => {
                recognizer.input().consume();
                depth += 1;
                hops = 0;
                s = next;
            }
            Step::None => return Err(no_viable(recognizer, dfa, s)),
        }
    }
}

fn resolve_special<R: Recognize + ?Sized>(
    recognizer: &mut R,
    dfa: &Dfa,
    start: usize,
    special: &SpecialState,
) -> RecognitionResult<Resolution> {
    let la = recognizer.input().la(1);
    for edge in &special.predicated {
        if edge.class.is_some_and(|class| class != la) {
            continue;
        }
        let passed = match edge.predicate {
            Some(predicate) => eval_at(recognizer, start, predicate)?,
            None => true,
        };
        if passed {
            trace!(decision = dfa.decision(), predicate = ?edge.predicate, target = edge.target, "predicate edge taken");
            return Ok(Resolution::State(edge.target));
        }
    }
    if !special.simulate.is_empty() {
        if let Some(alt) = simulate(recognizer, dfa, start, &special.simulate)? {
            return Ok(Resolution::Alt(alt));
        }
    }
    Ok(special.fallback.map_or(Resolution::Stuck, Resolution::State))
}

/// Evaluate a predicate as if the decision had not consumed anything.
fn eval_at<R: Recognize + ?Sized>(
    recognizer: &mut R,
    start: usize,
    predicate: super::PredicateId,
) -> RecognitionResult<bool> {
    let here = recognizer.input().index();
    recognizer.input().seek(start);
    let result = recognizer.eval_predicate(predicate);
    recognizer.input().seek(here);
    result
}

/// Speculatively parse each candidate from the decision start, ascending.
fn simulate<R: Recognize + ?Sized>(
    recognizer: &mut R,
    dfa: &Dfa,
    start: usize,
    candidates: &[Alt],
) -> RecognitionResult<Option<Alt>> {
    let options = recognizer.state().options();
    let (max_depth, report_ambiguities) = (options.max_speculation_depth, options.report_ambiguities);
    if recognizer.backtracking() >= max_depth {
        warn!(
            decision = dfa.decision(),
            max_depth, "speculation depth bound reached; skipping full simulation"
        );
        return Ok(None);
    }

    let mut alts = candidates.to_vec();
    alts.sort_unstable();
    alts.dedup();

    let here = recognizer.input().index();
    let decision = dfa.decision();
    let mut viable = Vec::new();
    for alt in alts {
        recognizer.input().seek(start);
        let matched = synpred(recognizer, |r| r.speculate(decision, alt));
        recognizer.input().seek(here);
        if matched? {
            viable.push(alt);
            if !report_ambiguities {
                break;
            }
        }
    }
    if viable.len() > 1 {
        warn!(
            decision,
            description = dfa.description(),
            alternatives = ?viable,
            chosen = viable[0],
            "ambiguous decision resolved by declaration order"
        );
    }
    Ok(viable.first().copied())
}

fn no_viable<R: Recognize + ?Sized>(
    recognizer: &mut R,
    dfa: &Dfa,
    state: StateId,
) -> crate::errors::RecognitionError {
    let expected = dfa.state(state).ok().map(|s| s.viable_types());
    trace!(decision = dfa.decision(), state, "no viable alternative");
    recognizer.fail(
        FailureKind::NoViableAlt {
            decision: dfa.decision(),
            state,
            alternatives: dfa.alternatives().to_vec(),
            description: dfa.description(),
        },
        expected,
    )
}
