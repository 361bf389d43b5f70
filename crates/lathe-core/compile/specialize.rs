//! Solves the cases of one grammar state into a specialized decision tree.
//!
//! The tree factors common leading bytes out of literal cases, keeps class
//! cases as interval discriminators, and rejects any pair of cases that could
//! accept the same input. Shape selection (char vs range vs bitmap vs dense
//! switch) happens later, in the translator, once continuations have been
//! compiled and grouped.

use crate::{proxy::*, types::*};
use itertools::Itertools;
use std::collections::hash_map::Entry as MapEntry;
use tracing::trace;

/// A normalized case: classes carry their interval, literals their subject.
/// Single byte literals are folded into classes up front, so every literal
/// entry has at least two bytes.
enum Entry {
  Class { chars: Interval, step: Step },
  Literal { subject: Array<u8>, step: Step },
}

/// Resolves one state's case list into a [Tree].
pub fn solve_state(state: &State) -> LatheResult<Tree> {
  trace!(state = %state.name, cases = state.cases.len(), "solving state");

  let (entries, default) = normalize(state)?;
  check_disjoint(state, &entries)?;
  Ok(build_tree(entries, default.unwrap_or(Tree::Fail)))
}

fn normalize(state: &State) -> LatheResult<(Array<Entry>, Option<Tree>)> {
  let mut entries = Array::new();
  let mut default = None;

  for (pattern, action) in &state.cases {
    match pattern {
      Pattern::Byte(byte) => {
        entries.push(Entry::Class { chars: Interval::single(*byte), step: lower_step(state, action, Some(*byte))? })
      }
      Pattern::Range(lo, hi) => {
        let data = (lo == hi).then_some(*lo);
        entries.push(Entry::Class { chars: Interval::range(*lo, *hi), step: lower_step(state, action, data)? })
      }
      Pattern::Set(bytes) => {
        let chars = Interval::from_bytes(bytes).ok_or_else(|| LatheError::EmptyPattern(state.name.clone()))?;
        let data = chars.as_byte();
        entries.push(Entry::Class { chars, step: lower_step(state, action, data)? })
      }
      Pattern::Literal(subject) if subject.is_empty() => {
        return Err(LatheError::EmptyPattern(state.name.clone()));
      }
      Pattern::Literal(subject) if subject.len() == 1 => {
        entries.push(Entry::Class {
          chars: Interval::single(subject[0]),
          step:  lower_step(state, action, Some(subject[0]))?,
        })
      }
      Pattern::Literal(subject) => {
        entries.push(Entry::Literal { subject: subject.clone(), step: lower_step(state, action, None)? })
      }
      Pattern::Consume(prop) => {
        set_default(state, &mut default, Tree::Consume(*prop, lower_step(state, action, None)?))?
      }
      Pattern::Otherwise => set_default(state, &mut default, Tree::Done(lower_step(state, action, None)?))?,
    }
  }

  Ok((entries, default))
}

fn set_default(state: &State, slot: &mut Option<Tree>, tree: Tree) -> LatheResult<()> {
  match slot {
    Some(..) => Err(LatheError::GrammarConflict {
      state:   state.name.clone(),
      details: "more than one default position case".to_string(),
    }),
    None => {
      *slot = Some(tree);
      Ok(())
    }
  }
}

// ----------------------------------------------------------------------------
// Action lowering

fn lower_step(state: &State, action: &Action, data: Option<u8>) -> LatheResult<Step> {
  let next = lower_next(state, action)?;
  let capture = opens_span(&next);
  Ok(Step { capture, data, next })
}

fn lower_next(state: &State, action: &Action) -> LatheResult<Next> {
  match action {
    Action::Select(selector, arms, otherwise) => {
      let arms = arms
        .iter()
        .map(|(value, action)| Ok((*value, lower_chain(state, action)?)))
        .collect::<LatheResult<Array<_>>>()?;
      let otherwise = lower_chain(state, otherwise)?;
      Ok(Next::Select(selector.clone(), arms, Box::new(otherwise)))
    }
    action => Ok(Next::Single(lower_chain(state, action)?)),
  }
}

fn lower_chain(state: &State, action: &Action) -> LatheResult<SpecAction> {
  match action {
    Action::Store(capture, prop, next) => Ok(SpecAction::Store(*capture, *prop, Box::new(lower_chain(state, next)?))),
    Action::Call(call, next) => Ok(SpecAction::Call(call.clone(), Box::new(lower_chain(state, next)?))),
    Action::Goto(name) => Ok(SpecAction::Goto(name.clone())),
    Action::Error(code) => Ok(SpecAction::Error(*code)),
    Action::Select(..) => Err(LatheError::GrammarConflict {
      state:   state.name.clone(),
      details: "select may only appear as the whole action of a case".to_string(),
    }),
  }
}

fn opens_span(next: &Next) -> bool {
  fn chain_opens(action: &SpecAction) -> bool {
    match action {
      SpecAction::Store(Capture::Begin, ..) => true,
      SpecAction::Store(_, _, next) | SpecAction::Call(_, next) => chain_opens(next),
      SpecAction::Goto(..) | SpecAction::Error(..) => false,
    }
  }

  match next {
    Next::Single(action) => chain_opens(action),
    Next::Select(_, arms, otherwise) => arms.iter().any(|(_, a)| chain_opens(a)) || chain_opens(otherwise),
  }
}

// ----------------------------------------------------------------------------
// Disjointness

fn check_disjoint(state: &State, entries: &[Entry]) -> LatheResult<()> {
  let conflict = |details: String| LatheError::GrammarConflict { state: state.name.clone(), details };

  let classes: Array<&Interval> = entries
    .iter()
    .filter_map(|e| match e {
      Entry::Class { chars, .. } => Some(chars),
      _ => None,
    })
    .collect();

  let literals: Array<&Array<u8>> = entries
    .iter()
    .filter_map(|e| match e {
      Entry::Literal { subject, .. } => Some(subject),
      _ => None,
    })
    .collect();

  for (a, b) in classes.iter().tuple_combinations() {
    if let Some(byte) = a.overlap(b) {
      return Err(conflict(format!("overlapping at 0x{byte:02X}")));
    }
  }

  for (&a, &b) in literals.iter().tuple_combinations() {
    if a == b {
      return Err(conflict(format!("duplicate literal \"{}\"", a.escape_ascii())));
    }
    if a.starts_with(b) || b.starts_with(a) {
      let (short, long) = if a.len() < b.len() { (a, b) } else { (b, a) };
      return Err(conflict(format!(
        "literal \"{}\" is a prefix of literal \"{}\"",
        short.escape_ascii(),
        long.escape_ascii()
      )));
    }
  }

  for chars in &classes {
    for subject in &literals {
      if chars.contains(subject[0]) {
        return Err(conflict(format!("overlapping at 0x{:02X}", subject[0])));
      }
    }
  }

  Ok(())
}

// ----------------------------------------------------------------------------
// Tree construction

fn build_tree(mut entries: Array<Entry>, default: Tree) -> Tree {
  if entries.is_empty() {
    return default;
  }

  // A lone literal keeps its whole-prefix specialization.
  if entries.len() == 1 && matches!(entries[0], Entry::Literal { .. }) {
    let Some(Entry::Literal { subject, step }) = entries.pop() else { unreachable!() };
    return Tree::Branch {
      branches: Branches::Literal(LiteralBranch { subject, next: step }),
      default:  Box::new(default),
    };
  }

  // Literals sharing a leading byte collapse into one chars arm holding
  // their residuals. Group membership ignores source position; arm order is
  // the first occurrence of each discriminator.
  let mut group_ix: Map<u8, usize> = Map::new();
  let mut groups: Array<Array<(Array<u8>, Step)>> = Array::new();

  for entry in &entries {
    if let Entry::Literal { subject, step } = entry {
      match group_ix.entry(subject[0]) {
        MapEntry::Occupied(e) => groups[*e.get()].push((subject.clone(), step.clone())),
        MapEntry::Vacant(e) => {
          e.insert(groups.len());
          groups.push(vec![(subject.clone(), step.clone())]);
        }
      }
    }
  }

  let mut arms: Array<CharBranch> = Array::new();
  let mut emitted = vec![false; groups.len()];

  for entry in entries {
    match entry {
      Entry::Class { chars, step } => arms.push(CharBranch { chars, next: Tree::Done(step) }),
      Entry::Literal { subject, .. } => {
        let ix = group_ix[&subject[0]];
        if !emitted[ix] {
          emitted[ix] = true;
          arms.push(literal_arm(std::mem::take(&mut groups[ix])));
        }
      }
    }
  }

  Tree::Branch { branches: Branches::Chars(arms), default: Box::new(default) }
}

fn literal_arm(group: Array<(Array<u8>, Step)>) -> CharBranch {
  let byte = group[0].0[0];
  let residuals = group.into_iter().map(|(subject, step)| (subject[1..].to_vec(), step)).collect();
  CharBranch { chars: Interval::single(byte), next: residual_tree(residuals) }
}

/// Builds the subtree matching literal residuals that share an already
/// factored prefix. Residuals here are never empty while siblings remain;
/// the prefix conflict check rejected that shape before factoring began.
fn residual_tree(mut residuals: Array<(Array<u8>, Step)>) -> Tree {
  if residuals.len() == 1 {
    let (rest, step) = residuals.pop().unwrap();

    return match rest.len() {
      0 => Tree::Done(step),
      1 => Tree::Branch {
        branches: Branches::Chars(vec![CharBranch { chars: Interval::single(rest[0]), next: Tree::Done(step) }]),
        default:  Box::new(Tree::Fail),
      },
      _ => Tree::Branch {
        branches: Branches::Literal(LiteralBranch { subject: rest, next: step }),
        default:  Box::new(Tree::Fail),
      },
    };
  }

  let mut group_ix: Map<u8, usize> = Map::new();
  let mut groups: Array<Array<(Array<u8>, Step)>> = Array::new();

  for (subject, step) in residuals {
    debug_assert!(!subject.is_empty());
    match group_ix.entry(subject[0]) {
      MapEntry::Occupied(e) => groups[*e.get()].push((subject, step)),
      MapEntry::Vacant(e) => {
        e.insert(groups.len());
        groups.push(vec![(subject, step)]);
      }
    }
  }

  let arms = groups.into_iter().map(literal_arm).collect();

  Tree::Branch { branches: Branches::Chars(arms), default: Box::new(Tree::Fail) }
}
