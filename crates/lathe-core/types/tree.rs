use super::{Call, Capture, Interval, PropId, Selector};
use crate::proxy::Array;

/// The specializer's output for one grammar state: a decision tree resolving
/// an input prefix to exactly one action.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Tree {
  /// Unconditional match failure.
  Fail,
  /// Terminal: perform the step and leave the node.
  Done(Step),
  /// Consume `data[prop]` bytes, then perform the step.
  Consume(PropId, Step),
  /// Pick a continuation by leading byte or literal prefix; `default` is the
  /// fallthrough subtree.
  Branch { branches: Branches, default: Box<Tree> },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Branches {
  /// A literal prefix specialization.
  Literal(LiteralBranch),
  /// Single byte discriminators.
  Chars(Array<CharBranch>),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LiteralBranch {
  pub subject: Array<u8>,
  pub next:    Step,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CharBranch {
  pub chars: Interval,
  pub next:  Tree,
}

/// The lowered continuation of a matched case.
///
/// `capture` is true when the action chain opens a span, which forces the
/// translator to keep the pre-advance position observable. `data` carries the
/// matched byte when the pattern pinned it statically, letting data stores
/// use an immediate instead of re-reading the cursor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Step {
  pub capture: bool,
  pub data:    Option<u8>,
  pub next:    Next,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Next {
  Single(SpecAction),
  Select(Selector, Array<(u64, SpecAction)>, Box<SpecAction>),
}

/// Action chains after lowering: `select` has been pulled up into
/// [Next::Select], everything else survives structurally.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SpecAction {
  Store(Capture, PropId, Box<SpecAction>),
  Call(Call, Box<SpecAction>),
  Goto(String),
  Error(u64),
}
