use super::{PropId, Storage};
use crate::proxy::Array;

/// What a case matches against the input.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Pattern {
  /// A single byte value.
  Byte(u8),
  /// A closed byte range `[lo, hi]`.
  Range(u8, u8),
  /// An arbitrary byte set.
  Set(Array<u8>),
  /// A literal byte string, matched as a committed prefix.
  Literal(Array<u8>),
  /// Consume `data[prop]` bytes, then act. Fills the state's default
  /// position, like [Pattern::Otherwise].
  Consume(PropId),
  /// Any remaining input.
  Otherwise,
}

impl Pattern {
  /// Literal pattern from anything byte-like; `Pattern::literal("GET")`.
  pub fn literal(subject: impl Into<Array<u8>>) -> Self {
    Self::Literal(subject.into())
  }
}

/// The three capture kinds a `store` action can perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capture {
  /// Store the byte under the cursor into a numeric slot.
  Data,
  /// Record the current position as the start of a span.
  Begin,
  /// Invoke the span's callback with `(start, current, buffer, user_state)`
  /// and clear the recorded start.
  Close,
}

/// Numeric base of a digit accumulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Base {
  Octal,
  Decimal,
  Hex,
}

/// A host side computation invoked mid parse.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Call {
  /// Invoke the numbered arbitrary callback.
  Arbitrary(u32),
  /// Fold the byte under the cursor into `data[prop]` as a digit of the
  /// given base.
  MulAdd(Base, PropId),
  /// Load the byte under the cursor into `data[prop]` as a digit.
  LoadNum(PropId),
  /// Invoke the numbered callback and store its result into `data[prop]`.
  CallStore(PropId, u32),
  /// Store an immediate value into `data[prop]`.
  Store(PropId, u64),
}

/// What a `select` dispatches on: a call's return value or a property slot.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Selector {
  Call(Call),
  Method(PropId),
}

/// What happens once a case's pattern matches.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Action {
  Store(Capture, PropId, Box<Action>),
  Call(Call, Box<Action>),
  Goto(String),
  Error(u64),
  Select(Selector, Array<(u64, Action)>, Box<Action>),
}

impl Action {
  pub fn store(capture: Capture, prop: PropId, next: Action) -> Self {
    Self::Store(capture, prop, Box::new(next))
  }

  pub fn call(call: Call, next: Action) -> Self {
    Self::Call(call, Box::new(next))
  }

  pub fn goto(name: &str) -> Self {
    Self::Goto(name.to_string())
  }

  pub fn select(selector: Selector, arms: Array<(u64, Action)>, otherwise: Action) -> Self {
    Self::Select(selector, arms, Box::new(otherwise))
  }
}

/// A named grammar state: a labeled point where the next byte is examined,
/// carrying an ordered list of `(pattern, action)` cases.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State {
  pub name:  String,
  pub cases: Array<(Pattern, Action)>,
}

impl State {
  pub fn new(name: &str) -> Self {
    Self { name: name.to_string(), cases: Array::new() }
  }

  pub fn case(mut self, pattern: Pattern, action: Action) -> Self {
    self.cases.push((pattern, action));
    self
  }
}

/// A validated grammar, as delivered by a front end: storage declarations
/// plus an ordered list of named states.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Grammar {
  pub storage: Storage,
  pub states:  Array<State>,
}

impl Grammar {
  pub fn new(storage: Storage) -> Self {
    Self { storage, states: Array::new() }
  }

  pub fn state(mut self, state: State) -> Self {
    self.states.push(state);
    self
  }
}
