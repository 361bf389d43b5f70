use super::{Call, Interval, PropId, Range, Selector};
use crate::proxy::Array;

/// One instruction of the flat machine.
///
/// A node's entry is a [Instruction::Consumer]; every other variant is a tail
/// instruction that flows into its continuation or jumps across nodes by
/// index. All variants are structural: equality and hashing drive both
/// continuation grouping in the translator and determinism checks in tests.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Instruction {
  /// Inspect input. Only valid as a node entry.
  Consumer(Consumer),
  /// Dispatch on a host provided value.
  Select(Selector, Array<(u64, Instruction)>, Box<Instruction>),
  /// Advance the cursor by `n` bytes. `n` is never zero.
  Next(u32, Box<Instruction>),
  /// Write the immediate (or the byte under the cursor when absent) into a
  /// numeric slot.
  Store(PropId, Option<u8>, Box<Instruction>),
  /// Record the current position as the start of span `prop`.
  Capture(PropId, Box<Instruction>),
  /// Invoke span `prop`'s callback with `(start, current, buffer,
  /// user_state)` and clear the recorded start.
  Close(PropId, Box<Instruction>),
  /// Invoke a host computation.
  Call(Call, Box<Instruction>),
  /// Jump to a node by index.
  Goto(usize),
  /// Terminate with an error code. Code 0 is the generic failure produced by
  /// unmatched input.
  Error(u64),
}

impl Instruction {
  pub fn is_consumer(&self) -> bool {
    matches!(self, Instruction::Consumer(..))
  }

  /// Visits every `goto` target reachable inside this instruction.
  pub fn visit_gotos(&self, visit: &mut impl FnMut(usize)) {
    use Instruction::*;
    match self {
      Consumer(consumer) => consumer.visit_gotos(visit),
      Select(_, arms, otherwise) => {
        for (_, inst) in arms {
          inst.visit_gotos(&mut *visit);
        }
        otherwise.visit_gotos(visit);
      }
      Next(_, inst) | Store(_, _, inst) | Capture(_, inst) | Close(_, inst) | Call(_, inst) => {
        inst.visit_gotos(visit)
      }
      Goto(target) => visit(*target),
      Error(_) => {}
    }
  }

  /// Visits every instruction in this sub graph, including `self`.
  pub fn visit(&self, visit: &mut impl FnMut(&Instruction)) {
    use Instruction::*;
    visit(self);
    match self {
      Consumer(consumer) => consumer.visit(visit),
      Select(_, arms, otherwise) => {
        for (_, inst) in arms {
          inst.visit(&mut *visit);
        }
        otherwise.visit(visit);
      }
      Next(_, inst) | Store(_, _, inst) | Capture(_, inst) | Close(_, inst) | Call(_, inst) => inst.visit(visit),
      Goto(..) | Error(..) => {}
    }
  }
}

/// Instructions that read the current byte. The only instructions permitted
/// as node entries, since entries gate on input availability.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Consumer {
  /// Match a literal prefix, committed; may pause across buffer boundaries.
  /// The subject is never empty. On success the cursor sits past the
  /// literal.
  Is {
    subject: Array<u8>,
    ok:      Box<Instruction>,
    err:     Box<Instruction>,
  },
  /// Single byte equality. Tests without advancing.
  Char {
    byte: u8,
    ok:   Box<Instruction>,
    err:  Box<Instruction>,
  },
  /// Closed range test. Tests without advancing.
  Range {
    range: Range,
    ok:    Box<Instruction>,
    err:   Box<Instruction>,
  },
  /// Membership in an interned bitmap. Tests without advancing.
  Map {
    chars: Interval,
    ok:    Box<Instruction>,
    err:   Box<Instruction>,
  },
  /// Dense switch; every arm tests exactly one byte.
  Chars {
    arms:      Array<(u8, Instruction)>,
    otherwise: Box<Instruction>,
  },
  /// Chained if-else over heterogeneous checks.
  Mixed {
    arms:      Array<(Check, Instruction)>,
    otherwise: Box<Instruction>,
  },
  /// Advance `data[prop]` bytes; may span buffer chunks.
  Consume { prop: PropId, ok: Box<Instruction> },
}

impl Consumer {
  fn visit_gotos(&self, visit: &mut impl FnMut(usize)) {
    self.visit_children(&mut |inst| inst.visit_gotos(&mut *visit));
  }

  fn visit(&self, visit: &mut impl FnMut(&Instruction)) {
    self.visit_children(&mut |inst| inst.visit(&mut *visit));
  }

  fn visit_children(&self, each: &mut impl FnMut(&Instruction)) {
    use Consumer::*;
    match self {
      Is { ok, err, .. } | Char { ok, err, .. } | Range { ok, err, .. } | Map { ok, err, .. } => {
        each(ok);
        each(err);
      }
      Chars { arms, otherwise } => {
        for (_, inst) in arms {
          each(inst);
        }
        each(otherwise);
      }
      Mixed { arms, otherwise } => {
        for (_, inst) in arms {
          each(inst);
        }
        each(otherwise);
      }
      Consume { ok, .. } => each(ok),
    }
  }
}

/// One test of a [Consumer::Mixed] chain.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Check {
  Byte(u8),
  Range(Range),
  Map(Interval),
}
