//! Walks specialized trees and emits the flat machine.
//!
//! Named states are reserved first, in source order, so their node indices
//! match the grammar's and forward gotos resolve immediately. Interior
//! consumers and consume loops materialize as fresh nodes appended after the
//! named block.

use super::specialize::solve_state;
use crate::{proxy::*, types::*, utils::hash_id_value_u64};
use std::collections::hash_map::Entry as MapEntry;
use tracing::debug;

/// Compiles a grammar into its [Machine]. Pure: identical grammars produce
/// byte-for-byte identical machines, including node order, arm order, and
/// bitmap numbering.
pub fn translate(grammar: &Grammar) -> LatheResult<Machine> {
  let mut machine = Machine::new(grammar.storage.clone());

  for state in &grammar.states {
    machine.add_node(Some(state.name.clone()));
  }

  let mut translator = Translator { machine };

  for (ix, state) in grammar.states.iter().enumerate() {
    let tree = solve_state(state)?;
    let entry = translator.compile_tree(&tree, 0, true)?;
    translator.machine.set_node(ix, entry);
  }

  debug!(states = grammar.states.len(), nodes = translator.machine.len(), "grammar translated");

  Ok(translator.machine)
}

/// Wraps `inst` in a cursor advance when `jump` is non zero. Zero advances
/// are always elided; `Next(0, _)` never reaches the machine.
fn goto_next(jump: u32, inst: Instruction) -> Instruction {
  if jump == 0 {
    inst
  } else {
    Instruction::Next(jump, Box::new(inst))
  }
}

struct Translator {
  machine: Machine,
}

/// Continuations merged under one discriminator after grouping.
struct Group {
  chars: Interval,
  inst:  Instruction,
}

impl Translator {
  /// Compiles a tree at a site that has committed `jump` bytes. When
  /// `is_entry` is set the produced instruction becomes a node's root, so a
  /// branch may yield its consumer directly; interior branches allocate a
  /// fresh node and jump to it.
  fn compile_tree(&mut self, tree: &Tree, jump: u32, is_entry: bool) -> LatheResult<Instruction> {
    match tree {
      Tree::Fail => Ok(Instruction::Error(0)),

      Tree::Done(step) => self.compile_step(jump, step),

      Tree::Consume(prop, step) => {
        // Materialized so control re-entering this pattern resumes the
        // consume at a chunk boundary.
        let node = self.machine.add_node(None);
        let ok = self.compile_step(jump, step)?;
        let entry = Instruction::Consumer(Consumer::Consume { prop: *prop, ok: Box::new(ok) });
        self.machine.set_node(node, entry);
        Ok(Instruction::Goto(node))
      }

      Tree::Branch { branches, default } => {
        let otherwise = self.compile_tree(default, 0, false)?;

        let consumer = match branches {
          Branches::Literal(branch) => {
            debug_assert!(!branch.subject.is_empty());
            let inner_jump = if branch.next.capture { branch.subject.len() as u32 } else { 0 };
            let ok = self.compile_step(inner_jump, &branch.next)?;
            Consumer::Is { subject: branch.subject.clone(), ok: Box::new(ok), err: Box::new(otherwise) }
          }
          Branches::Chars(matchers) => self.compile_matchers(matchers, otherwise)?,
        };

        let inst = Instruction::Consumer(consumer);

        if is_entry {
          Ok(inst)
        } else {
          let node = self.machine.add_node(None);
          self.machine.set_node(node, inst);
          Ok(goto_next(jump, Instruction::Goto(node)))
        }
      }
    }
  }

  /// Compiles the arms of a chars branch and selects the consumer shape.
  ///
  /// Every arm's subtree is compiled under a one byte commit, then arms are
  /// grouped by the structural hash of their compiled continuation: arms
  /// that end up identical merge into a single group over the union of
  /// their intervals. Groups keep the source order of their first member.
  fn compile_matchers(&mut self, matchers: &[CharBranch], otherwise: Instruction) -> LatheResult<Consumer> {
    let mut index: Map<u64, usize> = Map::new();
    let mut groups: Array<Group> = Array::new();

    for matcher in matchers {
      let inst = self.compile_tree(&matcher.next, 1, false)?;

      match index.entry(hash_id_value_u64(&inst)) {
        MapEntry::Occupied(e) => {
          let group = &mut groups[*e.get()];
          group.chars = group.chars.union(&matcher.chars);
        }
        MapEntry::Vacant(e) => {
          e.insert(groups.len());
          groups.push(Group { chars: matcher.chars.clone(), inst });
        }
      }
    }

    // One alternative left: collapse to a bare point, range, or map test.
    if groups.len() == 1 {
      let Group { chars, inst } = groups.pop().unwrap();
      let ok = Box::new(inst);
      let err = Box::new(otherwise);

      return Ok(if let Some(byte) = chars.as_byte() {
        Consumer::Char { byte, ok, err }
      } else if let Some(range) = chars.as_range() {
        Consumer::Range { range, ok, err }
      } else {
        self.machine.intern_bitmap(&chars);
        Consumer::Map { chars, ok, err }
      });
    }

    if groups.iter().all(|g| g.chars.is_byte()) {
      let arms = groups.into_iter().map(|g| (Interval::min(&g.chars), g.inst)).collect();
      return Ok(Consumer::Chars { arms, otherwise: Box::new(otherwise) });
    }

    let arms = groups
      .into_iter()
      .map(|g| {
        let check = self.check_of(&g.chars);
        (check, g.inst)
      })
      .collect();

    Ok(Consumer::Mixed { arms, otherwise: Box::new(otherwise) })
  }

  fn check_of(&mut self, chars: &Interval) -> Check {
    if let Some(byte) = chars.as_byte() {
      Check::Byte(byte)
    } else if let Some(range) = chars.as_range() {
      Check::Range(range)
    } else {
      self.machine.intern_bitmap(chars);
      Check::Map(chars.clone())
    }
  }

  /// Compiles a step at a site that has committed `jump` bytes. A step that
  /// opens a span forces the commit to at least one byte so the recorded
  /// start still points at the matched byte.
  fn compile_step(&mut self, jump: u32, step: &Step) -> LatheResult<Instruction> {
    let jump = if step.capture { jump.max(1) } else { jump };

    match &step.next {
      Next::Single(action) => self.compile_action(jump, step.data, action),
      Next::Select(selector, arms, otherwise) => {
        let mut compiled = Array::with_capacity(arms.len());
        for (value, action) in arms {
          compiled.push((*value, self.compile_action(jump, step.data, action)?));
        }
        let otherwise = self.compile_action(jump, step.data, otherwise)?;
        Ok(Instruction::Select(selector.clone(), compiled, Box::new(otherwise)))
      }
    }
  }

  /// Lowers an action chain. Data stores, calls, and span opens land before
  /// the cursor advance so they observe the matched byte and its position;
  /// everything else advances first. The pending `jump` is spent exactly
  /// once, at the first post advance action.
  fn compile_action(&mut self, jump: u32, data: Option<u8>, action: &SpecAction) -> LatheResult<Instruction> {
    match action {
      SpecAction::Store(Capture::Data, prop, next) => {
        Ok(Instruction::Store(*prop, data, Box::new(self.compile_action(jump, data, next)?)))
      }

      SpecAction::Store(Capture::Begin, prop, next) => {
        Ok(Instruction::Capture(*prop, Box::new(self.compile_action(jump, data, next)?)))
      }

      SpecAction::Store(Capture::Close, prop, next) => {
        Ok(goto_next(jump, Instruction::Close(*prop, Box::new(self.compile_action(0, data, next)?))))
      }

      SpecAction::Call(call, next) => {
        Ok(Instruction::Call(call.clone(), Box::new(self.compile_action(jump, data, next)?)))
      }

      SpecAction::Goto(name) => {
        let target = self.machine.state(name).ok_or_else(|| LatheError::UnknownState(name.clone()))?;
        Ok(goto_next(jump, Instruction::Goto(target)))
      }

      SpecAction::Error(code) => Ok(goto_next(jump, Instruction::Error(*code))),
    }
  }
}
