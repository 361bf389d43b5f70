use super::{Bitmap, Instruction, Interval, Storage};
use crate::proxy::{Array, OrderedMap};
use tracing::trace;

/// One machine node: an entry instruction plus the flag emitters key their
/// dispatch loop on. `is_check` is true exactly when the body is a consumer
/// and therefore gates on input availability.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inst {
  pub is_check: bool,
  pub body:     Instruction,
}

/// The compiler's output: a flat, indexed list of instruction nodes plus the
/// grammar's storage and the interned bitmap tables.
///
/// Built once by [translate](crate::translate); read only afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Machine {
  pub storage: Storage,
  names:       Array<String>,
  nodes:       Array<Inst>,
  mapper:      OrderedMap<String, usize>,
  bitmaps:     OrderedMap<Interval, usize>,
}

impl Machine {
  pub(crate) fn new(storage: Storage) -> Self {
    Self { storage, ..Default::default() }
  }

  /// Appends a placeholder node and returns its index. Named nodes register
  /// in the state mapper; unnamed nodes get a generated `state<N>` label.
  pub(crate) fn add_node(&mut self, name: Option<String>) -> usize {
    let ix = self.nodes.len();

    match name {
      Some(name) => {
        self.mapper.insert(name.clone(), ix);
        self.names.push(name);
      }
      None => self.names.push(format!("state{ix}")),
    }

    self.nodes.push(Inst { is_check: false, body: Instruction::Error(0) });
    ix
  }

  pub(crate) fn set_node(&mut self, ix: usize, body: Instruction) {
    let is_check = body.is_consumer();
    self.nodes[ix] = Inst { is_check, body };
  }

  /// Interns an interval, assigning bitmap indices in first-seen order so
  /// emitted table names reproduce across runs.
  pub(crate) fn intern_bitmap(&mut self, chars: &Interval) -> usize {
    let next = self.bitmaps.len();
    let id = *self.bitmaps.entry(chars.clone()).or_insert(next);
    if id == next {
      trace!(bitmap = %chars, id, "interned character class");
    }
    id
  }

  pub fn nodes(&self) -> &[Inst] {
    &self.nodes
  }

  pub fn node(&self, ix: usize) -> Option<&Inst> {
    self.nodes.get(ix)
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  /// The grammar name (or generated label) of a node.
  pub fn name_of(&self, ix: usize) -> Option<&str> {
    self.names.get(ix).map(String::as_str)
  }

  pub fn names(&self) -> &[String] {
    &self.names
  }

  /// Resolves a named state to its node index.
  pub fn state(&self, name: &str) -> Option<usize> {
    self.mapper.get(name).copied()
  }

  /// Named state table, for emitters that expose entry points.
  pub fn states(&self) -> &OrderedMap<String, usize> {
    &self.mapper
  }

  /// The switch label an emitter gives node `ix`.
  pub fn entry_label(&self, ix: usize) -> String {
    format!("state_{ix}")
  }

  /// The interned bitmap index of a character class, when one was emitted.
  pub fn bitmap_id(&self, chars: &Interval) -> Option<usize> {
    self.bitmaps.get(chars).copied()
  }

  /// Materialized `(index, table)` pairs in index order. Equal canonical
  /// intervals share one table.
  pub fn bitmap_tables(&self) -> Array<(usize, Bitmap)> {
    let mut tables: Array<(usize, Bitmap)> = self.bitmaps.iter().map(|(iv, id)| (*id, iv.to_bitmap())).collect();
    tables.sort_by_key(|(id, _)| *id);
    tables
  }
}
