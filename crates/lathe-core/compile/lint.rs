//! Advisory span capture check.
//!
//! Walks the state graph from the grammar's first state tracking which span
//! properties are open on every path into each state, and flags any close
//! that can run without a matching begin. The result is advisory; `translate`
//! never consults it.

use crate::{proxy::*, types::*};

/// Reports a [LatheError::BadCapture] for every span property that may close
/// while unopened on some path. An empty result means every close is covered.
pub fn lint_captures(grammar: &Grammar) -> Array<LatheError> {
  if grammar.states.is_empty() {
    return Array::new();
  }

  Lint::new(grammar).run()
}

struct Lint<'g> {
  grammar: &'g Grammar,
  index:   Map<&'g str, usize>,
  /// Span properties proven open on every path into a state. `None` until
  /// the state is first reached; meet is set intersection.
  open_in: Array<Option<OrderedSet<PropId>>>,
  flagged: OrderedSet<PropId>,
  queue:   Queue<usize>,
}

impl<'g> Lint<'g> {
  fn new(grammar: &'g Grammar) -> Self {
    Self {
      grammar,
      index: grammar.states.iter().enumerate().map(|(ix, s)| (s.name.as_str(), ix)).collect(),
      open_in: vec![None; grammar.states.len()],
      flagged: OrderedSet::new(),
      queue: Queue::new(),
    }
  }

  fn run(mut self) -> Array<LatheError> {
    self.open_in[0] = Some(OrderedSet::new());
    self.queue.push_back(0);

    while let Some(ix) = self.queue.pop_front() {
      let open = self.open_in[ix].clone().unwrap_or_default();
      for (_, action) in &self.grammar.states[ix].cases {
        self.walk_chain(action, open.clone());
      }
    }

    let storage = &self.grammar.storage;
    self
      .flagged
      .into_iter()
      .map(|prop| {
        let name = storage.prop(prop).map(|(name, _)| name.clone()).unwrap_or_else(|| prop.to_string());
        LatheError::BadCapture(name)
      })
      .collect()
  }

  fn walk_chain(&mut self, action: &Action, mut open: OrderedSet<PropId>) {
    match action {
      Action::Store(Capture::Begin, prop, next) => {
        open.insert(*prop);
        self.walk_chain(next, open);
      }

      Action::Store(Capture::Close, prop, next) => {
        if !open.remove(prop) {
          self.flagged.insert(*prop);
        }
        self.walk_chain(next, open);
      }

      Action::Store(Capture::Data, _, next) | Action::Call(_, next) => self.walk_chain(next, open),

      Action::Goto(name) => self.flow_into(name, open),

      Action::Error(..) => {}

      Action::Select(_, arms, otherwise) => {
        for (_, arm) in arms {
          self.walk_chain(arm, open.clone());
        }
        self.walk_chain(otherwise, open);
      }
    }
  }

  /// Meets the open set into the target state, re queuing it on change.
  /// Unknown targets are `translate`'s problem, not the lint's.
  fn flow_into(&mut self, name: &str, open: OrderedSet<PropId>) {
    let Some(&target) = self.index.get(name) else { return };

    let merged = match &self.open_in[target] {
      None => open,
      Some(existing) => existing.intersection(&open).copied().collect(),
    };

    if self.open_in[target].as_ref() != Some(&merged) {
      self.open_in[target] = Some(merged);
      self.queue.push_back(target);
    }
  }
}
