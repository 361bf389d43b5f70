use crate::proxy::Array;

/// The declared width of a property slot, or `Span` for a position pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Typ {
  U8,
  Char,
  U16,
  U32,
  U64,
  /// A `(start, end)` position pair. Closing a span invokes its host
  /// callback and clears the recorded start.
  Span,
}

/// Index of a property slot within [Storage::props].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropId(pub u32);

impl From<usize> for PropId {
  fn from(ix: usize) -> Self {
    Self(ix as u32)
  }
}

impl From<PropId> for usize {
  fn from(id: PropId) -> Self {
    id.0 as usize
  }
}

impl std::fmt::Display for PropId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "%{}", self.0)
  }
}

/// One host side callback the emitted parser can invoke.
///
/// Plain callbacks receive the listed argument properties and return an
/// updated user state plus a `u64` code. Span callbacks receive
/// `(start, end, buffer, user_state)` when their span property closes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CallbackDef {
  pub name:    String,
  pub args:    Array<PropId>,
  pub is_span: bool,
}

/// The grammar's declaration of persistent parser state: named, typed
/// property slots and the callbacks that consume them. Passed through to the
/// machine untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Storage {
  props:     Array<(String, Typ)>,
  callbacks: Array<CallbackDef>,
}

impl Storage {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add_prop(&mut self, name: &str, typ: Typ) -> PropId {
    let id = PropId(self.props.len() as u32);
    self.props.push((name.to_string(), typ));
    id
  }

  pub fn add_callback(&mut self, name: &str, args: Array<PropId>, is_span: bool) -> usize {
    self.callbacks.push(CallbackDef { name: name.to_string(), args, is_span });
    self.callbacks.len() - 1
  }

  pub fn props(&self) -> &[(String, Typ)] {
    &self.props
  }

  pub fn callbacks(&self) -> &[CallbackDef] {
    &self.callbacks
  }

  pub fn prop(&self, id: PropId) -> Option<&(String, Typ)> {
    self.props.get(usize::from(id))
  }

  /// Resolves the span callback attached to a span property: the callback
  /// flagged `is_span` whose argument list is exactly this property.
  pub fn span_callback_of(&self, prop: PropId) -> Option<usize> {
    self.callbacks.iter().position(|c| c.is_span && c.args.len() == 1 && c.args[0] == prop)
  }
}
