use thiserror::Error;

/// Errors surfaced while lowering a grammar. All are raised synchronously;
/// a failed compile discards any partial machine.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LatheError {
  /// Two cases at the same state accept an overlapping byte or prefix.
  #[error("conflicting cases in state [{state}]: {details}")]
  GrammarConflict { state: String, details: String },

  /// A `goto` names a state the grammar does not define.
  #[error("goto target [{0}] is not a defined state")]
  UnknownState(String),

  /// A span close is reachable without a matching begin. Advisory; reported
  /// by the capture lint, never by `translate` itself.
  #[error("span property [{0}] may close without an opening capture")]
  BadCapture(String),

  /// A literal or set pattern with no bytes.
  #[error("empty pattern in state [{0}]")]
  EmptyPattern(String),
}

pub type LatheResult<T> = Result<T, LatheError>;
