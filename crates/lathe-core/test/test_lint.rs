use crate::{lint_captures, types::*};
use pretty_assertions::assert_eq;

fn span_storage() -> (Storage, PropId) {
  let mut storage = Storage::new();
  let token = storage.add_prop("token", Typ::Span);
  storage.add_callback("on_token", vec![token], true);
  (storage, token)
}

#[test]
fn balanced_captures_pass() {
  let (storage, token) = span_storage();

  let grammar = Grammar::new(storage)
    .state(State::new("start").case(Pattern::Range(b'a', b'z'), Action::store(Capture::Begin, token, Action::goto("body"))))
    .state(
      State::new("body")
        .case(Pattern::Range(b'a', b'z'), Action::goto("body"))
        .case(Pattern::Byte(b' '), Action::store(Capture::Close, token, Action::goto("start"))),
    );

  assert_eq!(lint_captures(&grammar), vec![]);
}

#[test]
fn close_without_begin_is_flagged() {
  let (storage, token) = span_storage();

  let grammar = Grammar::new(storage)
    .state(State::new("start").case(Pattern::Byte(b'.'), Action::store(Capture::Close, token, Action::goto("start"))));

  assert_eq!(lint_captures(&grammar), vec![LatheError::BadCapture("token".to_string())]);
}

#[test]
fn one_uncovered_path_is_enough_to_flag() {
  let (storage, token) = span_storage();

  // "closing" is reachable both with the span open (via "open") and without
  // it (directly from "start"), so its close is not covered on every path.
  let grammar = Grammar::new(storage)
    .state(
      State::new("start")
        .case(Pattern::Byte(b'o'), Action::store(Capture::Begin, token, Action::goto("closing")))
        .case(Pattern::Byte(b'x'), Action::goto("closing")),
    )
    .state(State::new("closing").case(Pattern::Byte(b'.'), Action::store(Capture::Close, token, Action::goto("start"))));

  assert_eq!(lint_captures(&grammar), vec![LatheError::BadCapture("token".to_string())]);
}

#[test]
fn captures_track_through_select_arms() {
  let (storage, token) = span_storage();
  let mut storage = storage;
  let kind = storage.add_prop("kind", Typ::U32);

  let grammar = Grammar::new(storage)
    .state(State::new("start").case(
      Pattern::Byte(b'?'),
      Action::select(
        Selector::Method(kind),
        vec![(1, Action::store(Capture::Begin, token, Action::goto("closing")))],
        Action::goto("closing"),
      ),
    ))
    .state(State::new("closing").case(Pattern::Byte(b'.'), Action::store(Capture::Close, token, Action::goto("start"))));

  // The otherwise arm reaches "closing" without opening the span.
  assert_eq!(lint_captures(&grammar), vec![LatheError::BadCapture("token".to_string())]);
}

#[test]
fn empty_grammars_have_nothing_to_flag() {
  assert_eq!(lint_captures(&Grammar::default()), vec![]);
}
