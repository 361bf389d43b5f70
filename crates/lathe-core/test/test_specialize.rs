use crate::{solve_state, types::*};
use pretty_assertions::assert_eq;

fn done(action: SpecAction) -> Tree {
  Tree::Done(Step { capture: false, data: None, next: Next::Single(action) })
}

fn done_data(data: u8, action: SpecAction) -> Tree {
  Tree::Done(Step { capture: false, data: Some(data), next: Next::Single(action) })
}

#[test]
fn lone_literal_keeps_its_prefix_specialization() {
  let state = State::new("start").case(Pattern::literal(*b"GET"), Action::goto("done"));

  let tree = solve_state(&state).unwrap();

  assert_eq!(tree, Tree::Branch {
    branches: Branches::Literal(LiteralBranch {
      subject: b"GET".to_vec(),
      next:    Step { capture: false, data: None, next: Next::Single(SpecAction::Goto("done".to_string())) },
    }),
    default:  Box::new(Tree::Fail),
  });
}

#[test]
fn shared_leading_bytes_factor_into_nested_branches() {
  let state = State::new("method")
    .case(Pattern::literal(*b"abc"), Action::goto("C"))
    .case(Pattern::literal(*b"abd"), Action::goto("D"));

  let tree = solve_state(&state).unwrap();

  let tail = Tree::Branch {
    branches: Branches::Chars(vec![
      CharBranch { chars: Interval::single(b'c'), next: done(SpecAction::Goto("C".to_string())) },
      CharBranch { chars: Interval::single(b'd'), next: done(SpecAction::Goto("D".to_string())) },
    ]),
    default:  Box::new(Tree::Fail),
  };

  assert_eq!(tree, Tree::Branch {
    branches: Branches::Chars(vec![CharBranch {
      chars: Interval::single(b'a'),
      next:  Tree::Branch {
        branches: Branches::Chars(vec![CharBranch { chars: Interval::single(b'b'), next: tail }]),
        default:  Box::new(Tree::Fail),
      },
    }]),
    default:  Box::new(Tree::Fail),
  });
}

#[test]
fn single_byte_literals_fold_into_classes() {
  let state = State::new("start").case(Pattern::literal(*b"a"), Action::goto("A")).case(
    Pattern::Byte(b'b'),
    Action::goto("B"),
  );

  let tree = solve_state(&state).unwrap();

  assert_eq!(tree, Tree::Branch {
    branches: Branches::Chars(vec![
      CharBranch { chars: Interval::single(b'a'), next: done_data(b'a', SpecAction::Goto("A".to_string())) },
      CharBranch { chars: Interval::single(b'b'), next: done_data(b'b', SpecAction::Goto("B".to_string())) },
    ]),
    default:  Box::new(Tree::Fail),
  });
}

#[test]
fn arm_order_follows_source_order() {
  let state = State::new("start")
    .case(Pattern::Byte(b'z'), Action::goto("A"))
    .case(Pattern::literal(*b"no"), Action::goto("B"))
    .case(Pattern::Byte(b'm'), Action::goto("C"));

  let Tree::Branch { branches: Branches::Chars(arms), .. } = solve_state(&state).unwrap() else {
    panic!("expected a chars branch")
  };

  let discriminators: Vec<Interval> = arms.iter().map(|a| a.chars.clone()).collect();
  assert_eq!(discriminators, vec![Interval::single(b'z'), Interval::single(b'n'), Interval::single(b'm')]);
}

#[test]
fn otherwise_becomes_the_default_subtree() {
  let state = State::new("start")
    .case(Pattern::Byte(b'a'), Action::goto("A"))
    .case(Pattern::Otherwise, Action::Error(3));

  let Tree::Branch { default, .. } = solve_state(&state).unwrap() else { panic!("expected a branch") };

  assert_eq!(*default, done(SpecAction::Error(3)));
}

#[test]
fn begin_capture_marks_the_step() {
  let span = PropId(0);
  let state = State::new("start").case(Pattern::Range(b'a', b'z'), Action::store(Capture::Begin, span, Action::goto("body")));

  let Tree::Branch { branches: Branches::Chars(arms), .. } = solve_state(&state).unwrap() else {
    panic!("expected a chars branch")
  };

  let Tree::Done(step) = &arms[0].next else { panic!("expected a terminal arm") };
  assert!(step.capture);
}

#[test]
fn overlapping_classes_conflict() {
  let state = State::new("start")
    .case(Pattern::Byte(b'A'), Action::goto("one"))
    .case(Pattern::Byte(b'A'), Action::goto("two"));

  assert_eq!(
    solve_state(&state),
    Err(LatheError::GrammarConflict { state: "start".to_string(), details: "overlapping at 0x41".to_string() })
  );
}

#[test]
fn class_overlapping_a_literal_head_conflicts() {
  let state = State::new("start")
    .case(Pattern::Range(b'A', b'Z'), Action::goto("alpha"))
    .case(Pattern::literal(*b"GET"), Action::goto("method"));

  assert_eq!(
    solve_state(&state),
    Err(LatheError::GrammarConflict { state: "start".to_string(), details: "overlapping at 0x47".to_string() })
  );
}

#[test]
fn literal_prefix_of_literal_conflicts() {
  let state = State::new("start")
    .case(Pattern::literal(*b"ab"), Action::goto("one"))
    .case(Pattern::literal(*b"abc"), Action::goto("two"));

  let Err(LatheError::GrammarConflict { details, .. }) = solve_state(&state) else { panic!("expected a conflict") };
  assert!(details.contains("prefix"), "unexpected details: {details}");
}

#[test]
fn duplicate_defaults_conflict() {
  let state = State::new("start")
    .case(Pattern::Otherwise, Action::Error(1))
    .case(Pattern::Consume(PropId(0)), Action::goto("next"));

  let Err(LatheError::GrammarConflict { details, .. }) = solve_state(&state) else { panic!("expected a conflict") };
  assert!(details.contains("default"), "unexpected details: {details}");
}

#[test]
fn empty_literal_is_rejected() {
  let state = State::new("start").case(Pattern::Literal(vec![]), Action::goto("next"));
  assert_eq!(solve_state(&state), Err(LatheError::EmptyPattern("start".to_string())));
}

#[test]
fn empty_set_is_rejected() {
  let state = State::new("start").case(Pattern::Set(vec![]), Action::goto("next"));
  assert_eq!(solve_state(&state), Err(LatheError::EmptyPattern("start".to_string())));
}

#[test]
fn select_lowers_into_the_step() {
  let state = State::new("start").case(
    Pattern::Byte(b'?'),
    Action::select(Selector::Method(PropId(2)), vec![(1, Action::goto("yes"))], Action::Error(9)),
  );

  let Tree::Branch { branches: Branches::Chars(arms), .. } = solve_state(&state).unwrap() else {
    panic!("expected a chars branch")
  };

  let Tree::Done(step) = &arms[0].next else { panic!("expected a terminal arm") };

  assert_eq!(
    step.next,
    Next::Select(
      Selector::Method(PropId(2)),
      vec![(1, SpecAction::Goto("yes".to_string()))],
      Box::new(SpecAction::Error(9)),
    )
  );
}

#[test]
fn nested_select_is_rejected() {
  let inner = Action::select(Selector::Method(PropId(0)), vec![], Action::Error(1));
  let state = State::new("start").case(
    Pattern::Byte(b'?'),
    Action::select(Selector::Method(PropId(1)), vec![(1, inner)], Action::Error(2)),
  );

  let Err(LatheError::GrammarConflict { details, .. }) = solve_state(&state) else { panic!("expected a conflict") };
  assert!(details.contains("select"), "unexpected details: {details}");
}
