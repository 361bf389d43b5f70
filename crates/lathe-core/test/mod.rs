mod test_lint;
mod test_specialize;
