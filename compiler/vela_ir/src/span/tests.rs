use pretty_assertions::assert_eq;

use super::Span;

#[test]
fn merge_covers_both() {
    let a = Span::new(4, 9);
    let b = Span::new(2, 6);
    assert_eq!(a.merge(b), Span::new(2, 9));
}

#[test]
fn empty_and_len() {
    assert!(Span::DUMMY.is_empty());
    assert_eq!(Span::new(3, 10).len(), 7);
}

#[test]
fn contains_is_end_exclusive() {
    let s = Span::new(5, 8);
    assert!(s.contains(5));
    assert!(s.contains(7));
    assert!(!s.contains(8));
}

#[test]
fn line_col_counts_newlines() {
    let src = "let a = 1\nlet b = 2\n";
    assert_eq!(Span::line_col(0, src), (1, 1));
    assert_eq!(Span::line_col(4, src), (1, 5));
    assert_eq!(Span::line_col(10, src), (2, 1));
    assert_eq!(Span::line_col(14, src), (2, 5));
}
