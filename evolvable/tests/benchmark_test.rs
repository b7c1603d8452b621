#[test]
fn count_lines_matches_newline_count() {
    assert_eq!(count_lines("a\nb\nc\n"), 3);
    assert_eq!(count_lines(""), 0);
}

#[test]
fn mean_micros_averages_samples() {
    assert_eq!(mean_micros(&[100, 200, 300]), 200.0);
    assert_eq!(mean_micros(&[]), 0.0);
}
