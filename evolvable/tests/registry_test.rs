#[test]
fn select_wraps_round_robin() {
    for g in 0..12u64 {
        assert_eq!(select(g, 4), select(g + 4, 4));
    }
}

#[test]
fn select_is_zero_for_empty_set() {
    assert_eq!(select(7, 0), 0);
}
