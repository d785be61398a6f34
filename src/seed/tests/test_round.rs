use super::super::round::{BlockState, Captured};

fn state(n: usize) -> BlockState {
    let bytes = vec![0xABu8; n * 16];
    BlockState::reload_from(&bytes).unwrap()
}

#[test]
fn non_capturing_round_fully_updates_and_is_reusable() {
    let mut b = state(2);
    let ks0 = vec![1, 2];
    let ks1 = vec![3, 4];
    let before = b.output_bytes();
    let captured = b.apply_round(0, &ks0, &ks1, false, None);
    assert!(matches!(captured[0], Captured::None));
    assert_ne!(before, b.output_bytes());
}

#[test]
fn reset_restores_original_bytes() {
    let mut b = state(1);
    let ks0 = vec![7];
    let ks1 = vec![9];
    let original = b.output_bytes();
    b.apply_round(0, &ks0, &ks1, false, None);
    b.block_round = Some(0);
    b.reset();
    assert_eq!(b.output_bytes(), original);
    assert_eq!(b.block_round, None);
}

#[test]
fn broadcast_indexes_subkeys_at_zero() {
    let mut a = state(2);
    let mut b = state(2);
    let ks0_broadcast = vec![5];
    let ks1_broadcast = vec![6];
    let ks0_expanded = vec![5, 5];
    let ks1_expanded = vec![6, 6];

    a.apply_round(0, &ks0_broadcast, &ks1_broadcast, true, None);
    b.apply_round(0, &ks0_expanded, &ks1_expanded, false, None);

    assert_eq!(a.output_bytes(), b.output_bytes());
}
