//! Algebraic properties of canonicalization and equivalence

use nickguard_core::{CollationStrength, IdentityComparator};
use nickguard_test_utils::{config_with, LOOKALIKE_GROUPS};
use proptest::prelude::*;

fn identity(groups: &[&str], strength: CollationStrength) -> IdentityComparator {
    config_with(groups, strength).build().unwrap()
}

const OVERLAPPING: &[&str] = &["a, b", "c, b", "x, ab", "m, rn", "n, r", "0, O, o"];

#[test]
fn lookalike_example() {
    let id = identity(&["0, O, o"], CollationStrength::Off);
    assert!(id.equivalent("R00T", "ROOT"));
    assert!(!id.equivalent("R00T", "R0O7"));

    let with_seven = identity(&["0, O, o", "7, T"], CollationStrength::Off);
    assert!(with_seven.equivalent("R00T", "R0O7"));
}

#[test]
fn group_order_does_not_change_disjoint_folding() {
    let forward = identity(&["0, O", "1, l"], CollationStrength::Off);
    let backward = identity(&["1, l", "0, O"], CollationStrength::Off);

    for handle in ["lOOp", "f00l", "Hello"] {
        assert_eq!(forward.canonicalize(handle), backward.canonicalize(handle));
    }
}

proptest! {
    #[test]
    fn prop_idempotent_with_overlapping_groups(s in "[abcmnrxO0o]{0,20}") {
        let id = identity(OVERLAPPING, CollationStrength::Off);
        if let Ok(once) = id.canonicalize(&s) {
            prop_assert_eq!(id.canonicalize(&once), Ok(once.clone()));
        }
    }

    #[test]
    fn prop_canonical_form_is_equivalent_to_input(s in "[A-Za-z0-9]{0,20}") {
        let id = identity(LOOKALIKE_GROUPS, CollationStrength::Off);
        let canonical = id.canonicalize(&s).unwrap();
        prop_assert!(id.equivalent(&s, &canonical));
    }

    #[test]
    fn prop_reflexive(s in "\\PC{0,200}") {
        let id = identity(LOOKALIKE_GROUPS, CollationStrength::Tertiary);
        prop_assert!(id.equivalent(&s, &s));
    }

    #[test]
    fn prop_symmetric(a in "[A-Da-d0-9IlOo]{0,10}", b in "[A-Da-d0-9IlOo]{0,10}") {
        let id = identity(LOOKALIKE_GROUPS, CollationStrength::Primary);
        prop_assert_eq!(id.equivalent(&a, &b), id.equivalent(&b, &a));
    }

    #[test]
    fn prop_empty_table_off_is_string_equality(a in "\\PC{0,6}", b in "\\PC{0,6}") {
        let id = identity(&[], CollationStrength::Off);
        prop_assert_eq!(id.equivalent(&a, &b), a == b);
    }
}
