use proptest::prelude::*;
use std::collections::BTreeSet;
use yul_core::ast::{Block, Expression, Statement, TypedName};
use yul_core::{Dialect, NameDispenser};

fn declarations(names: &BTreeSet<String>) -> Block {
    Block::new(
        names
            .iter()
            .map(|name| Statement::declare(vec![TypedName::new(name.clone())], Some(Expression::number("0"))))
            .collect(),
    )
}

#[test]
fn test_builtins_are_never_handed_out() {
    let dialect = Dialect::evm();
    let mut dispenser = NameDispenser::new(&dialect);
    assert!(dispenser.is_used("sstore"));
    assert_eq!(dispenser.new_name("x"), "x_1");
}

#[test]
fn test_counter_skips_taken_names() {
    let dialect = Dialect::evm();
    let taken: BTreeSet<String> = ["x_1", "x_2", "y_3"].iter().map(|s| s.to_string()).collect();
    let mut dispenser = NameDispenser::for_block(&dialect, &declarations(&taken));
    assert_eq!(dispenser.new_name("x"), "x_3");
    assert_eq!(dispenser.new_name("y"), "y_4");
    assert_eq!(dispenser.counter(), 4);
}

proptest! {
    #[test]
    fn fresh_names_never_collide(
        taken in prop::collection::btree_set("[abx]_[1-9]", 0..12),
        hints in prop::collection::vec("[abx]", 1..24),
    ) {
        let dialect = Dialect::evm();
        let mut dispenser = NameDispenser::for_block(&dialect, &declarations(&taken));
        let mut handed_out = BTreeSet::new();
        for hint in &hints {
            let name = dispenser.new_name(hint);
            prop_assert!(!taken.contains(&name));
            prop_assert!(handed_out.insert(name.clone()), "{} handed out twice", name);
            prop_assert!(name.starts_with(hint.as_str()));
        }
    }
}
