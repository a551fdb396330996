use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use super::*;

#[test]
fn builds_and_wires() -> Result<()> {
    let make = inject(builders! {
        foo: |_: &Instance<i32>| Ok(3),
        bar: |it: &Instance<i32>| Ok(it.require("foo")? * 2),
    });
    let it = make.build();
    assert_eq!(
        it.snapshot()?,
        BTreeMap::from([("bar".to_owned(), 6), ("foo".to_owned(), 3)])
    );
    Ok(())
}

#[test]
fn resolution_is_deferred_and_memoized() -> Result<()> {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let make = inject(builders! {
        foo: move |_: &Instance<i32>| {
            counter.set(counter.get() + 1);
            Ok(7)
        },
    });
    let it = make.build();
    assert_eq!(calls.get(), 0);
    for _ in 0..3 {
        assert_eq!(it.require("foo")?, 7);
    }
    assert_eq!(calls.get(), 1);
    Ok(())
}

#[test]
fn enumerates_exactly_the_declared_fields() -> Result<()> {
    let make = inject(builders! {
        foo: |_: &Instance<i32>| Ok(3),
        bar: |it: &Instance<i32>| Ok(it.require("foo")? * 2),
    });
    let it = make.build();
    let names: Vec<&str> = it.fields().collect();
    assert_eq!(names, ["bar", "foo"]);
    assert_eq!(
        it.snapshot()?,
        BTreeMap::from([("bar".to_owned(), 6), ("foo".to_owned(), 3)])
    );
    Ok(())
}

#[test]
fn hooks_default_to_identity() -> Result<()> {
    let make = inject(builders! { foo: |_: &Instance<i32>| Ok(3) });
    assert_eq!(make.build().require("foo")?, 3);
    assert_eq!(make.build_with(HookMap::new()).require("foo")?, 3);
    Ok(())
}

#[test]
fn hook_overrides_a_value() -> Result<()> {
    let make = inject(builders! { foo: |_: &Instance<i32>| Ok(3) });
    let it = make.build_with(hooks! { foo: |_, _| Ok(42) });
    assert_eq!(it.require("foo")?, 42);
    Ok(())
}

#[test]
fn hook_receives_raw_builder_output() -> Result<()> {
    let seen = Rc::new(Cell::new(0));
    let probe = Rc::clone(&seen);
    let make = inject(builders! { foo: |_: &Instance<i32>| Ok(3) });
    let it = make.build_with(hooks! {
        foo: move |raw, _| {
            probe.set(raw);
            Ok(raw)
        },
    });
    it.require("foo")?;
    assert_eq!(seen.get(), 3);
    Ok(())
}

#[test]
fn dependent_builder_observes_hooked_value() -> Result<()> {
    let make = inject(builders! {
        foo: |_: &Instance<i32>| Ok(3),
        answer: |it: &Instance<i32>| Ok(2 * it.require("foo")?),
    });
    let it = make.build_with(hooks! { foo: |_, _| Ok(21) });
    assert_eq!(it.require("answer")?, 42);
    Ok(())
}

#[test]
fn hook_scopes_are_independent() -> Result<()> {
    let make = inject(builders! { foo: |_: &Instance<i32>| Ok(3) });
    let mul = make.build_with(hooks! { foo: |n, _| Ok(n * 2) });
    let add = make.build_with(hooks! { foo: |n, _| Ok(n + 2) });
    assert_eq!(mul.require("foo")?, 6);
    assert_eq!(add.require("foo")?, 5);
    Ok(())
}

#[test]
fn chain_applies_left_to_right() -> Result<()> {
    let make = inject(builders! { foo: |_: &Instance<i32>| Ok(3) });
    let double = || hooks! { foo: |n, _| Ok(2 * n) };
    let add_two = || hooks! { foo: |n, _| Ok(n + 2) };
    let it = make.build_with(chain([double(), add_two()]));
    assert_eq!(it.require("foo")?, 8);
    let it = make.build_with(chain([add_two(), double()]));
    assert_eq!(it.require("foo")?, 10);
    Ok(())
}

// Comparing Rc pointers to trait objects also compares vtable pointers;
// both sides here are clones of one allocation, so the lint is moot.
#[allow(clippy::vtable_address_comparisons)]
#[test]
fn chain_keeps_single_contributor_by_reference() {
    let only: HookMap<i32> = hooks! { foo: |n, _| Ok(n) };
    let combined = chain([only.clone(), HookMap::new()]);
    assert!(Rc::ptr_eq(
        only.get("foo").unwrap(),
        combined.get("foo").unwrap()
    ));
    assert!(combined.get("bar").is_none());
}

#[test]
fn chained_hooks_all_receive_self() -> Result<()> {
    let make = inject(builders! {
        base: |_: &Instance<i32>| Ok(1),
        foo: |_: &Instance<i32>| Ok(0),
    });
    let first = hooks! { foo: |n, it: &Instance<i32>| Ok(n + it.require("base")?) };
    let second = hooks! { foo: |n, it: &Instance<i32>| Ok(n * 10 + it.require("base")?) };
    let it = make.build_with(chain([first, second]));
    assert_eq!(it.require("foo")?, 11);
    Ok(())
}

#[test]
fn failed_builder_is_not_poisoned() -> Result<()> {
    let pantry = Rc::new(Cell::new(0_u32));
    let stock = Rc::clone(&pantry);
    let make = inject(builders! {
        eggs: move |_: &Instance<u32>| {
            let count = stock.get();
            if count == 0 {
                return Err(ResolveError::failed("no eggs left"));
            }
            Ok(count)
        },
    });
    let it = make.build();
    assert!(matches!(it.require("eggs"), Err(ResolveError::Failed(_))));
    pantry.set(3);
    assert_eq!(it.require("eggs")?, 3);
    // The first success is memoized; the builder does not run again.
    pantry.set(9);
    assert_eq!(it.require("eggs")?, 3);
    Ok(())
}

#[test]
fn failed_hook_is_not_poisoned() -> Result<()> {
    let builds = Rc::new(Cell::new(0));
    let counter = Rc::clone(&builds);
    let broken = Rc::new(Cell::new(true));
    let fuse = Rc::clone(&broken);
    let make = inject(builders! {
        foo: move |_: &Instance<i32>| {
            counter.set(counter.get() + 1);
            Ok(3)
        },
    });
    let it = make.build_with(hooks! {
        foo: move |n, _| {
            if fuse.get() {
                return Err(ResolveError::failed("hook refused the value"));
            }
            Ok(n)
        },
    });
    assert!(it.require("foo").is_err());
    broken.set(false);
    assert_eq!(it.require("foo")?, 3);
    // The whole pipeline ran twice: once failing, once succeeding.
    assert_eq!(builds.get(), 2);
    Ok(())
}

#[test]
fn cyclic_resolution_is_reported() {
    let make = inject(builders! {
        a: |it: &Instance<i32>| Ok(it.require("b")? + 1),
        b: |it: &Instance<i32>| Ok(it.require("a")? + 1),
    });
    let it = make.build();
    match it.require("a") {
        Err(ResolveError::Cycle { path }) => assert_eq!(path, ["a", "b", "a"]),
        other => panic!("expected a cycle error, got {other:?}"),
    }
    // Detection leaves no stale markers: the same cycle reports again.
    assert!(matches!(it.require("b"), Err(ResolveError::Cycle { .. })));
}

#[test]
fn self_cycle_is_reported() -> Result<()> {
    let make = inject(builders! {
        narcissus: |it: &Instance<i32>| it.require("narcissus"),
        other: |_: &Instance<i32>| Ok(5),
    });
    let it = make.build();
    match it.require("narcissus") {
        Err(ResolveError::Cycle { path }) => assert_eq!(path, ["narcissus", "narcissus"]),
        other => panic!("expected a cycle error, got {other:?}"),
    }
    assert_eq!(it.require("other")?, 5);
    Ok(())
}

#[test]
fn unknown_fields_are_absent_not_failed() {
    let make = inject(builders! { foo: |_: &Instance<i32>| Ok(3) });
    let it = make.build();
    assert!(matches!(it.get("bar"), Ok(None)));
    assert!(matches!(it.require("bar"), Err(ResolveError::Unknown(_))));
}

#[test]
fn macros_match_chained_constructors() -> Result<()> {
    let declarative = inject(builders! { foo: |_: &Instance<i32>| Ok(3) });
    let chained = inject(Builders::new().with("foo", |_: &Instance<i32>| Ok(3)));
    let hooked: HookMap<i32> = hooks! { foo: |n, _| Ok(n + 1) };
    assert_eq!(
        declarative.build_with(hooked.clone()).snapshot()?,
        chained.build_with(hooked).snapshot()?
    );
    Ok(())
}
