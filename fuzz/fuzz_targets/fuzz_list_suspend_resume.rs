#![no_main]

use std::cell::RefCell;
use std::rc::Rc;

use arbitrary::Arbitrary;
use dlgbind_reactive::ObservableList;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
enum Mutation {
    Push(u8),
    Insert(u8, u8),
    RemoveAt(u8),
    Set(u8, u8),
    Remove(u8),
    Clear,
    Extend(Vec<u8>),
    Retain(u8),
    Reverse,
    Sort,
}

#[derive(Arbitrary, Debug)]
struct Input {
    initial: Vec<u8>,
    batches: Vec<(bool, Vec<Mutation>)>,
}

fn apply(list: &ObservableList<u8>, mutation: &Mutation) {
    let len = list.len();
    match mutation {
        Mutation::Push(v) => list.push(*v % 8),
        Mutation::Insert(i, v) => list.insert(usize::from(*i), *v % 8),
        Mutation::RemoveAt(i) => {
            list.pop_at(usize::from(*i));
        }
        Mutation::Set(i, v) if usize::from(*i) < len => {
            list.set(usize::from(*i), *v % 8);
        }
        Mutation::Set(..) => {}
        Mutation::Remove(v) => {
            list.remove(&(*v % 8));
        }
        Mutation::Clear => list.clear(),
        Mutation::Extend(values) => list.extend(values.iter().take(16).map(|v| v % 8)),
        Mutation::Retain(m) => {
            let m = *m % 8;
            list.retain(|v| *v != m);
        }
        Mutation::Reverse => list.reverse(),
        Mutation::Sort => list.sort(),
    }
}

// A shadow copy fed only by events must track the list exactly; a suspended
// batch raises at most one event.
fuzz_target!(|input: Input| {
    let initial: Vec<u8> = input.initial.iter().take(32).map(|v| v % 8).collect();
    let list = ObservableList::from_vec(initial.clone());
    let shadow = Rc::new(RefCell::new(initial));
    let raised = Rc::new(RefCell::new(0usize));

    let (s1, s2, r1, r2) = (
        Rc::clone(&shadow),
        Rc::clone(&shadow),
        Rc::clone(&raised),
        Rc::clone(&raised),
    );
    let watched = list.downgrade();
    let _changed = list.on_changed(move |change| {
        change.apply_to(&mut s1.borrow_mut());
        *r1.borrow_mut() += 1;
    });
    let _reordered = list.on_reordered(move || {
        if let Some(list) = watched.upgrade() {
            *s2.borrow_mut() = list.snapshot();
        }
        *r2.borrow_mut() += 1;
    });

    for (suspended, mutations) in input.batches.iter().take(16) {
        if *suspended {
            *raised.borrow_mut() = 0;
            list.suspend_events();
            for mutation in mutations.iter().take(32) {
                apply(&list, mutation);
            }
            assert_eq!(*raised.borrow(), 0, "suspended list raised an event");
            list.resume_events();
            assert!(*raised.borrow() <= 1, "resume raised more than one event");
        } else {
            for mutation in mutations.iter().take(32) {
                apply(&list, mutation);
            }
        }
        assert_eq!(*shadow.borrow(), list.snapshot());
    }
});
