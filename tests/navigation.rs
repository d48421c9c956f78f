use pipeline_inspector::trace::parse;
use pipeline_inspector::{NavState, NavigationError, Navigator};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn trace_text(cycles: usize, with_final: bool) -> String {
    let mut text = String::new();
    for n in 1..=cycles {
        text.push_str(&format!(
            "### START OF CYCLE {n}\nPC={}\n### END OF CYCLE {n}\n",
            n - 1
        ));
    }
    if with_final {
        text.push_str("Final CPU State:\nR1=5\n");
    }
    text
}

fn navigator(cycles: usize, with_final: bool) -> Navigator {
    Navigator::new(parse(&trace_text(cycles, with_final)))
}

#[test]
fn test_initial_state() {
    let nav = navigator(3, true);
    assert_eq!(nav.state(), NavState::Browsing(0));
    assert_eq!(nav.position(), Some(0));
    assert!(nav.current().starts_with("### START OF CYCLE 1"));

    let empty = Navigator::default();
    assert_eq!(empty.state(), NavState::Empty);
    assert_eq!(empty.current(), "");
    assert_eq!(empty.position(), None);
}

#[test]
fn test_scenario_cycle_then_final_then_clamp() {
    let mut nav = Navigator::new(parse(
        "### START OF CYCLE 1\nPC=0\n### END OF CYCLE 1\nFinal CPU State:\nR1=5\n",
    ));

    assert_eq!(nav.current(), "### START OF CYCLE 1\nPC=0\n### END OF CYCLE 1");
    assert!(nav.next());
    assert_eq!(nav.state(), NavState::ViewingFinal);
    assert_eq!(nav.current(), "Final CPU State:\nR1=5");
    assert!(!nav.next());
    assert_eq!(nav.state(), NavState::ViewingFinal);
}

#[test]
fn test_last_cycle_without_final_is_terminal() {
    let mut nav = navigator(2, false);
    assert!(nav.next());
    assert!(!nav.next());
    assert_eq!(nav.state(), NavState::Browsing(1));
    assert!(nav.at_end());
}

#[test]
fn test_previous_clamps_at_zero() {
    let mut nav = navigator(2, true);
    assert!(!nav.previous());
    assert_eq!(nav.state(), NavState::Browsing(0));
}

#[test]
fn test_previous_leaves_final_state() {
    let mut nav = navigator(2, true);
    nav.go_to(2).unwrap();
    assert_eq!(nav.state(), NavState::ViewingFinal);
    assert!(nav.previous());
    assert_eq!(nav.state(), NavState::Browsing(1));
}

#[test]
fn test_goto_out_of_range_does_not_move() {
    let mut nav = navigator(3, false);
    nav.go_to(1).unwrap();

    assert_eq!(
        nav.go_to(3),
        Err(NavigationError::OutOfRange { index: 3, limit: 3 })
    );
    assert_eq!(nav.state(), NavState::Browsing(1));

    let mut with_final = navigator(3, true);
    assert!(with_final.go_to(3).is_ok());
    assert_eq!(
        with_final.go_to(4),
        Err(NavigationError::OutOfRange { index: 4, limit: 4 })
    );
    assert_eq!(with_final.state(), NavState::ViewingFinal);
}

#[test]
fn test_next_label() {
    let mut nav = navigator(2, true);
    assert_eq!(nav.next_label(), "Next Cycle");
    nav.next();
    assert_eq!(nav.next_label(), "FINAL OUT");
    nav.next();
    assert_eq!(nav.next_label(), "FINAL OUT");
    nav.previous();
    nav.previous();
    assert_eq!(nav.next_label(), "Next Cycle");

    let no_final = navigator(1, false);
    assert_eq!(no_final.next_label(), "Next Cycle");
}

#[test]
fn test_final_state_without_cycles() {
    let mut nav = navigator(0, true);
    assert_eq!(nav.state(), NavState::Empty);
    assert_eq!(nav.current(), "");

    assert!(nav.next());
    assert_eq!(nav.state(), NavState::ViewingFinal);
    assert_eq!(nav.position(), Some(0));
    assert!(!nav.previous());

    let mut jump = navigator(0, true);
    assert!(jump.go_to(0).is_ok());
    assert_eq!(jump.current(), "Final CPU State:\nR1=5");
}

#[test]
fn test_empty_trace_rejects_everything() {
    let mut nav = navigator(0, false);
    assert!(!nav.next());
    assert!(!nav.previous());
    assert_eq!(
        nav.go_to(0),
        Err(NavigationError::OutOfRange { index: 0, limit: 0 })
    );
    assert!(nav.at_end());
}

#[test]
fn test_reset_starts_over() {
    let mut nav = navigator(3, true);
    nav.go_to(3).unwrap();
    nav.reset(parse(&trace_text(2, false)));
    assert_eq!(nav.state(), NavState::Browsing(0));
    assert_eq!(nav.cycle_count(), 2);
}

proptest! {
    #[test]
    fn prop_next_visits_every_position_once_and_previous_reverses(
        cycles in 0usize..12,
        with_final in any::<bool>(),
    ) {
        let mut nav = navigator(cycles, with_final);

        let mut forward = Vec::new();
        forward.extend(nav.position());
        while nav.next() {
            forward.extend(nav.position());
        }

        let mut expected: Vec<usize> = (0..cycles).collect();
        if with_final {
            expected.push(cycles);
        }
        prop_assert_eq!(&forward, &expected);

        // terminal state is sticky
        let end = nav.state();
        prop_assert!(!nav.next());
        prop_assert_eq!(nav.state(), end);

        let mut backward = Vec::new();
        backward.extend(nav.position());
        while nav.previous() {
            backward.extend(nav.position());
        }
        if cycles > 0 {
            let mut reversed = expected.clone();
            reversed.reverse();
            prop_assert_eq!(backward, reversed);
        }
    }
}
