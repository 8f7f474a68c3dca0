//! Global dispatch ordering of waiting trains.

use std::cmp::Ordering;

use crate::types::Train;

/// Compares two trains by dispatch urgency.
///
/// Key: priority ascending, then delay descending (the longer-delayed train
/// goes first), then clearance time ascending.
pub fn dispatch_cmp(a: &Train, b: &Train) -> Ordering {
    a.priority
        .cmp(&b.priority)
        .then_with(|| b.delay.cmp(&a.delay))
        .then_with(|| a.clearance_time.total_cmp(&b.clearance_time))
}

/// Returns the trains in dispatch order.
///
/// The sort is stable: trains with identical keys keep their input order.
pub fn rank(trains: &[Train]) -> Vec<&Train> {
    let mut ranked: Vec<&Train> = trains.iter().collect();
    ranked.sort_by(|a, b| dispatch_cmp(a, b));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::arb_trains;
    use proptest::prelude::*;

    fn ids(trains: &[&Train]) -> Vec<String> {
        trains.iter().map(|t| t.id.to_string()).collect()
    }

    #[test]
    fn priority_dominates() {
        let trains = vec![
            Train::new("slow", 3, 900, 0.0),
            Train::new("urgent", 1, 0, 9.0),
        ];
        assert_eq!(ids(&rank(&trains)), ["urgent", "slow"]);
    }

    #[test]
    fn longer_delay_first_within_priority() {
        let trains = vec![
            Train::new("a", 2, 60, 1.0),
            Train::new("b", 2, 300, 1.0),
            Train::new("c", 2, 120, 1.0),
        ];
        assert_eq!(ids(&rank(&trains)), ["b", "c", "a"]);
    }

    #[test]
    fn shorter_clearance_breaks_remaining_ties() {
        let trains = vec![
            Train::new("a", 2, 60, 5.5),
            Train::new("b", 2, 60, 0.5),
        ];
        assert_eq!(ids(&rank(&trains)), ["b", "a"]);
    }

    #[test]
    fn identical_keys_keep_input_order() {
        let trains = vec![
            Train::new("first", 1, 10, 2.0),
            Train::new("second", 1, 10, 2.0),
            Train::new("third", 1, 10, 2.0),
        ];
        assert_eq!(ids(&rank(&trains)), ["first", "second", "third"]);
    }

    #[test]
    fn empty_input_ranks_to_empty() {
        assert!(rank(&[]).is_empty());
    }

    proptest! {
        #[test]
        fn output_is_sorted_permutation(trains in arb_trains(0..30)) {
            let ranked = rank(&trains);
            prop_assert_eq!(ranked.len(), trains.len());
            for pair in ranked.windows(2) {
                prop_assert_ne!(dispatch_cmp(pair[0], pair[1]), Ordering::Greater);
            }
        }

        #[test]
        fn equal_keys_preserve_relative_order(trains in arb_trains(0..30)) {
            let ranked = rank(&trains);
            let position = |t: &Train| trains.iter().position(|x| x.id == t.id).unwrap();
            for pair in ranked.windows(2) {
                if dispatch_cmp(pair[0], pair[1]) == Ordering::Equal {
                    prop_assert!(position(pair[0]) < position(pair[1]));
                }
            }
        }
    }
}
