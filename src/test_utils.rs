//! Shared test utilities and arbitrary generators for property-based testing.

use std::ops::Range;

use crate::types::{OverrideMap, Platform, PriorityLabel, Train, TrainId};
use proptest::prelude::*;

const LINES: &[&str] = &["Main", "Loop", "Relief", "Up Fast", "Down Slow"];

pub fn arb_priority_label() -> impl Strategy<Value = PriorityLabel> {
    prop_oneof![Just(PriorityLabel::High), Just(PriorityLabel::Low)]
}

/// Trains with unique identifiers `T0`, `T1`, ...
///
/// Priorities are mostly small signed values, so ties on the ranking keys
/// are common, with the `i64` extremes mixed in.
pub fn arb_trains(len: Range<usize>) -> impl Strategy<Value = Vec<Train>> {
    prop::collection::vec(
        (
            prop_oneof![
                8 => -50i64..50,
                1 => Just(i64::MIN),
                1 => Just(i64::MAX),
            ],
            0u64..600,
            prop_oneof![Just(0.0f64), Just(2.5), 0.0f64..30.0],
            prop::option::of(1u32..6),
            prop::option::of("[A-Z][a-z]{2,10}( Express)?"),
        ),
        len,
    )
    .prop_map(|fields| {
        fields
            .into_iter()
            .enumerate()
            .map(|(i, (priority, delay, clearance, platform_no, name))| Train {
                id: TrainId::new(format!("T{i}")),
                name,
                priority,
                delay,
                clearance_time: clearance,
                platform_no,
            })
            .collect()
    })
}

/// Platforms with unique identifiers. Most are numbered (`P1`, `P2`, ...);
/// some are unnumbered sidings, which sort last in display order.
pub fn arb_platforms(len: Range<usize>) -> impl Strategy<Value = Vec<Platform>> {
    prop::collection::vec(
        (prop::bool::weighted(0.8), 0..LINES.len(), any::<bool>()),
        len,
    )
    .prop_map(|fields| {
        fields
            .into_iter()
            .enumerate()
            .map(|(i, (numbered, line, available))| {
                let id = if numbered {
                    format!("P{}", i + 1)
                } else {
                    format!("Siding {}", char::from(b'A' + (i % 26) as u8))
                };
                Platform::new(id, LINES[line], available)
            })
            .collect()
    })
}

pub fn arb_override_map() -> impl Strategy<Value = OverrideMap> {
    prop::collection::btree_map("[A-Z0-9]{1,8}", arb_priority_label(), 0..12).prop_map(|m| {
        m.into_iter()
            .map(|(id, label)| (TrainId::new(id), label))
            .collect()
    })
}

/// Overrides for a random subset of `ids`.
pub fn arb_override_map_for(ids: Vec<TrainId>) -> impl Strategy<Value = OverrideMap> {
    let len = ids.len();
    prop::collection::vec(prop::option::of(arb_priority_label()), len).prop_map(move |labels| {
        ids.iter()
            .cloned()
            .zip(labels)
            .filter_map(|(id, label)| label.map(|l| (id, l)))
            .collect()
    })
}
