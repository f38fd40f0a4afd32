use proptest::prelude::*;

#[allow(unused_macros)]
macro_rules! assert_eq_all {
    ( $x:expr, $( $y:expr ),+ $(,)? ) => {{
        let x = $x;
        $( assert_eq!(x, $y); )+
    }};
}

#[allow(dead_code)]
pub(super) fn assert_eq_iters<I: Iterator, J: Iterator<Item = I::Item>>(
    mut i: I,
    mut j: J,
) where
    I::Item: std::fmt::Debug + Eq, // same inferred for J::Item
{
    loop {
        match (i.next(), j.next()) {
            (None, None) => return,
            (a, b) => assert_eq!(a, b),
        }
    }
}

pub(super) type U16Pairs = Vec<(u16, u16)>;

pub(super) fn u16_pairs(
    keys: std::ops::Range<u16>,
    len: std::ops::Range<usize>,
) -> impl Strategy<Value = U16Pairs> {
    prop::collection::vec((keys, 0u16..1024u16), len)
}

pub(super) fn small_int_pairs() -> impl Strategy<Value = U16Pairs> {
    u16_pairs(0..1024, 0..512)
}

#[allow(dead_code)]
pub(super) fn tiny_int_pairs() -> impl Strategy<Value = U16Pairs> {
    u16_pairs(0..64, 0..48)
}

#[allow(dead_code)]
pub(super) fn string_u16_pairs() -> impl Strategy<Value = Vec<(String, u16)>> {
    prop::collection::vec(("[a-z]{0,2}", 0u16..1024u16), 0..512)
}

/// A closed key range `[low, high]`.  About one in eight is inverted.
pub(super) fn closed_range_1k() -> impl Strategy<Value = (u16, u16)> {
    (0u16..1024, 0u16..1024, 0u8..8).prop_map(|(a, b, flip)| {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        if flip == 0 {
            (hi, lo)
        } else {
            (lo, hi)
        }
    })
}

/// One step of a mixed workload.
#[derive(Clone, Debug)]
pub(super) enum Op {
    Insert(u16, u16),
    Delete(u16),
    Search(u16),
}

pub(super) fn ops(keys: u16, len: usize) -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        3 => (0..keys, 0u16..1024).prop_map(|(k, v)| Op::Insert(k, v)),
        2 => (0..keys).prop_map(Op::Delete),
        1 => (0..keys).prop_map(Op::Search),
    ];
    prop::collection::vec(op, 0..len)
}
