//! Bin routing: label → bin lookup and circular shortest-path planning.
//!
//! The carousel is a ring of `Category::COUNT` bins.  Moving from bin
//! `current` to bin `target` can go either way around; `plan_move` picks the
//! arc with the smaller absolute step count.
//!
//! ```text
//!        0
//!     4     1        current=0, target=3:
//!                    raw delta +3, but |-2| < |+3|
//!      3   2         → rotate -2 (counter-clockwise)
//! ```

use crate::category::Category;

/// Index of a physical carousel slot, always in `[0, Category::COUNT)`.
pub type BinIndex = u8;

/// The bin an already-validated category is routed to.
///
/// Total and deterministic: every `Category` maps to exactly one in-range
/// index, every time.
pub const fn route_to(category: Category) -> BinIndex {
    category.bin()
}

/// Signed step count for the shortest rotation from `current` to `target`
/// on a ring of `total` bins.
///
/// Positive = clockwise (ascending indices), negative = counter-clockwise.
/// When the two arcs are exactly equal (`|delta| == total / 2` with `total`
/// even) the positive raw delta wraps and the negative one stays, so an
/// exact tie always rotates counter-clockwise; both arcs are the same
/// length, so neither choice is wrong.
pub fn plan_move(current: BinIndex, target: BinIndex, total: u8) -> i16 {
    debug_assert!(total > 0);
    debug_assert!(current < total && target < total);

    let total = i16::from(total);
    let mut delta = i16::from(target) - i16::from(current);

    // Doubling sidesteps the truncation of `total / 2` on odd rings.
    if delta * 2 >= total {
        delta -= total;
    } else if delta * 2 < -total {
        delta += total;
    }
    delta
}
