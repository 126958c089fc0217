//! Waste categories and the label table.
//!
//! The category set is closed at compile time: internally the firmware only
//! ever handles the `Category` enum, and the label string coming back from
//! the classifier is parsed exactly once at the network boundary
//! ([`Category::from_label`]).  This makes an unmatched-label bug a routing
//! failure at the edge instead of a silent misdirection deep in the core.
//!
//! Enum order defines the physical bin layout: variant `k` sits at carousel
//! slot `k`.  The order must stay in lockstep with the label vocabulary the
//! remote model was trained on.

use crate::routing::BinIndex;

/// One waste category = one carousel bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Category {
    Plastic = 0,
    Paper = 1,
    Organic = 2,
    Metal = 3,
    Glass = 4,
}

impl Category {
    /// Number of categories — also the number of carousel bins.
    pub const COUNT: u8 = 5;

    /// All categories in bin order.
    pub const ALL: [Self; Self::COUNT as usize] = [
        Self::Plastic,
        Self::Paper,
        Self::Organic,
        Self::Metal,
        Self::Glass,
    ];

    /// The bin this category is sorted into.
    pub const fn bin(self) -> BinIndex {
        self as BinIndex
    }

    /// The label string the remote classifier uses for this category.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Plastic => "plastic",
            Self::Paper => "paper",
            Self::Organic => "organic",
            Self::Metal => "metal",
            Self::Glass => "glass",
        }
    }

    /// Case-sensitive, exact-match label lookup.  `None` means the label is
    /// not in the vocabulary and the cycle must abort with `UnknownLabel`.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.label() == label)
    }

    /// Lookup by class index.  Some deployments of the classifier return the
    /// raw argmax index instead of the label string; the index order matches
    /// the label vocabulary above.
    pub fn from_index(idx: u8) -> Option<Self> {
        Self::ALL.get(idx as usize).copied()
    }
}
