//! Excavate Tiers - Rarity tiers and their countdown rules
//!
//! Each tier unlocks on its own schedule relative to the slot counter:
//! a fixed value, the next multiple of 2^k slots, the epoch boundary, or
//! an undisclosed rule.

pub mod tier;
pub mod countdown;

pub use tier::*;
pub use countdown::*;
