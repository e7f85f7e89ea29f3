//! Pairing schemes: partitions of the 64 grid indices into 32 ordered pairs.
//!
//! Schemes are derived from a handful of base traversal orders, each expanded
//! with rotation and neighbor-swap variants. Variants that reproduce an
//! already-seen pair set for the same base order are dropped.

pub mod order;
pub mod scheme;

pub use order::{BASE_ORDERS, GRAY_SEQUENCE, TraversalOrder, base_orders};
pub use scheme::{PairingScheme, ROTATION_OFFSETS, build_pairing_schemes, pair_consecutive};
