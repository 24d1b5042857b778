//! Built-in statement layouts.

mod bri;

pub use bri::bri;

use crate::layout::Layout;

/// Every layout shipped with the crate, in detection order.
pub fn builtin() -> Vec<Layout> {
    vec![bri()]
}
