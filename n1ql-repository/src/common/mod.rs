//! Common value types, conversions and small shared utilities.

mod convertible;
mod sort_order;
mod type_utils;
mod value;

pub use convertible::*;
pub use sort_order::*;
pub use type_utils::*;
pub use value::*;
