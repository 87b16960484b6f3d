//! Shopping cart types.

#[allow(clippy::module_inception)]
mod cart;
mod line_item;
mod observer;
#[cfg(feature = "storage")]
mod store;

pub use cart::*;
pub use line_item::*;
pub use observer::{CartObserver, Subscription};
#[cfg(feature = "storage")]
pub use store::*;
