//! Product catalog types.

mod inventory;
mod product;
mod source;

pub use inventory::*;
pub use product::*;
pub use source::*;
pub(crate) use product::{first_text, stock_count, text};
