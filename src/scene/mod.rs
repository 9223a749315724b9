//! Scene state: the triangle store and the render configuration it is
//! created from.

mod config;
mod store;

pub use config::*;
pub use store::*;
