mod context;
mod error;
mod event;
mod price;

pub mod dex;
pub mod feemodel;
pub mod ft;

pub use {context::*, error::*, event::*, price::*};
