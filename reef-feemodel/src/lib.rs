mod genesis;
mod keeper;
mod model;

pub use {genesis::*, keeper::*, model::*};
