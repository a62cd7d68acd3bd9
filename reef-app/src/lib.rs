mod app;
mod genesis;
mod router;

pub use {app::*, genesis::*, router::*};
