mod cron;
mod execute;
mod genesis;
mod params;
mod query;
mod state;

pub use {cron::*, execute::*, genesis::*, params::*, query::*, state::*};
