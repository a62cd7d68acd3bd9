mod bank;
mod dex_hooks;
mod genesis;
mod keeper;
mod query;
mod state;
mod validator;

pub use {bank::*, dex_hooks::*, genesis::*, keeper::*, query::*, state::*, validator::*};

/// Version stamped into definitions issued by this implementation.
pub const CURRENT_TOKEN_VERSION: u32 = 1;
