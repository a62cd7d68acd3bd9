use {
    reef_std::{Addr, Denom, Item, Map, Set, Uint128},
    reef_types::ft::{Definition, DexSettings, Params, TokenMetadata},
};

pub const PARAMS: Item<Params> = Item::new("params");

// (account, denom) => bank balance
pub const BALANCES: Map<(&Addr, &Denom), Uint128> = Map::new("balance");

// denom => total supply
pub const SUPPLIES: Map<&Denom, Uint128> = Map::new("supply");

// (issuer, subunit) => definition
pub const DEFINITIONS: Map<(&Addr, &str), Definition> = Map::new("token");

// (issuer, normalized symbol); symbols are unique per issuer
pub const SYMBOLS: Set<(&Addr, &str)> = Set::new("symbol");

// denom => display metadata
pub const METADATA: Map<&Denom, TokenMetadata> = Map::new("metadata");

// denom => DEX settings set at issuance
pub const DEX_SETTINGS: Map<&Denom, DexSettings> = Map::new("dex_settings");

// (account, denom) => frozen amount; may exceed the bank balance
pub const FROZEN: Map<(&Addr, &Denom), Uint128> = Map::new("frozen");

// (account, denom) => whitelisted receive cap
pub const WHITELISTED: Map<(&Addr, &Denom), Uint128> = Map::new("whitelisted");

pub const GLOBAL_FREEZE: Set<&Denom> = Set::new("global_freeze");

// (account, denom) => balance committed to open DEX orders
pub const DEX_LOCKED: Map<(&Addr, &Denom), Uint128> = Map::new("dex_locked");

// (account, denom) => max amount receivable from open DEX orders
pub const DEX_EXPECTED: Map<(&Addr, &Denom), Uint128> = Map::new("dex_expected");

// (account, denom) => balance locked by vesting (maintained by the bank's
// vesting layer; an input here)
pub const VESTING_LOCKED: Map<(&Addr, &Denom), Uint128> = Map::new("vesting_locked");

// accounts known to be smart contracts
pub const CONTRACT_ACCOUNTS: Set<&Addr> = Set::new("contract_account");

/// The FT module's own account; burns pass through it.
pub fn ft_module_account() -> Addr {
    Addr::module("ft")
}

/// The DEX module's account; order reserves are held here.
pub fn dex_module_account() -> Addr {
    Addr::module("dex")
}

/// Accounts that clawback must never touch.
pub fn module_accounts() -> [Addr; 2] {
    [ft_module_account(), dex_module_account()]
}
