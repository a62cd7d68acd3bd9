use {
    crate::{Error, Result},
    borsh::{BorshDeserialize, BorshSerialize},
    reef_std::{Addr, Coin, Coins, Denom, Udec128, Uint128},
    serde::{Deserialize, Serialize},
    std::collections::BTreeSet,
};

/// Hard bound on every mint and issue amount, leaving headroom for the
/// total supply of a denom to stay within `Uint128` under any burn or
/// commission schedule.
pub const MAX_MINTABLE_AMOUNT: Uint128 = Uint128::new(1_u128 << 120);

pub const MAX_PRECISION: u32 = 18;
pub const MAX_SYMBOL_LENGTH: usize = 128;
pub const MAX_DESCRIPTION_LENGTH: usize = 200;
pub const MAX_URI_LENGTH: usize = 256;

/// Per-denom behaviors that can be switched on at issuance.
#[derive(
    Serialize, Deserialize, BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq,
    PartialOrd, Ord,
)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Minting,
    Burning,
    Freezing,
    Whitelisting,
    Ibc,
    BlockSmartContracts,
    Clawback,
    Extension,
}

impl Feature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Minting => "minting",
            Feature::Burning => "burning",
            Feature::Freezing => "freezing",
            Feature::Whitelisting => "whitelisting",
            Feature::Ibc => "ibc",
            Feature::BlockSmartContracts => "block_smart_contracts",
            Feature::Clawback => "clawback",
            Feature::Extension => "extension",
        }
    }
}

/// The stored definition of a fungible token.
#[derive(
    Serialize, Deserialize, BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq,
)]
pub struct Definition {
    pub denom: Denom,
    pub issuer: Addr,
    /// `None` means administration has been irrevocably given up.
    pub admin: Option<Addr>,
    pub features: BTreeSet<Feature>,
    pub burn_rate: Udec128,
    pub send_commission_rate: Udec128,
    pub version: u32,
    pub uri: String,
    pub uri_hash: String,
    /// The extension contract instantiated at issuance, if the extension
    /// feature is enabled.
    pub extension_addr: Option<Addr>,
}

impl Definition {
    pub fn is_admin(&self, actor: &Addr) -> bool {
        self.admin.as_ref() == Some(actor)
    }

    /// Admin privileges exist only while an admin is set, and only for that
    /// exact account.
    pub fn has_admin_privileges(&self, actor: &Addr) -> bool {
        self.is_admin(actor)
    }

    pub fn is_feature_enabled(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    /// Whether `actor` may perform the operation gated by `feature`.
    ///
    /// Burning is special: the admin may always burn their own tokens, and
    /// any holder may burn once the feature is enabled. Everything else is
    /// admin-only.
    pub fn check_feature_allowed(&self, actor: &Addr, feature: Feature) -> Result<()> {
        if feature == Feature::Burning && self.is_admin(actor) {
            return Ok(());
        }

        if !self.is_feature_enabled(feature) {
            return Err(Error::FeatureDisabled {
                denom: self.denom.to_string(),
                feature: feature.as_str(),
            });
        }

        if feature == Feature::Burning {
            return Ok(());
        }

        if !self.is_admin(actor) {
            return Err(Error::unauthorized(format!(
                "only the admin may use the {} feature of {}",
                feature.as_str(),
                self.denom,
            )));
        }

        Ok(())
    }
}

/// Parameters for order placement against a denom, set by its issuer.
#[derive(
    Serialize, Deserialize, BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq,
)]
pub struct DexSettings {
    /// Roughly the amount of subunits equal to one unit of account; the DEX
    /// derives a pair's price tick and quantity step from it.
    pub unified_ref_amount: Uint128,
}

/// Settings for instantiating the extension contract at issuance.
#[derive(
    Serialize, Deserialize, BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq,
)]
pub struct ExtensionSettings {
    pub code_id: u64,
    pub label: String,
    pub funds: Coins,
    /// Raw JSON passed to the extension contract's instantiate entry point.
    pub issuance_msg: String,
}

/// Everything a user supplies when issuing a new token.
#[derive(
    Serialize, Deserialize, BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq,
)]
pub struct IssueSettings {
    pub symbol: String,
    pub subunit: String,
    pub precision: u32,
    pub initial_amount: Uint128,
    pub description: String,
    pub features: Vec<Feature>,
    pub burn_rate: Udec128,
    pub send_commission_rate: Udec128,
    pub uri: String,
    pub uri_hash: String,
    pub extension_settings: Option<ExtensionSettings>,
    pub dex_settings: Option<DexSettings>,
}

/// ASCII, starts with a letter, limited charset and length.
pub fn validate_symbol(symbol: &str) -> Result<()> {
    if symbol.is_empty() || symbol.len() > MAX_SYMBOL_LENGTH {
        return Err(Error::invalid_input(format!(
            "symbol length must be within [1, {MAX_SYMBOL_LENGTH}]"
        )));
    }
    let mut chars = symbol.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return Err(Error::invalid_input("symbol must start with a letter"));
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '$' | '.' | '-')) {
        return Err(Error::invalid_input(format!("invalid symbol `{symbol}`")));
    }
    Ok(())
}

/// Symbols collide case-insensitively per issuer; this is the dedup key.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.to_ascii_lowercase()
}

pub fn validate_precision(precision: u32) -> Result<()> {
    if precision > MAX_PRECISION {
        return Err(Error::invalid_input(format!(
            "precision must be within [0, {MAX_PRECISION}]"
        )));
    }
    Ok(())
}

pub fn validate_rate(name: &str, rate: Udec128) -> Result<()> {
    if rate > Udec128::ONE {
        return Err(Error::invalid_input(format!(
            "{name} must be within [0, 1]"
        )));
    }
    Ok(())
}

pub fn validate_features(features: &[Feature]) -> Result<BTreeSet<Feature>> {
    let set: BTreeSet<Feature> = features.iter().copied().collect();
    if set.len() != features.len() {
        return Err(Error::invalid_input("duplicate features"));
    }
    Ok(set)
}

/// Module parameters. The issue fee is burned, so issuing has a real cost.
#[derive(
    Serialize, Deserialize, BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq,
)]
pub struct Params {
    pub issue_fee: Coin,
}

/// The full public view of a token: definition plus metadata.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub denom: Denom,
    pub issuer: Addr,
    pub admin: Option<Addr>,
    pub symbol: String,
    pub subunit: String,
    pub precision: u32,
    pub description: String,
    pub features: BTreeSet<Feature>,
    pub burn_rate: Udec128,
    pub send_commission_rate: Udec128,
    pub globally_frozen: bool,
    pub version: u32,
    pub uri: String,
    pub uri_hash: String,
    pub extension_addr: Option<Addr>,
    pub dex_settings: Option<DexSettings>,
}

/// Stored metadata that is not part of the definition proper.
#[derive(
    Serialize, Deserialize, BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq,
)]
pub struct TokenMetadata {
    pub symbol: String,
    pub precision: u32,
    pub description: String,
}

/// Response of the compound balance query.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BalanceResponse {
    pub balance: Uint128,
    pub whitelisted: Uint128,
    pub frozen: Uint128,
    /// Total not spendable: frozen plus locked, capped at the balance.
    pub locked: Uint128,
    pub locked_in_vesting: Uint128,
    pub locked_in_dex: Uint128,
    pub expected_to_receive_in_dex: Uint128,
}

/// FT module messages, routed by sender.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Msg {
    Issue(IssueSettings),
    Mint { coin: Coin, recipient: Option<Addr> },
    Burn { coin: Coin },
    Freeze { account: Addr, coin: Coin },
    Unfreeze { account: Addr, coin: Coin },
    SetFrozen { account: Addr, coin: Coin },
    GloballyFreeze { denom: Denom },
    GloballyUnfreeze { denom: Denom },
    SetWhitelisted { account: Addr, coin: Coin },
    Clawback { account: Addr, coin: Coin },
    TransferAdmin { denom: Denom, new_admin: Addr },
    ClearAdmin { denom: Denom },
    Send { recipient: Addr, coin: Coin },
    UpdateParams { params: Params },
}

// ---------------------------------- events -----------------------------------

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EventIssued {
    pub denom: Denom,
    pub issuer: Addr,
    pub symbol: String,
    pub subunit: String,
    pub precision: u32,
    pub description: String,
    pub initial_amount: Uint128,
    pub features: BTreeSet<Feature>,
    pub burn_rate: Udec128,
    pub send_commission_rate: Udec128,
    pub uri: String,
    pub uri_hash: String,
    pub admin: Option<Addr>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EventFrozenAmountChanged {
    pub account: Addr,
    pub denom: Denom,
    pub previous_amount: Uint128,
    pub current_amount: Uint128,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EventWhitelistedAmountChanged {
    pub account: Addr,
    pub denom: Denom,
    pub previous_amount: Uint128,
    pub current_amount: Uint128,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EventAmountClawedBack {
    pub account: Addr,
    pub denom: Denom,
    pub amount: Uint128,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EventAdminTransferred {
    pub denom: Denom,
    pub previous_admin: Addr,
    pub current_admin: Addr,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EventAdminCleared {
    pub denom: Denom,
    pub previous_admin: Addr,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EventGloballyFrozen {
    pub denom: Denom,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EventGloballyUnfrozen {
    pub denom: Denom,
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, std::str::FromStr, test_case::test_case};

    fn definition(admin: Option<Addr>, features: &[Feature]) -> Definition {
        Definition {
            denom: Denom::from_str("ureef").unwrap(),
            issuer: Addr::mock(1),
            admin,
            features: features.iter().copied().collect(),
            burn_rate: Udec128::ZERO,
            send_commission_rate: Udec128::ZERO,
            version: 1,
            uri: String::new(),
            uri_hash: String::new(),
            extension_addr: None,
        }
    }

    #[test]
    fn admin_privileges_require_admin_set() {
        let actor = Addr::mock(1);

        let def = definition(Some(actor), &[]);
        assert!(def.has_admin_privileges(&actor));
        assert!(!def.has_admin_privileges(&Addr::mock(2)));

        let def = definition(None, &[]);
        assert!(!def.has_admin_privileges(&actor));
    }

    #[test]
    fn feature_gating() {
        let admin = Addr::mock(1);
        let other = Addr::mock(2);
        let def = definition(Some(admin), &[Feature::Minting, Feature::Burning]);

        // Minting is admin-only.
        assert!(def.check_feature_allowed(&admin, Feature::Minting).is_ok());
        assert!(matches!(
            def.check_feature_allowed(&other, Feature::Minting),
            Err(Error::Unauthorized(_))
        ));

        // Any holder may burn when the feature is enabled.
        assert!(def.check_feature_allowed(&other, Feature::Burning).is_ok());

        // Disabled features fail regardless of actor.
        assert!(matches!(
            def.check_feature_allowed(&admin, Feature::Freezing),
            Err(Error::FeatureDisabled { .. })
        ));
    }

    #[test]
    fn admin_may_always_burn() {
        let admin = Addr::mock(1);
        let def = definition(Some(admin), &[]);
        assert!(def.check_feature_allowed(&admin, Feature::Burning).is_ok());
        assert!(matches!(
            def.check_feature_allowed(&Addr::mock(2), Feature::Burning),
            Err(Error::FeatureDisabled { .. })
        ));
    }

    #[test_case("CORAL", true; "uppercase")]
    #[test_case("Coral.2", true; "mixed with dot")]
    #[test_case("", false; "empty")]
    #[test_case("2COR", false; "leading digit")]
    #[test_case("COR AL", false; "space")]
    fn symbol_validation(symbol: &str, ok: bool) {
        assert_eq!(validate_symbol(symbol).is_ok(), ok);
    }

    #[test]
    fn duplicate_features_rejected() {
        assert!(validate_features(&[Feature::Minting, Feature::Minting]).is_err());
        assert!(validate_features(&[Feature::Minting, Feature::Burning]).is_ok());
    }
}
