use {
    reef_std::Addr,
    reef_types::{dex, feemodel, ft, Context, Error, Result},
    serde::{Deserialize, Serialize},
};

/// Every message the core handles. The host delivers a typed variant; the
/// router maps it to its handler; no reflection, no dynamic registration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Msg {
    Ft(ft::Msg),
    Dex(dex::Msg),
    Feemodel(feemodel::Msg),
}

/// The account allowed to change module parameters. Stands in for the
/// governance module, which is outside the core.
pub fn governance_account() -> Addr {
    Addr::module("gov")
}

fn ensure_governance(sender: &Addr) -> Result<()> {
    if *sender != governance_account() {
        return Err(Error::unauthorized(format!(
            "invalid authority; expected {}, got {sender}",
            governance_account(),
        )));
    }
    Ok(())
}

pub fn route(ctx: &mut Context, sender: Addr, msg: Msg) -> Result<()> {
    match msg {
        Msg::Ft(msg) => route_ft(ctx, sender, msg),
        Msg::Dex(msg) => route_dex(ctx, sender, msg),
        Msg::Feemodel(msg) => route_feemodel(ctx, sender, msg),
    }
}

fn route_ft(ctx: &mut Context, sender: Addr, msg: ft::Msg) -> Result<()> {
    match msg {
        ft::Msg::Issue(settings) => reef_ft::issue(ctx, sender, settings).map(|_| ()),
        ft::Msg::Mint { coin, recipient } => reef_ft::mint(ctx, sender, recipient, coin),
        ft::Msg::Burn { coin } => reef_ft::burn(ctx, sender, coin),
        ft::Msg::Freeze { account, coin } => reef_ft::freeze(ctx, sender, account, coin),
        ft::Msg::Unfreeze { account, coin } => reef_ft::unfreeze(ctx, sender, account, coin),
        ft::Msg::SetFrozen { account, coin } => reef_ft::set_frozen(ctx, sender, account, coin),
        ft::Msg::GloballyFreeze { denom } => reef_ft::globally_freeze(ctx, sender, denom),
        ft::Msg::GloballyUnfreeze { denom } => reef_ft::globally_unfreeze(ctx, sender, denom),
        ft::Msg::SetWhitelisted { account, coin } => {
            reef_ft::set_whitelisted(ctx, sender, account, coin)
        },
        ft::Msg::Clawback { account, coin } => reef_ft::clawback(ctx, sender, account, coin),
        ft::Msg::TransferAdmin { denom, new_admin } => {
            reef_ft::transfer_admin(ctx, sender, new_admin, denom)
        },
        ft::Msg::ClearAdmin { denom } => reef_ft::clear_admin(ctx, sender, denom),
        ft::Msg::Send { recipient, coin } => reef_ft::transfer(ctx, &sender, &recipient, &coin),
        ft::Msg::UpdateParams { params } => {
            ensure_governance(&sender)?;
            reef_ft::set_params(ctx.storage, &params)
        },
    }
}

fn route_dex(ctx: &mut Context, sender: Addr, msg: dex::Msg) -> Result<()> {
    match msg {
        dex::Msg::PlaceOrder(request) => reef_dex::place_order(ctx, sender, request).map(|_| ()),
        dex::Msg::CancelOrder { id } => reef_dex::cancel_order(ctx, sender, &id),
        dex::Msg::CancelOrderBySequence { sequence } => {
            reef_dex::cancel_order_by_sequence(ctx, sender, sequence)
        },
        dex::Msg::UpdateParams { params } => {
            ensure_governance(&sender)?;
            reef_dex::set_params(ctx.storage, &params)
        },
    }
}

fn route_feemodel(ctx: &mut Context, sender: Addr, msg: feemodel::Msg) -> Result<()> {
    match msg {
        feemodel::Msg::UpdateParams { params } => {
            ensure_governance(&sender)?;
            reef_feemodel::set_params(ctx.storage, &params)
        },
    }
}
