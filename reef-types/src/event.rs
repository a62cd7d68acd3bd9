use {
    crate::{dex, ft},
    serde::{Deserialize, Serialize},
};

/// Every event the core emits, in emission order. Byte-identical event
/// streams are part of the determinism contract.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    Issued(ft::EventIssued),
    FrozenAmountChanged(ft::EventFrozenAmountChanged),
    WhitelistedAmountChanged(ft::EventWhitelistedAmountChanged),
    AmountClawedBack(ft::EventAmountClawedBack),
    AdminTransferred(ft::EventAdminTransferred),
    AdminCleared(ft::EventAdminCleared),
    GloballyFrozen(ft::EventGloballyFrozen),
    GloballyUnfrozen(ft::EventGloballyUnfrozen),
    OrderBookCreated(dex::OrderBookCreated),
    OrderPlaced(dex::OrderPlaced),
    OrderFilled(dex::OrderFilled),
    OrderClosed(dex::OrderClosed),
    OrderCancelled(dex::OrderCancelled),
}

macro_rules! impl_from_event {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Event {
                fn from(event: $ty) -> Self {
                    Event::$variant(event)
                }
            }
        )*
    };
}

impl_from_event! {
    Issued => ft::EventIssued,
    FrozenAmountChanged => ft::EventFrozenAmountChanged,
    WhitelistedAmountChanged => ft::EventWhitelistedAmountChanged,
    AmountClawedBack => ft::EventAmountClawedBack,
    AdminTransferred => ft::EventAdminTransferred,
    AdminCleared => ft::EventAdminCleared,
    GloballyFrozen => ft::EventGloballyFrozen,
    GloballyUnfrozen => ft::EventGloballyUnfrozen,
    OrderBookCreated => dex::OrderBookCreated,
    OrderPlaced => dex::OrderPlaced,
    OrderFilled => dex::OrderFilled,
    OrderClosed => dex::OrderClosed,
    OrderCancelled => dex::OrderCancelled,
}
