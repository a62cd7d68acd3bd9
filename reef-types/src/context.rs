use {
    crate::Event,
    reef_std::{Storage, Timestamp},
};

/// Why the current transfer is happening, from the IBC plumbing's point of
/// view. Attached to the execution context rather than kept in any global,
/// so the transfer validator can branch on it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TransferPurpose {
    #[default]
    None,
    /// Tokens leaving the chain; the escrow account is the receiver.
    IbcOut,
    /// Tokens coming back to the chain; the escrow account is the sender.
    IbcIn,
    /// A rejected transfer being refunded after the peer chain acknowledged.
    Ack,
    /// A transfer being refunded after an IBC timeout.
    Timeout,
}

impl TransferPurpose {
    /// Refund legs must never fail, or the funds are stuck on escrow forever.
    pub fn is_refund(self) -> bool {
        matches!(self, Self::Ack | Self::Timeout)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    pub height: u64,
    pub timestamp: Timestamp,
}

/// Everything a message handler gets from the host: the (staged) store, the
/// current block, and the flags that in the source chain lived in
/// thread-local-ish context wrappers.
pub struct Context<'a> {
    pub storage: &'a mut dyn Storage,
    pub block: BlockInfo,
    pub purpose: TransferPurpose,
    /// The current message execution was initiated by a smart contract.
    pub triggered_by_contract: bool,
    /// System paths (begin/end block) run with gas metering disabled.
    pub infinite_gas: bool,
    pub events: Vec<Event>,
}

impl<'a> Context<'a> {
    pub fn new(storage: &'a mut dyn Storage, block: BlockInfo) -> Self {
        Self {
            storage,
            block,
            purpose: TransferPurpose::None,
            triggered_by_contract: false,
            infinite_gas: false,
            events: Vec::new(),
        }
    }

    pub fn with_purpose(mut self, purpose: TransferPurpose) -> Self {
        self.purpose = purpose;
        self
    }

    pub fn emit<E: Into<Event>>(&mut self, event: E) {
        self.events.push(event.into());
    }
}
