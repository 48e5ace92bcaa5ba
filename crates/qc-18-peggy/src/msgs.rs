//! Transaction messages
//!
//! The closed set of five operations the module accepts. Each message is
//! checked statelessly by `validate_basic` before any state is touched.

use crate::domain::{parse_destination, validate_amount_and_fee, EthereumEvent};
use crate::error::{PeggyError, PeggyResult};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use shared_crypto::EthSignature;
use shared_types::{validate_denom, AccAddress, Coin, EthAddress, Hash, ValAddress};

/// Delegate an orchestrator account and external signing address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgDelegateOrchestrator {
    pub validator: ValAddress,
    pub orchestrator: AccAddress,
    pub eth_address: EthAddress,
    /// Custody proof by `eth_address` over the binding message.
    pub eth_signature: EthSignature,
}

impl MsgDelegateOrchestrator {
    pub fn validate_basic(&self) -> PeggyResult<()> {
        if self.eth_address.is_zero() {
            return Err(PeggyError::InvalidProof {
                validator: self.validator.to_string(),
                reason: "zero external address".into(),
            });
        }
        if !self.eth_signature.is_low_s() {
            return Err(PeggyError::InvalidSignature(shared_crypto::CryptoError::MalleableSignature));
        }
        Ok(())
    }
}

/// Report an external-chain event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgSubmitClaim {
    pub orchestrator: AccAddress,
    pub event: EthereumEvent,
}

impl MsgSubmitClaim {
    pub fn validate_basic(&self) -> PeggyResult<()> {
        self.event.validate_basic()
    }
}

/// Queue a transfer to the external chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgSendToExternal {
    pub sender: AccAddress,
    /// `0x`-prefixed external destination.
    pub eth_dest: String,
    pub amount: Coin,
    pub bridge_fee: Coin,
}

impl MsgSendToExternal {
    pub fn validate_basic(&self) -> PeggyResult<()> {
        parse_destination(&self.eth_dest)?;
        validate_amount_and_fee(&self.amount, &self.bridge_fee)
    }
}

/// Ask the module to build a batch for `denom`. Anyone may send it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgRequestBatch {
    pub sender: AccAddress,
    pub denom: String,
}

impl MsgRequestBatch {
    pub fn validate_basic(&self) -> PeggyResult<()> {
        Ok(validate_denom(&self.denom)?)
    }
}

/// Submit an orchestrator's signature over a batch digest.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgConfirmBatch {
    pub orchestrator: AccAddress,
    pub denom: String,
    pub batch_nonce: u64,
    /// Digest the orchestrator believes it is signing.
    #[serde_as(as = "Hex")]
    pub signed_digest: Hash,
    /// EIP-191 signature over `signed_digest`.
    pub signature: EthSignature,
}

impl MsgConfirmBatch {
    pub fn validate_basic(&self) -> PeggyResult<()> {
        validate_denom(&self.denom)?;
        if self.batch_nonce == 0 {
            return Err(PeggyError::UnknownBatch {
                denom: self.denom.clone(),
                batch_nonce: 0,
            });
        }
        Ok(())
    }
}

/// Tagged union of every message the module handles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PeggyMsg {
    DelegateOrchestrator(MsgDelegateOrchestrator),
    SubmitClaim(MsgSubmitClaim),
    SendToExternal(MsgSendToExternal),
    RequestBatch(MsgRequestBatch),
    ConfirmBatch(MsgConfirmBatch),
}

impl PeggyMsg {
    pub fn validate_basic(&self) -> PeggyResult<()> {
        match self {
            PeggyMsg::DelegateOrchestrator(m) => m.validate_basic(),
            PeggyMsg::SubmitClaim(m) => m.validate_basic(),
            PeggyMsg::SendToExternal(m) => m.validate_basic(),
            PeggyMsg::RequestBatch(m) => m.validate_basic(),
            PeggyMsg::ConfirmBatch(m) => m.validate_basic(),
        }
    }

    /// Account that must sign the enclosing transaction.
    pub fn signer(&self) -> AccAddress {
        match self {
            PeggyMsg::DelegateOrchestrator(m) => m.validator.to_account(),
            PeggyMsg::SubmitClaim(m) => m.orchestrator,
            PeggyMsg::SendToExternal(m) => m.sender,
            PeggyMsg::RequestBatch(m) => m.sender,
            PeggyMsg::ConfirmBatch(m) => m.orchestrator,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PeggyMsg::DelegateOrchestrator(_) => "delegate_orchestrator",
            PeggyMsg::SubmitClaim(_) => "submit_claim",
            PeggyMsg::SendToExternal(_) => "send_to_external",
            PeggyMsg::RequestBatch(_) => "request_batch",
            PeggyMsg::ConfirmBatch(_) => "confirm_batch",
        }
    }
}
