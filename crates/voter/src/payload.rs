//! Cross-chain request payload carried in the deposit's null-data output.

use bitcoin::{
    opcodes::all::OP_RETURN,
    script::{Instruction, Script},
    Amount, TxOut,
};
use borsh::{BorshDeserialize, BorshSerialize};

use crate::errors::PayloadError;

/// Parameters of a cross-chain transfer, embedded by the depositor in the
/// transaction's second output.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct CrossChainRequest {
    /// Chain the deposit should be credited on.
    pub dest_chain_id: u64,

    /// Receiving account on the destination chain.
    pub dest_address: Vec<u8>,

    /// Amount the depositor declares, in satoshis. Must match the value of
    /// the deposit output.
    pub amount: u64,
}

/// Pulls the single data push out of a null-data script.
fn extract_null_data(script: &Script) -> Option<&[u8]> {
    let mut instructions = script.instructions();
    match instructions.next()?.ok()? {
        Instruction::Op(op) if op == OP_RETURN => {}
        _ => return None,
    }
    match instructions.next()?.ok()? {
        Instruction::PushBytes(push) => Some(push.as_bytes()),
        _ => None,
    }
}

/// Decodes the data output's payload and checks it against the deposited
/// value.
pub fn resolve_request(
    data_out: &TxOut,
    deposited: Amount,
) -> Result<CrossChainRequest, PayloadError> {
    let Some(data) = extract_null_data(&data_out.script_pubkey) else {
        return Err(PayloadError::MissingPayload);
    };
    let request = CrossChainRequest::try_from_slice(data)
        .map_err(|e| PayloadError::Malformed(e.to_string()))?;
    if request.amount != deposited.to_sat() {
        return Err(PayloadError::AmountMismatch {
            declared: request.amount,
            deposited: deposited.to_sat(),
        });
    }
    Ok(request)
}
