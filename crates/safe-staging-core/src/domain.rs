use std::fmt;

use alloy::primitives::{Address, Bytes, U256};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// Safe call kind, `0` on the wire for a plain call and `1` for a delegate call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Call,
    DelegateCall,
}

impl Operation {
    pub fn as_u8(self) -> u8 {
        match self {
            Operation::Call => 0,
            Operation::DelegateCall => 1,
        }
    }
}

impl TryFrom<u64> for Operation {
    type Error = String;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Operation::Call),
            1 => Ok(Operation::DelegateCall),
            other => Err(format!("unknown operation {other}, expected 0 or 1")),
        }
    }
}

impl Serialize for Operation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_u8().to_string())
    }
}

impl<'de> Deserialize<'de> for Operation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = match NumberOrString::deserialize(deserializer)? {
            NumberOrString::Number(n) => n,
            NumberOrString::String(s) => s
                .trim()
                .parse()
                .map_err(|e| de::Error::custom(format!("invalid operation {s:?}: {e}")))?,
        };
        Operation::try_from(raw).map_err(de::Error::custom)
    }
}

/// The payload a Safe hashes and its owners sign.
///
/// Two transactions are the same proposal only if every field matches,
/// nonce included.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletTransaction {
    pub to: Address,
    #[serde(with = "decimal")]
    pub value: U256,
    pub data: Bytes,
    pub operation: Operation,
    #[serde(with = "decimal")]
    pub safe_tx_gas: U256,
    #[serde(with = "decimal")]
    pub base_gas: U256,
    #[serde(with = "decimal")]
    pub gas_price: U256,
    pub gas_token: Address,
    pub refund_receiver: Address,
    #[serde(deserialize_with = "nonce_from_wire")]
    pub nonce: u64,
}

/// A transaction plus the signatures collected for it so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedProposal {
    pub txn: WalletTransaction,
    pub sigs: Vec<Bytes>,
}

impl StagedProposal {
    pub fn new(txn: WalletTransaction, sigs: Vec<Bytes>) -> Self {
        Self { txn, sigs }
    }

    pub fn nonce(&self) -> u64 {
        self.txn.nonce
    }

    pub fn signature_count(&self) -> usize {
        self.sigs.len()
    }

    /// Signatures joined in submission order, the layout `checkNSignatures` expects.
    pub fn concatenated_signatures(&self) -> Bytes {
        let len = self.sigs.iter().map(|s| s.len()).sum();
        let mut out = Vec::with_capacity(len);
        for sig in &self.sigs {
            out.extend_from_slice(sig);
        }
        Bytes::from(out)
    }
}

/// All proposals for one Safe on one chain live under a single key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StagingKey {
    pub chain_id: u64,
    pub wallet: Address,
}

impl StagingKey {
    pub fn new(chain_id: u64, wallet: Address) -> Self {
        Self { chain_id, wallet }
    }
}

impl fmt::Display for StagingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            self.chain_id,
            alloy::primitives::hex::encode_prefixed(self.wallet)
        )
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    String(String),
}

fn nonce_from_wire<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s
            .trim()
            .parse()
            .map_err(|e| de::Error::custom(format!("invalid nonce {s:?}: {e}"))),
    }
}

/// Parse a wei-style integer given either in decimal or `0x` hex.
pub fn parse_u256(raw: &str) -> Result<U256, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("empty integer".to_owned());
    }
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        U256::from_str_radix(hex, 16).map_err(|e| format!("invalid hex integer {raw:?}: {e}"))
    } else {
        U256::from_str_radix(raw, 10).map_err(|e| format!("invalid integer {raw:?}: {e}"))
    }
}

/// Decimal-string representation for `U256` fields.
mod decimal {
    use alloy::primitives::U256;
    use serde::de::{self, Deserializer};
    use serde::{Deserialize, Serializer};

    use super::{parse_u256, NumberOrString};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        match NumberOrString::deserialize(deserializer)? {
            NumberOrString::Number(n) => Ok(U256::from(n)),
            NumberOrString::String(s) => parse_u256(&s).map_err(de::Error::custom),
        }
    }
}
