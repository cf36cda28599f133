//! On-chain layout of the registry account.
//!
//! The account holds exactly one little-endian `u32`, with no header, padding
//! or version byte. The size is fixed at creation and never changes.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize)]
pub struct MarriageRegistry {
    pub counter: u32,
}

impl MarriageRegistry {
    /// Serialized size in bytes; also the allocated account size.
    pub const SIZE: usize = std::mem::size_of::<u32>();

    pub fn new(counter: u32) -> Self {
        Self { counter }
    }

    pub fn encode(&self) -> std::io::Result<Vec<u8>> {
        borsh::to_vec(self)
    }

    /// Decode account data, rejecting any length other than [`Self::SIZE`].
    pub fn decode(data: &[u8]) -> Result<Self, String> {
        if data.len() != Self::SIZE {
            return Err(format!("expected {} bytes, found {}", Self::SIZE, data.len()));
        }
        Self::try_from_slice(data).map_err(|e| format!("borsh: {e}"))
    }
}
