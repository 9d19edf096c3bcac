use crate::error::{RlnError, RlnResult};
use crate::ETH_ADDRESS_SIZE;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EthAddress(#[serde(with = "crate::hex_array")] pub [u8; ETH_ADDRESS_SIZE]);

impl EthAddress {
    pub const fn from_bytes(bytes: [u8; ETH_ADDRESS_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ETH_ADDRESS_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn from_hex(s: &str) -> RlnResult<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| RlnError::InvalidAddress(e.to_string()))?;
        if bytes.len() != ETH_ADDRESS_SIZE {
            return Err(RlnError::InvalidAddress("invalid address length".into()));
        }
        let mut arr = [0u8; ETH_ADDRESS_SIZE];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    pub const fn zero() -> Self {
        Self([0u8; ETH_ADDRESS_SIZE])
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ETH_ADDRESS_SIZE]
    }
}

impl fmt::Debug for EthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EthAddress({})", self.to_hex())
    }
}

impl fmt::Display for EthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Default for EthAddress {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::str::FromStr for EthAddress {
    type Err = RlnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let addr = EthAddress::from_hex("0x185A0015aC462a0aECb81beCc0497b649a64B9ea").unwrap();
        assert_eq!(addr.to_hex(), "0x185a0015ac462a0aecb81becc0497b649a64b9ea");
        assert_eq!(EthAddress::from_hex(&addr.to_hex()).unwrap(), addr);
    }

    #[test]
    fn test_rejects_bad_length() {
        assert!(EthAddress::from_hex("0xabcd").is_err());
        assert!(EthAddress::from_hex("not hex").is_err());
    }

    #[test]
    fn test_serde_as_hex_string() {
        let addr = EthAddress::from_bytes([0xab; 20]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", "ab".repeat(20)));
        let back: EthAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
