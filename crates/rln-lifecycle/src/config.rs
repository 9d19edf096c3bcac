use rln_types::EthAddress;

/// Prefix of the challenge a wallet signs to derive its membership
/// identity. A millisecond timestamp is appended per registration so
/// signatures cannot be replayed.
pub const SIGNATURE_MESSAGE: &str = "Sign this message to generate your RLN credentials";

/// The single network this deployment targets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkConfig {
    pub chain_id: u64,
    pub token_address: EthAddress,
}

/// Linea Sepolia deployment.
pub const LINEA_SEPOLIA: NetworkConfig = NetworkConfig {
    chain_id: 59141,
    token_address: EthAddress::from_bytes([
        0x18, 0x5a, 0x00, 0x15, 0xac, 0x46, 0x2a, 0x0a, 0xec, 0xb8, 0x1b, 0xec, 0xc0, 0x49,
        0x7b, 0x64, 0x9a, 0x64, 0xb9, 0xea,
    ]),
};

impl Default for NetworkConfig {
    fn default() -> Self {
        LINEA_SEPOLIA
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linea_sepolia_values() {
        let config = NetworkConfig::default();
        assert_eq!(config.chain_id, 59141);
        assert_eq!(
            config.token_address.to_hex(),
            "0x185a0015ac462a0aecb81becc0497b649a64b9ea"
        );
    }
}
