//! Naming-core constants for Endoors.
//!
//! Sizes follow the Ethereum ABI; network defaults follow the Celo
//! deployments the Endoors registry contracts live on.

// ═══════════════════════════════════════════════════════════════════════════════
// SIZES
// ═══════════════════════════════════════════════════════════════════════════════

/// Size of a namehash node in bytes.
pub const NODE_SIZE: usize = 32;

/// Size of Ethereum address in bytes (20 bytes = 160 bits).
pub const ETH_ADDRESS_SIZE: usize = 20;

/// Size of a transaction hash in bytes.
pub const TX_HASH_SIZE: usize = 32;

/// Size of keccak256 hash output.
pub const KECCAK256_SIZE: usize = 32;

/// Size of a hex-encoded private key, without the `0x` prefix.
pub const PRIVATE_KEY_HEX_LEN: usize = 64;

// ═══════════════════════════════════════════════════════════════════════════════
// NAMING
// ═══════════════════════════════════════════════════════════════════════════════

/// Parent domain every Endoors subdomain is registered under.
pub const DEFAULT_PARENT_DOMAIN: &str = "endoors.eth";

/// Human-readable description of the label character set.
pub const LABEL_CHARSET_DESCRIPTION: &str = "lowercase letters, numbers, and underscores";

// ═══════════════════════════════════════════════════════════════════════════════
// NETWORKS
// ═══════════════════════════════════════════════════════════════════════════════

/// Celo mainnet RPC endpoint.
pub const CELO_MAINNET_RPC_URL: &str = "https://forno.celo.org";

/// Celo Alfajores testnet RPC endpoint.
pub const CELO_TESTNET_RPC_URL: &str = "https://alfajores-forno.celo-testnet.org";

/// Local development node RPC endpoint.
pub const LOCALHOST_RPC_URL: &str = "http://localhost:8545";

/// Celo mainnet chain id.
pub const CELO_MAINNET_CHAIN_ID: u64 = 42220;

/// Celo Alfajores chain id.
pub const CELO_TESTNET_CHAIN_ID: u64 = 44787;

/// Local development chain id.
pub const LOCALHOST_CHAIN_ID: u64 = 31337;

/// L2Registry deployment on Celo Alfajores.
pub const TESTNET_L2_REGISTRY_ADDRESS: &str = "0x2565b1f8bfd174d3acb67fd1a377b8014350dc26";

/// L2Registrar deployment on Celo Alfajores.
pub const TESTNET_L2_REGISTRAR_ADDRESS: &str = "0x59221A5Ebb314C358bCFCEDAEc406D2BF322F7A5";

// ═══════════════════════════════════════════════════════════════════════════════
// TIMING
// ═══════════════════════════════════════════════════════════════════════════════

/// How long a registration waits for finality before its outcome is reported unknown.
pub const DEFAULT_FINALITY_TIMEOUT_SECS: u64 = 120;

/// Receipt polling interval while awaiting finality.
pub const DEFAULT_FINALITY_POLL_INTERVAL_MS: u64 = 2_000;

/// Confirmations required before a registration is considered final.
pub const DEFAULT_CONFIRMATIONS: u64 = 1;

/// Upper bound for a single read-only ledger call.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
