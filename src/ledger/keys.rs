/// Key layout for the ledger provider keyspace
///
/// Partition structure:
/// - `metadata`: metadata_{ledger_id} -> LedgerMetadata (protobuf)
/// - `unjoined`: unjoined_{ledger_id} -> unjoin time in unix millis (u64, big-endian)

const METADATA_PREFIX: &str = "metadata_";
const UNJOINED_PREFIX: &str = "unjoined_";

/// Encode a metadata key: metadata_{ledger_id}
pub fn encode_metadata_key(ledger_id: &str) -> Vec<u8> {
    format!("{}{}", METADATA_PREFIX, ledger_id).into_bytes()
}

/// Decode a metadata key: metadata_{ledger_id} -> ledger_id
pub fn decode_metadata_key(key: &[u8]) -> Option<String> {
    let key_str = std::str::from_utf8(key).ok()?;
    key_str.strip_prefix(METADATA_PREFIX).map(String::from)
}

/// Encode an unjoin journal key: unjoined_{ledger_id}
pub fn encode_unjoined_key(ledger_id: &str) -> Vec<u8> {
    format!("{}{}", UNJOINED_PREFIX, ledger_id).into_bytes()
}
