//! Client configuration.
//!
//! The endpoint and the two fixed addresses are supplied by the embedder at
//! construction; nothing is baked in at module scope.

use serde::{Deserialize, Serialize};

use counter_wire::Address;

/// Which network the client talks to and which accounts it talks about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// JSON-RPC endpoint URL.
    pub endpoint_url: String,
    /// The deployed counter program.
    pub program_address: Address,
    /// The storage account holding the counter record.
    pub storage_address: Address,
    /// Block-explorer base URL for outbound links.
    #[serde(default = "default_explorer_url")]
    pub explorer_url: String,
    /// Cluster query parameter appended to explorer links (e.g. "devnet").
    /// Absent for mainnet.
    #[serde(default)]
    pub explorer_cluster: Option<String>,
}

fn default_explorer_url() -> String {
    "https://explorer.solana.com".into()
}

impl ClientConfig {
    /// Explorer link for a transaction signature.
    pub fn explorer_tx_url(&self, signature: &str) -> String {
        self.explorer_link("tx", signature)
    }

    /// Explorer link for an account or program address.
    pub fn explorer_address_url(&self, address: &Address) -> String {
        self.explorer_link("address", &address.to_string())
    }

    fn explorer_link(&self, kind: &str, id: &str) -> String {
        match &self.explorer_cluster {
            Some(cluster) => format!("{}/{kind}/{id}?cluster={cluster}", self.explorer_url),
            None => format!("{}/{kind}/{id}", self.explorer_url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn devnet_config() -> ClientConfig {
        serde_json::from_str(
            r#"{
                "endpoint_url": "https://api.devnet.solana.com",
                "program_address": "GLVqW7Da29RRr6rnwAe6eEDGNJW8mKygrasHzkBQC2Vz",
                "storage_address": "BQwuXFqJagyZf9FgH6sdKXAGoxucm6CGYwVPV2vEYgWu",
                "explorer_cluster": "devnet"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn deserializes_with_defaults() {
        let config = devnet_config();
        assert_eq!(config.explorer_url, "https://explorer.solana.com");
        assert_eq!(
            config.program_address.to_string(),
            "GLVqW7Da29RRr6rnwAe6eEDGNJW8mKygrasHzkBQC2Vz"
        );
    }

    #[test]
    fn rejects_malformed_addresses() {
        let result: Result<ClientConfig, _> = serde_json::from_str(
            r#"{"endpoint_url": "x", "program_address": "nope", "storage_address": "nope"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn tx_link_carries_the_cluster() {
        let config = devnet_config();
        assert_eq!(
            config.explorer_tx_url("abc123"),
            "https://explorer.solana.com/tx/abc123?cluster=devnet"
        );
    }

    #[test]
    fn mainnet_links_have_no_cluster_param() {
        let mut config = devnet_config();
        config.explorer_cluster = None;
        assert_eq!(
            config.explorer_address_url(&config.storage_address),
            format!(
                "https://explorer.solana.com/address/{}",
                config.storage_address
            )
        );
    }

    #[test]
    fn json_roundtrip() {
        let config = devnet_config();
        let json = serde_json::to_string(&config).unwrap();
        let back: ClientConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.storage_address, config.storage_address);
        assert_eq!(back.explorer_cluster.as_deref(), Some("devnet"));
    }
}
