//! Chain finality milestones
//!
//! Different chains have different terminal milestones:
//! - Development chains: blocks are authored on demand and may never be
//!   finalized, so inclusion in a block is terminal
//! - Every other chain: the extrinsic must reach a finalized block

use super::status::TxStatus;

use primitive_types::H256;

/// Runtime chain name reported by local development nodes
pub const DEVELOPMENT_CHAIN: &str = "Development";

/// Which status milestone resolves a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalityMode {
    /// Resolve on `InBlock`
    InBlock,
    /// Resolve on `Finalized`
    Finalized,
}

impl FinalityMode {
    /// Pick the milestone for a chain from its self-reported runtime name.
    /// Names are matched case-insensitively against `development_chains`.
    pub fn for_runtime_chain(runtime_chain: &str, development_chains: &[String]) -> Self {
        let runtime_chain = runtime_chain.trim();
        if development_chains
            .iter()
            .any(|name| name.eq_ignore_ascii_case(runtime_chain))
        {
            FinalityMode::InBlock
        } else {
            FinalityMode::Finalized
        }
    }

    /// Block hash of `status` if it is this mode's terminal milestone
    pub fn terminal_block(&self, status: &TxStatus) -> Option<H256> {
        match self {
            FinalityMode::InBlock => status.as_in_block(),
            FinalityMode::Finalized => status.as_finalized(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FinalityMode::InBlock => "in_block",
            FinalityMode::Finalized => "finalized",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dev() -> Vec<String> {
        vec![DEVELOPMENT_CHAIN.to_string()]
    }

    #[test]
    fn test_development_chain_resolves_in_block() {
        assert_eq!(
            FinalityMode::for_runtime_chain("Development", &dev()),
            FinalityMode::InBlock
        );
        assert_eq!(
            FinalityMode::for_runtime_chain("development", &dev()),
            FinalityMode::InBlock
        );
    }

    #[test]
    fn test_other_chains_wait_for_finality() {
        assert_eq!(
            FinalityMode::for_runtime_chain("Rococo Contracts", &dev()),
            FinalityMode::Finalized
        );
        assert_eq!(
            FinalityMode::for_runtime_chain("", &dev()),
            FinalityMode::Finalized
        );
        assert_eq!(
            FinalityMode::for_runtime_chain("Development", &[]),
            FinalityMode::Finalized
        );
    }

    #[test]
    fn test_terminal_block() {
        let block = H256::repeat_byte(7);

        assert_eq!(
            FinalityMode::InBlock.terminal_block(&TxStatus::InBlock(block)),
            Some(block)
        );
        assert_eq!(
            FinalityMode::Finalized.terminal_block(&TxStatus::InBlock(block)),
            None
        );
        assert_eq!(
            FinalityMode::Finalized.terminal_block(&TxStatus::Finalized(block)),
            Some(block)
        );
        assert_eq!(FinalityMode::InBlock.terminal_block(&TxStatus::Ready), None);
    }
}
