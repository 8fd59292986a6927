use chainbook_types::Digest;

/// Something that participates in a hash chain.
pub trait HashLinked {
    /// The element's own stored hash. `None` while the element is unsealed.
    fn link_hash(&self) -> Option<Digest>;
    /// The predecessor's hash (`None` for the first element).
    fn prev_hash(&self) -> Option<Digest>;
    /// Recompute the element's hash from its stored content.
    /// `None` when the element lacks the inputs to do so.
    fn recompute_hash(&self) -> Option<Digest>;
}

/// Hash chain integrity verifier.
///
/// Verifies that a sequence forms a valid hash chain: the first element has no
/// predecessor, each later element's `prev_hash` matches the previous
/// element's `link_hash`, and each stored hash matches its recomputation.
pub struct HashChainVerifier;

impl HashChainVerifier {
    pub fn verify_chain(items: &[impl HashLinked]) -> Result<(), ChainError> {
        let mut previous: Option<Digest> = None;

        for (index, item) in items.iter().enumerate() {
            let stored = item.link_hash().ok_or(ChainError::Unsealed { index })?;

            match (index, item.prev_hash()) {
                (0, Some(_)) => return Err(ChainError::GenesisHasPrevHash),
                (0, None) => {}
                (_, None) => return Err(ChainError::MissingPrevHash { index }),
                (_, Some(prev)) if Some(prev) != previous => {
                    return Err(ChainError::BrokenLink { index })
                }
                _ => {}
            }

            if item.recompute_hash() != Some(stored) {
                return Err(ChainError::HashMismatch { index });
            }

            previous = Some(stored);
        }

        Ok(())
    }
}

/// Errors from chain verification.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("first element has a previous hash (should be None)")]
    GenesisHasPrevHash,

    #[error("broken link at index {index}: prev_hash does not match")]
    BrokenLink { index: usize },

    #[error("missing prev_hash at index {index} (should reference previous element)")]
    MissingPrevHash { index: usize },

    #[error("hash mismatch at index {index}: computed hash differs from stored")]
    HashMismatch { index: usize },

    #[error("element at index {index} has no stored hash")]
    Unsealed { index: usize },
}
