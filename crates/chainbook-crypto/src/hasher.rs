use chainbook_types::{Digest, Timestamp};

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g. `"chainbook-tx-v1"`) that is
/// prepended to every hash computation, so a transaction and a block with
/// identical preimages still produce different digests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for transaction hashes.
    pub const TRANSACTION: Self = Self {
        domain: "chainbook-tx-v1",
    };
    /// Hasher for the flat merkle root of a block.
    pub const MERKLE: Self = Self {
        domain: "chainbook-merkle-v1",
    };
    /// Hasher for block hashes.
    pub const BLOCK: Self = Self {
        domain: "chainbook-block-v1",
    };
    /// Hasher for ledger chain ids.
    pub const CHAIN: Self = Self {
        domain: "chainbook-chain-v1",
    };

    /// Start a framed digest under this domain.
    pub fn builder(&self) -> DigestBuilder {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        DigestBuilder { hasher }
    }
}

/// Incremental digest over a sequence of framed fields.
///
/// Variable-length fields are length-prefixed so that `("ab", "c")` and
/// `("a", "bc")` never share a preimage.
pub struct DigestBuilder {
    hasher: blake3::Hasher,
}

impl DigestBuilder {
    /// Append bytes with no framing.
    pub fn raw(mut self, data: &[u8]) -> Self {
        self.hasher.update(data);
        self
    }

    /// Append a length-prefixed string.
    pub fn str(mut self, value: &str) -> Self {
        self.hasher.update(&(value.len() as u64).to_le_bytes());
        self.hasher.update(value.as_bytes());
        self
    }

    pub fn u64(mut self, value: u64) -> Self {
        self.hasher.update(&value.to_le_bytes());
        self
    }

    pub fn timestamp(self, value: Timestamp) -> Self {
        self.u64(value.as_micros())
    }

    pub fn digest(mut self, value: &Digest) -> Self {
        self.hasher.update(value.as_bytes());
        self
    }

    /// Append an optional digest: a `0` tag when absent, `1` plus the bytes
    /// when present.
    pub fn opt_digest(mut self, value: Option<&Digest>) -> Self {
        match value {
            None => {
                self.hasher.update(&[0]);
            }
            Some(d) => {
                self.hasher.update(&[1]);
                self.hasher.update(d.as_bytes());
            }
        }
        self
    }

    pub fn finish(self) -> Digest {
        Digest::from_hash(*self.hasher.finalize().as_bytes())
    }
}
