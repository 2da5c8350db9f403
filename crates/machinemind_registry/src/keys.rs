//! Storage key allocation.
//!
//! Keys are random strings drawn from a URL-safe alphabet. The allocator
//! remembers every key it has issued (or been told about) and never hands
//! the same key out twice, so a deleted record's key is never reused.

use std::collections::HashSet;

use machinemind_foundation::StorageKey;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::RegistryConfig;

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Generates unique storage keys for one environment.
#[derive(Debug)]
pub struct KeyAllocator {
    rng: ChaCha8Rng,
    length: usize,
    issued: HashSet<StorageKey>,
}

impl KeyAllocator {
    /// Creates an allocator configured by `config`.
    #[must_use]
    pub fn new(config: &RegistryConfig) -> Self {
        let rng = match config.key_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            rng,
            length: config.effective_key_length(),
            issued: HashSet::new(),
        }
    }

    /// Allocates a key that has never been issued by this allocator.
    pub fn allocate(&mut self) -> StorageKey {
        loop {
            let key: String = (0..self.length)
                .map(|_| char::from(ALPHABET[self.rng.gen_range(0..ALPHABET.len())]))
                .collect();
            let key = StorageKey::new(key);
            if self.issued.insert(key.clone()) {
                return key;
            }
        }
    }

    /// Records an externally supplied key (e.g. from a snapshot) as issued.
    ///
    /// Returns false if the key was already known.
    pub fn mark_issued(&mut self, key: &StorageKey) -> bool {
        self.issued.insert(key.clone())
    }

    /// Returns true if the key has been issued.
    #[must_use]
    pub fn is_issued(&self, key: &StorageKey) -> bool {
        self.issued.contains(key)
    }

    /// Returns the number of keys issued so far.
    #[must_use]
    pub fn issued_count(&self) -> usize {
        self.issued.len()
    }
}
