//! Registry environment configuration.

/// Default length of generated storage keys.
pub const DEFAULT_KEY_LENGTH: usize = 21;

/// Shortest storage key the allocator will generate.
pub const MIN_KEY_LENGTH: usize = 8;

/// Configuration shared by every registry in one environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Seed for the storage key generator. `None` seeds from OS entropy.
    pub key_seed: Option<u64>,

    /// Length of generated storage keys (clamped to [`MIN_KEY_LENGTH`]).
    pub key_length: usize,

    /// Fail `load` when a non-owned reference cannot be resolved, instead
    /// of dropping it with a warning.
    pub strict_foreign_refs: bool,

    /// Keep scanning after the first semantic id match and warn about
    /// duplicates.
    pub warn_duplicate_mmids: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            key_seed: None,
            key_length: DEFAULT_KEY_LENGTH,
            strict_foreign_refs: false,
            warn_duplicate_mmids: true,
        }
    }
}

impl RegistryConfig {
    /// Creates a configuration with a fixed key seed, for reproducible runs.
    #[must_use]
    pub fn deterministic(seed: u64) -> Self {
        Self {
            key_seed: Some(seed),
            ..Self::default()
        }
    }

    /// Creates a configuration that rejects unresolvable references.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            strict_foreign_refs: true,
            ..Self::default()
        }
    }

    /// Builder method to set the key seed.
    #[must_use]
    pub fn with_key_seed(mut self, seed: u64) -> Self {
        self.key_seed = Some(seed);
        self
    }

    /// Builder method to set the key length.
    #[must_use]
    pub fn with_key_length(mut self, length: usize) -> Self {
        self.key_length = length;
        self
    }

    /// Builder method to enable/disable strict foreign references.
    #[must_use]
    pub fn with_strict_foreign_refs(mut self, strict: bool) -> Self {
        self.strict_foreign_refs = strict;
        self
    }

    /// Builder method to enable/disable duplicate semantic id warnings.
    #[must_use]
    pub fn with_warn_duplicate_mmids(mut self, warn: bool) -> Self {
        self.warn_duplicate_mmids = warn;
        self
    }

    /// Returns the key length actually used by the allocator.
    #[must_use]
    pub fn effective_key_length(&self) -> usize {
        self.key_length.max(MIN_KEY_LENGTH)
    }
}
