//! Error types for machinemind.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//! Not-found lookups are not errors: they return `Option` at the call site.

use std::fmt;

use thiserror::Error;

use crate::entry_type::EntryType;
use crate::reference::StorageKey;
use crate::types::ValueType;

/// The main error type for machinemind operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Pushes a frame onto this error's context stack, creating the context
    /// if needed.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        let context = self.context.take().unwrap_or_default();
        self.context = Some(context.with_frame(frame));
        self
    }

    /// Creates an entry not found error.
    #[must_use]
    pub fn entry_not_found(kind: EntryType, key: &StorageKey) -> Self {
        Self::new(ErrorKind::EntryNotFound {
            kind,
            key: key.clone(),
        })
    }

    /// Creates a missing field error.
    #[must_use]
    pub fn missing_field(kind: EntryType, field: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingField {
            kind,
            field: field.into(),
        })
    }

    /// Creates a field type mismatch error.
    #[must_use]
    pub fn type_mismatch(
        kind: EntryType,
        field: impl Into<String>,
        expected: ValueType,
        actual: ValueType,
    ) -> Self {
        Self::new(ErrorKind::TypeMismatch {
            kind,
            field: field.into(),
            expected,
            actual,
        })
    }

    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid_value(
        kind: EntryType,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::InvalidValue {
            kind,
            field: field.into(),
            message: message.into(),
        })
    }

    /// Creates an unknown registry error.
    #[must_use]
    pub fn unknown_registry(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownRegistry(name.into()))
    }

    /// Creates an unknown entry type error.
    #[must_use]
    pub fn unknown_entry_type(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownEntryType(name.into()))
    }

    /// Creates a kind mismatch error.
    #[must_use]
    pub fn kind_mismatch(expected: EntryType, actual: EntryType) -> Self {
        Self::new(ErrorKind::KindMismatch { expected, actual })
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    /// Returns true if this error reports a missing stored entry or registry.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::EntryNotFound { .. } | ErrorKind::UnknownRegistry(_)
        )
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A stored record was required but is absent.
    #[error("entry not found: {kind}:{key}")]
    EntryNotFound {
        /// Kind of the missing entry.
        kind: EntryType,
        /// Storage key that was looked up.
        key: StorageKey,
    },

    /// A raw record lacks a field its schema requires.
    #[error("missing field `{field}` on {kind}")]
    MissingField {
        /// Kind whose schema was loading.
        kind: EntryType,
        /// Name of the absent field.
        field: String,
    },

    /// A raw record field has the wrong shape.
    #[error("type mismatch on {kind}.{field}: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Kind whose schema was loading.
        kind: EntryType,
        /// Name of the offending field.
        field: String,
        /// The shape the schema expected.
        expected: ValueType,
        /// The shape actually present.
        actual: ValueType,
    },

    /// A raw record field has the right shape but an unusable value.
    #[error("invalid value on {kind}.{field}: {message}")]
    InvalidValue {
        /// Kind whose schema was loading.
        kind: EntryType,
        /// Name of the offending field.
        field: String,
        /// Description of the problem.
        message: String,
    },

    /// A record with this storage key already exists.
    #[error("duplicate storage key: {kind}:{key}")]
    DuplicateKey {
        /// Kind of the conflicting entry.
        kind: EntryType,
        /// The conflicting storage key.
        key: StorageKey,
    },

    /// A reference names a registry the environment does not know.
    #[error("unknown registry: {0}")]
    UnknownRegistry(String),

    /// A string does not name any entity kind.
    #[error("unknown entry type: {0}")]
    UnknownEntryType(String),

    /// A typed operation reached an entry of another kind.
    #[error("kind mismatch: expected {expected}, got {actual}")]
    KindMismatch {
        /// The kind the caller asked for.
        expected: EntryType,
        /// The kind actually found.
        actual: EntryType,
    },

    /// A dynamic operation needs a schema that was never registered.
    #[error("no schema registered for {0}")]
    UnregisteredKind(EntryType),

    /// A schema was registered twice.
    #[error("schema already registered: {0}")]
    DuplicateSchema(EntryType),

    /// A nested resolution reached a context slot that was reserved but
    /// never filled.
    #[error("unresolved reservation for {kind}:{key}")]
    UnresolvedReservation {
        /// Kind of the reserved entry.
        kind: EntryType,
        /// Storage key of the reserved entry.
        key: StorageKey,
    },

    /// A content pack manifest is missing or malformed.
    #[error("invalid content pack manifest: {0}")]
    InvalidManifest(String),

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// File I/O failed.
    #[error("I/O error: {0}")]
    IoError(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Registry the failing operation ran against.
    pub registry: Option<String>,
    /// Stack of entity paths the failure propagated through, innermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the registry name.
    #[must_use]
    pub fn with_registry(mut self, registry: impl Into<String>) -> Self {
        self.registry = Some(registry.into());
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(registry) = &self.registry {
            write!(f, "in registry {registry}")?;
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}
