//! # Error Types Module
//!
//! Questo modulo definisce i tipi di errore delle operazioni sugli handle.
//!
//! ## Categorie di errori:
//! - `InvalidArgument`: path vuoto dove serve un file, nome di entry non valido
//! - `NotFound`: un segmento del path non esiste e la creazione non è richiesta
//! - `TypeMismatch`: un segmento atteso come directory è un file (o viceversa)
//! - `Storage`: qualsiasi altro errore del sistema di storage (permessi, I/O)
//!
//! Gli errori non vengono mai intercettati o ritentati localmente: si
//! propagano così come sono al chiamante.
//!
//! ## Esempio:
//! ```rust,ignore
//! if path.is_empty() {
//!     return Err(FsError::invalid_argument("path must not be empty"));
//! }
//! ```

/// Errors raised while enumerating or resolving handles
#[derive(thiserror::Error, Debug)]
pub enum FsError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

pub type FsResult<T> = Result<T, FsError>;

impl FsError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    pub fn type_mismatch(msg: impl Into<String>) -> Self {
        Self::TypeMismatch(msg.into())
    }

    /// Wrap a lock poisoning or similar backend fault as a storage failure
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(std::io::Error::other(msg.into()))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_converts_to_storage() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: FsError = io.into();
        assert!(matches!(err, FsError::Storage(_)));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_messages() {
        assert_eq!(FsError::not_found("a").to_string(), "Not found: a");
        assert_eq!(
            FsError::type_mismatch("x is a file").to_string(),
            "Type mismatch: x is a file"
        );
        assert!(FsError::not_found("a").is_not_found());
    }
}
