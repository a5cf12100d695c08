use thiserror::Error;

/// All errors that can occur in CredVault.
///
/// Security-sensitive failures are deliberately coarse: every crypto fault
/// maps to `CryptoOperationFailed` and every reset-token fault maps to
/// `InvalidToken`, so callers cannot tell (or leak) which underlying check
/// failed.
#[derive(Debug, Error)]
pub enum CredVaultError {
    // --- Crypto errors ---
    #[error("Cryptographic operation failed")]
    CryptoOperationFailed,

    // --- Vault errors ---
    #[error("Credential entry not found")]
    EntryNotFound,

    #[error("Not authorized to access this credential entry")]
    Forbidden,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // --- Authentication errors ---
    #[error("User not found")]
    UserNotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Too many failed login attempts, account temporarily locked")]
    TooManyAttempts,

    #[error("Invalid or expired password reset token")]
    InvalidToken,

    // --- Storage errors ---
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Audit write failed: {0}")]
    AuditWriteFailed(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    Config(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for CredVault results.
pub type Result<T> = std::result::Result<T, CredVaultError>;
