//! Error types for the federated login flow.
//!
//! One taxonomy covers every step: resolving a provider, exchanging the
//! authorization code, fetching and normalizing the profile, resolving the
//! identity in storage, and verifying session credentials. HTTP status
//! mapping lives in [`crate::middleware::error`].

/// Why a presented session credential was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialErrorKind {
    /// No credential was presented.
    Missing,
    /// The credential's `exp` claim is in the past.
    Expired,
    /// The signature does not verify against the configured secret.
    InvalidSignature,
    /// The credential is not a structurally valid token.
    Malformed,
}

impl std::fmt::Display for CredentialErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => write!(f, "missing"),
            Self::Expired => write!(f, "expired"),
            Self::InvalidSignature => write!(f, "invalid signature"),
            Self::Malformed => write!(f, "malformed"),
        }
    }
}

/// Errors that can occur during login and request authentication.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The requested provider is not in the registry.
    #[error("Unsupported provider: {provider}")]
    ProviderNotSupported {
        /// The provider name as given by the caller.
        provider: String,
    },

    /// A provider endpoint answered with a non-2xx status.
    #[error("{provider}: upstream returned HTTP {status}")]
    Upstream {
        /// The provider whose endpoint failed.
        provider: String,
        /// The HTTP status code.
        status: u16,
        /// The raw response body (logged, never sent to callers).
        body: String,
    },

    /// The provider answered 2xx but reported an OAuth error in the body.
    #[error("{provider}: provider rejected the request: {error} - {description}")]
    OAuthRejected {
        /// The provider that rejected the request.
        provider: String,
        /// The OAuth error code (e.g. `invalid_grant`).
        error: String,
        /// Optional error description.
        description: String,
    },

    /// A network error occurred talking to a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A provider response is missing an expected field or is not JSON.
    #[error("{provider}: {detail}")]
    MalformedResponse {
        /// The provider whose response could not be used.
        provider: String,
        /// What was missing or unparsable.
        detail: String,
    },

    /// A presented session credential did not verify.
    #[error("Invalid credential: {kind}")]
    InvalidCredential {
        /// Why verification failed.
        kind: CredentialErrorKind,
    },

    /// A user with the same `(provider, external_id)` already exists.
    ///
    /// Raised by storage on concurrent first logins; the identity resolver
    /// consumes it by re-fetching the winner, so it should never reach a
    /// handler.
    #[error("User already exists for {provider}/{external_id}")]
    Conflict {
        /// The provider of the conflicting identity.
        provider: String,
        /// The external id of the conflicting identity.
        external_id: String,
    },

    /// The user store failed.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage failure.
        message: String,
    },

    /// Invalid configuration detected while building a component.
    #[error("Configuration error: {message}")]
    Configuration {
        /// What is wrong with the configuration.
        message: String,
    },
}

impl AuthError {
    /// Creates a `ProviderNotSupported` error.
    #[must_use]
    pub fn provider_not_supported(provider: impl Into<String>) -> Self {
        Self::ProviderNotSupported {
            provider: provider.into(),
        }
    }

    /// Creates an `Upstream` error from a provider response.
    #[must_use]
    pub fn upstream(provider: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::Upstream {
            provider: provider.into(),
            status,
            body: body.into(),
        }
    }

    /// Creates an `OAuthRejected` error from a provider error body.
    #[must_use]
    pub fn oauth_rejected(
        provider: impl Into<String>,
        error: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::OAuthRejected {
            provider: provider.into(),
            error: error.into(),
            description: description.into(),
        }
    }

    /// Creates a `MalformedResponse` error.
    #[must_use]
    pub fn malformed(provider: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::MalformedResponse {
            provider: provider.into(),
            detail: detail.into(),
        }
    }

    /// Creates an `InvalidCredential` error.
    #[must_use]
    pub fn invalid_credential(kind: CredentialErrorKind) -> Self {
        Self::InvalidCredential { kind }
    }

    /// Creates a `Conflict` error.
    #[must_use]
    pub fn conflict(provider: impl Into<String>, external_id: impl Into<String>) -> Self {
        Self::Conflict {
            provider: provider.into(),
            external_id: external_id.into(),
        }
    }

    /// Creates a `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Returns `true` if the failure originated at the provider side
    /// (non-2xx, explicit OAuth error, network failure, unusable response).
    #[must_use]
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Upstream { .. }
                | Self::OAuthRejected { .. }
                | Self::Network(_)
                | Self::MalformedResponse { .. }
        )
    }

    /// Returns `true` if this error means the caller is not authenticated.
    #[must_use]
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::InvalidCredential { .. })
    }

    /// Returns `true` if this is a caller mistake rather than a failure.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ProviderNotSupported { .. })
    }
}

impl From<crate::session::SessionError> for AuthError {
    fn from(err: crate::session::SessionError) -> Self {
        use crate::session::SessionError;

        match err {
            SessionError::Expired => Self::invalid_credential(CredentialErrorKind::Expired),
            SessionError::InvalidSignature => {
                Self::invalid_credential(CredentialErrorKind::InvalidSignature)
            }
            SessionError::Malformed { .. } => {
                Self::invalid_credential(CredentialErrorKind::Malformed)
            }
            SessionError::Encoding { message } => {
                Self::configuration(format!("session token signing failed: {message}"))
            }
        }
    }
}
