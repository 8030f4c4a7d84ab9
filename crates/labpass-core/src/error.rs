use thiserror::Error;

/// Core error types for LabPass operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{resource_type} used as {role} has no server-assigned id; upload it first")]
    MissingIdentity {
        resource_type: String,
        role: String,
    },

    #[error("Remote store rejected the request (HTTP {status}): {body}")]
    RemoteRejection { status: u16, body: String },

    #[error("Unsupported recipe: {patient} patient with {observations} observations")]
    UnsupportedRecipe {
        patient: String,
        observations: String,
    },

    #[error("Invalid FHIR ID: {0}")]
    InvalidId(String),

    #[error("Invalid FHIR DateTime: {0}")]
    InvalidDateTime(String),

    #[error("Invalid resource data: {message}")]
    InvalidResource { message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),
}

impl CoreError {
    /// Create a new MissingIdentity error
    pub fn missing_identity(resource_type: impl Into<String>, role: impl Into<String>) -> Self {
        Self::MissingIdentity {
            resource_type: resource_type.into(),
            role: role.into(),
        }
    }

    /// Create a new RemoteRejection error
    pub fn remote_rejection(status: u16, body: impl Into<String>) -> Self {
        Self::RemoteRejection {
            status,
            body: body.into(),
        }
    }

    /// Create a new InvalidId error
    pub fn invalid_id(id: impl Into<String>) -> Self {
        Self::InvalidId(id.into())
    }

    /// Create a new InvalidDateTime error
    pub fn invalid_date_time(datetime: impl Into<String>) -> Self {
        Self::InvalidDateTime(datetime.into())
    }

    /// Create a new InvalidResource error
    pub fn invalid_resource(message: impl Into<String>) -> Self {
        Self::InvalidResource {
            message: message.into(),
        }
    }

    /// Create a new Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Whether the error was raised by the remote store rather than locally
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteRejection { .. } | Self::Transport(_))
    }

    /// Get error category for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingIdentity { .. } => ErrorCategory::Precondition,
            Self::RemoteRejection { .. } => ErrorCategory::Remote,
            Self::Transport(_) => ErrorCategory::Transport,
            Self::UnsupportedRecipe { .. } | Self::Configuration(_) | Self::UrlError(_) => {
                ErrorCategory::Configuration
            }
            Self::InvalidId(_) | Self::InvalidDateTime(_) | Self::InvalidResource { .. } => {
                ErrorCategory::Validation
            }
            Self::JsonError(_) => ErrorCategory::Serialization,
        }
    }
}

/// Error categories for log classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Precondition,
    Remote,
    Transport,
    Configuration,
    Serialization,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Precondition => write!(f, "precondition"),
            Self::Remote => write!(f, "remote"),
            Self::Transport => write!(f, "transport"),
            Self::Configuration => write!(f, "configuration"),
            Self::Serialization => write!(f, "serialization"),
        }
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
