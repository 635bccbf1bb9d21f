//! Error types for the Barry framework.

use barry_core::{ApiError, DecodeError, ResponseError};
use thiserror::Error;

/// An expected, user-facing failure: the command was refused.
///
/// Handlers may return it (through `anyhow`) to refuse an invocation; the
/// dispatcher recognises it and keeps it apart from internal failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Errors raised while resolving or running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The invocation was refused.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The interaction does not have the shape the definition expects.
    #[error("Invalid command type. Expected \"{expected}\" command.")]
    InvalidCommandType {
        /// Type the definition expects.
        expected: &'static str,
    },

    #[error("Could not retrieve target message.")]
    MissingTargetMessage,

    #[error("Could not retrieve target user.")]
    MissingTargetUser,

    /// An option asking for a member was used outside a guild or the member
    /// was not resolved.
    #[error("Could not resolve a member for option '{option}'.")]
    MissingMember {
        /// Option name.
        option: String,
    },

    /// An entity option points at an ID absent from the resolved data.
    #[error("Could not resolve {kind} for option '{option}'.")]
    UnresolvedOption {
        /// Option name.
        option: String,
        /// Entity kind, e.g. "channel".
        kind: &'static str,
    },

    /// The resolved definition has nothing to run.
    #[error("command '{name}' has no handler")]
    MissingHandler {
        /// Command name.
        name: String,
    },

    /// Response channel error.
    #[error(transparent)]
    Response(#[from] ResponseError),

    /// Transport error (e.g. during sync).
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Failure inside a command handler.
    #[error(transparent)]
    Handler(anyhow::Error),
}

impl CommandError {
    /// Classifies a handler failure, recovering a [`ValidationError`] or
    /// [`ResponseError`] the handler propagated.
    pub fn from_handler(err: anyhow::Error) -> Self {
        match err.downcast::<ValidationError>() {
            Ok(validation) => Self::Validation(validation),
            Err(err) => match err.downcast::<ResponseError>() {
                Ok(response) => Self::Response(response),
                Err(err) => Self::Handler(err),
            },
        }
    }

    /// Whether this is an expected, user-facing refusal.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

/// Errors raised by the client pipeline.
#[derive(Debug, Error)]
pub enum ClientError {
    /// An event source is already attached.
    #[error("an event source is already attached to this client")]
    SourceAlreadyAttached,

    /// The payload could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Result type for command operations.
pub type CommandResult<T> = Result<T, CommandError>;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
