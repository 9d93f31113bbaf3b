//! Mutation error taxonomy.

use thiserror::Error;

use foldertree_core::error::{AppError, ErrorKind};
use foldertree_core::types::FolderId;
use foldertree_entity::folder::MAX_NAME_LENGTH;

/// Shown when the remote store failed without saying why.
pub const GENERIC_FAILURE_MESSAGE: &str = "The operation could not be completed. Please try again.";

/// A mutation refused by local validation. Never reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Empty after trimming, or too long.
    #[error("Folder name must not be blank or longer than {} characters", MAX_NAME_LENGTH)]
    InvalidName,
    /// The folder being changed is not in the snapshot.
    #[error("Folder {0} does not exist")]
    UnknownFolder(FolderId),
    /// The requested parent is not in the snapshot.
    #[error("Parent folder {0} does not exist")]
    UnknownParent(FolderId),
    /// The target parent is the folder itself or one of its descendants.
    #[error("Folder {folder} cannot be moved into itself or one of its subfolders")]
    CyclicMove {
        /// Folder being moved.
        folder: FolderId,
        /// Requested parent.
        target: FolderId,
    },
}

/// Why a mutation did not commit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    /// Local validation refused the mutation.
    #[error(transparent)]
    Rejected(#[from] Rejection),
    /// Another mutation against the same folder is still in flight.
    #[error("Another change to folder {0} is still in progress")]
    Conflict(FolderId),
    /// The remote store failed or refused the request.
    #[error("{}", .message.as_deref().unwrap_or(GENERIC_FAILURE_MESSAGE))]
    RemoteFailure {
        /// Error category.
        kind: ErrorKind,
        /// Message from the remote store, verbatim.
        message: Option<String>,
    },
}

impl MutationError {
    /// Text suitable for showing to the user.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// Whether reissuing the same mutation later can succeed.
    ///
    /// A retried create is not deduplicated: if the failed attempt reached
    /// the store, retrying creates a second folder.
    pub fn is_retriable(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }
}

impl From<AppError> for MutationError {
    fn from(err: AppError) -> Self {
        Self::RemoteFailure {
            kind: err.kind,
            message: err.detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_failure_prefers_server_message() {
        let err: MutationError = AppError::validation("Remote store returned 400")
            .with_detail("Folder has subfolders")
            .into();
        assert_eq!(err.user_message(), "Folder has subfolders");
        assert!(err.is_retriable());
    }

    #[test]
    fn test_remote_failure_falls_back_to_generic() {
        let err: MutationError = AppError::external_service("connection refused").into();
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn test_rejections_are_not_retriable() {
        let err = MutationError::from(Rejection::InvalidName);
        assert!(!err.is_retriable());
        assert!(err.user_message().contains("must not be blank"));
        assert!(MutationError::Conflict(FolderId::new()).is_retriable());
    }
}
