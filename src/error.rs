use std::fmt;

use crate::index::IndexError;
use crate::lock::LockError;

/// The single error kind surfaced by ranking managers, factories and services.
#[derive(Debug, Clone, PartialEq)]
pub enum RankingError {
    /// The vote is outside of `0..=scale` for the manager.
    OutOfScale {
        vote: i32,
        scale: u32,
        manager_id: String,
    },
    /// The backing index failed while performing `context`.
    Index { context: String, source: IndexError },
    /// The per-target lock could not be acquired or released.
    Lock(LockError),
    /// A stored document could not be turned back into a record.
    InvalidDocument(String),
    /// A configuration could not be parsed or resolved.
    Configuration(String),
    /// No manager implementation is registered under the storage hint.
    ManagerLookup { hint: String, message: String },
    /// A manager or builder could not be registered.
    Registration(String),
}

impl RankingError {
    pub(crate) fn index(context: impl Into<String>) -> impl FnOnce(IndexError) -> RankingError {
        let context = context.into();
        move |source| RankingError::Index { context, source }
    }
}

impl fmt::Display for RankingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankingError::OutOfScale {
                vote,
                scale,
                manager_id,
            } => write!(
                f,
                "the vote [{}] is out of scale [{}] for [{}] ranking manager",
                vote, scale, manager_id
            ),
            RankingError::Index { context, source } => write!(f, "{}: {}", context, source),
            RankingError::Lock(err) => write!(f, "ranking lock error: {}", err),
            RankingError::InvalidDocument(msg) => write!(f, "invalid ranking document: {}", msg),
            RankingError::Configuration(msg) => write!(f, "ranking configuration error: {}", msg),
            RankingError::ManagerLookup { hint, message } => write!(
                f,
                "error when trying to get a ranking manager for [{}]: {}",
                hint, message
            ),
            RankingError::Registration(msg) => {
                write!(f, "ranking manager registration failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for RankingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RankingError::Index { source, .. } => Some(source),
            RankingError::Lock(err) => Some(err),
            _ => None,
        }
    }
}

impl From<IndexError> for RankingError {
    fn from(err: IndexError) -> Self {
        RankingError::Index {
            context: "index operation failed".into(),
            source: err,
        }
    }
}

impl From<LockError> for RankingError {
    fn from(err: LockError) -> Self {
        RankingError::Lock(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn out_of_scale_names_vote_scale_and_manager() {
        let err = RankingError::OutOfScale {
            vote: 7,
            scale: 5,
            manager_id: "comments".into(),
        };
        let message = err.to_string();
        assert!(message.contains("[7]"));
        assert!(message.contains("[5]"));
        assert!(message.contains("[comments]"));
    }

    #[test]
    fn index_errors_keep_their_source() {
        let err = RankingError::index("error while removing ranking")(IndexError::Storage(
            "disk full".into(),
        ));
        assert_eq!(
            err.to_string(),
            "error while removing ranking: index storage error: disk full"
        );
        assert!(err.source().is_some());
    }
}
