//! Domain error types.

/// Top-level error type for fundscreen.
#[derive(Debug, thiserror::Error)]
pub enum ScreenError {
    #[error("transport error: {reason}")]
    Transport { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("table error: {reason}")]
    Table { reason: String },

    #[error("cannot determine join key: none of [{candidates}] present in both tables")]
    MergeKeyUnresolved { candidates: String },

    #[error("cache error: {reason}")]
    Cache { reason: String },

    #[error("failed to persist result to {path}: {reason}")]
    Persistence { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&ScreenError> for std::process::ExitCode {
    fn from(err: &ScreenError) -> Self {
        let code: u8 = match err {
            ScreenError::Io(_) => 1,
            ScreenError::ConfigParse { .. } => 2,
            ScreenError::Transport { .. } => 3,
            ScreenError::Table { .. } | ScreenError::MergeKeyUnresolved { .. } => 4,
            ScreenError::Cache { .. } | ScreenError::Persistence { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_key_error_names_candidates() {
        let err = ScreenError::MergeKeyUnresolved {
            candidates: "symbol, code".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("cannot determine join key"));
        assert!(msg.contains("symbol, code"));
    }

    #[test]
    fn exit_codes_group_by_category() {
        let transport = ScreenError::Transport {
            reason: "x".into(),
        };
        let config = ScreenError::ConfigParse {
            file: "screen.ini".into(),
            reason: "bad section".into(),
        };
        assert_ne!(
            format!("{:?}", std::process::ExitCode::from(&transport)),
            format!("{:?}", std::process::ExitCode::from(&config)),
        );
    }
}
