//! Error types for the combat layer.

/// Errors raised while loading or looking up combat data.
#[derive(Debug, thiserror::Error)]
pub enum CombatError {
    /// No class template with this id.
    #[error("unknown job template: {0}")]
    UnknownJob(String),

    /// No monster template with this id.
    #[error("unknown monster template: {0}")]
    UnknownMonster(String),

    /// Two templates in the same table share an id.
    #[error("duplicate template id: {0}")]
    DuplicateTemplate(String),

    /// The template table could not be parsed.
    #[error("malformed template table: {0}")]
    Malformed(#[from] serde_json::Error),
}
