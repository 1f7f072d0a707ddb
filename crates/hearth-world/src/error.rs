//! Error types for the world layer.

use hearth_protocol::LocationId;

/// Errors raised by the world model.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A bookkeeping rule would have been broken, e.g. placing an occupant
    /// that is already somewhere else. Nothing was changed.
    #[error("occupancy invariant violated: {0}")]
    InvariantViolation(String),

    /// The location id is not on the map.
    #[error("unknown location: {0}")]
    UnknownLocation(LocationId),

    /// Two locations on the map share an id.
    #[error("duplicate location: {0}")]
    DuplicateLocation(LocationId),

    /// Only items can be carried.
    #[error("{0} cannot be carried")]
    NotAnItem(String),

    /// The map file could not be parsed.
    #[error("malformed world map: {0}")]
    Malformed(#[from] serde_json::Error),
}
