//! Error types for the realm layer.

use hearth_combat::CombatError;
use hearth_session::SessionError;
use hearth_world::WorldError;

/// How a rejected command should be reported to the client.
///
/// Each class maps to a numeric code in the `ServerMessage::Error` frame,
/// borrowed from the HTTP status numbers players' tooling already knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The command was malformed or made no sense here.
    Validation,
    /// The thing the command named doesn't exist here.
    NotFound,
    /// The command clashes with the current state.
    Conflict,
    /// The session hasn't logged in.
    Unauthenticated,
}

impl ErrorClass {
    /// The wire code for this class.
    pub fn code(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::Unauthenticated => 401,
            Self::NotFound => 404,
            Self::Conflict => 409,
        }
    }
}

/// Why a player command was rejected.
///
/// The `Display` text is what the player sees, so it is written for them.
/// A rejected command never changes any state.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("You must be logged in to perform commands.")]
    NotAuthenticated,

    #[error("You say nothing. What do you want to say?")]
    EmptySpeech,

    /// The content filter refused the text.
    #[error("You consider washing your mouth with soap.")]
    Disallowed,

    /// A verb that needs an argument got none. Carries the prompt, e.g.
    /// "Go where?".
    #[error("{0}")]
    MissingArgument(&'static str),

    #[error("You cannot go {0} from here.")]
    NoSuchExit(String),

    #[error("You don't see {0} here.")]
    NoSuchTarget(String),

    /// The attacker is at zero hit points.
    #[error("You are too badly hurt to fight.")]
    Incapacitated,

    #[error(
        "Unknown command. Try: say, look, go, north, south, east, west, \
         up, down, who, attack, inventory, talk"
    )]
    UnknownCommand(String),

    /// The registry refused a change. Should not happen for a well-formed
    /// command; reported as a conflict.
    #[error("That didn't work: {0}")]
    Session(#[from] SessionError),
}

impl CommandError {
    /// How this rejection is classified.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::NotAuthenticated => ErrorClass::Unauthenticated,
            Self::EmptySpeech
            | Self::Disallowed
            | Self::MissingArgument(_)
            | Self::UnknownCommand(_) => ErrorClass::Validation,
            Self::NoSuchExit(_) | Self::NoSuchTarget(_) => ErrorClass::NotFound,
            Self::Incapacitated | Self::Session(_) => ErrorClass::Conflict,
        }
    }

    /// The wire code for this rejection.
    pub fn code(&self) -> u16 {
        self.class().code()
    }
}

/// Errors from realm operations other than command dispatch.
#[derive(Debug, thiserror::Error)]
pub enum RealmError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Combat(#[from] CombatError),

    #[error(transparent)]
    World(#[from] WorldError),

    #[error(transparent)]
    Command(#[from] CommandError),

    /// The realm actor has stopped.
    #[error("realm is unavailable")]
    Unavailable,
}
