//! Turning messages into frame bytes and back.
//!
//! The server holds one [`Codec`] and never looks at the format itself.
//! [`JsonCodec`] is the only implementation: JSON keeps a text adventure
//! debuggable from a browser console.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Longest client frame [`JsonCodec`] will try to parse, in bytes.
///
/// A command is one line of typing; anything near this size is not a
/// player.
pub const MAX_FRAME_LEN: usize = 4096;

/// Message format for every connection on the server.
///
/// One instance is shared by all connection tasks, hence the bounds.
pub trait Codec: Send + Sync + 'static {
    /// # Errors
    /// [`ProtocolError::Encode`] if `value` can't be represented.
    fn encode<T: Serialize>(&self, value: &T)
    -> Result<Vec<u8>, ProtocolError>;

    /// Parses one frame. The result owns its data, so the frame buffer can
    /// go as soon as this returns.
    ///
    /// # Errors
    /// - [`ProtocolError::FrameTooLarge`] if the frame is over the limit
    /// - [`ProtocolError::Decode`] if it isn't a well-formed `T`
    fn decode<T: DeserializeOwned>(&self, data: &[u8])
    -> Result<T, ProtocolError>;
}

/// JSON on the wire via `serde_json`. Needs the `json` feature (default).
///
/// ```rust
/// use hearth_protocol::{ClientMessage, Codec, JsonCodec};
///
/// let frame = br#"{"type":"Command","text":"look"}"#;
/// let msg: ClientMessage = JsonCodec.decode(frame).unwrap();
/// assert_eq!(msg, ClientMessage::Command { text: "look".into() });
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T)
    -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8])
    -> Result<T, ProtocolError> {
        if data.len() > MAX_FRAME_LEN {
            return Err(ProtocolError::FrameTooLarge {
                len: data.len(),
                max: MAX_FRAME_LEN,
            });
        }
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ClientMessage, GameEvent, ServerMessage};

    #[test]
    fn test_decode_client_command_from_browser_json() {
        // This is exactly what the browser client sends for a command.
        let raw = br#"{"type":"Command","text":"say hello there"}"#;

        let msg: ClientMessage = JsonCodec.decode(raw).expect("should decode");

        assert_eq!(
            msg,
            ClientMessage::Command {
                text: "say hello there".into()
            }
        );
    }

    #[test]
    fn test_decode_unknown_type_returns_decode_error() {
        let raw = br#"{"type":"Teleport","to":"moon"}"#;

        let result: Result<ClientMessage, _> = JsonCodec.decode(raw);

        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_truncated_json_returns_decode_error() {
        let result: Result<ClientMessage, _> = JsonCodec.decode(b"{\"type\":");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_oversized_frame_rejected_before_parsing() {
        let text = "a".repeat(MAX_FRAME_LEN);
        let raw = format!(r#"{{"type":"Command","text":"{text}"}}"#);

        let result: Result<ClientMessage, _> = JsonCodec.decode(raw.as_bytes());

        assert!(matches!(
            result,
            Err(ProtocolError::FrameTooLarge { max: MAX_FRAME_LEN, .. })
        ));
    }

    #[test]
    fn test_encode_event_uses_adjacent_tagging() {
        let msg = ServerMessage::Event(GameEvent::Alone);

        let bytes = JsonCodec.encode(&msg).expect("should encode");
        let value: serde_json::Value =
            serde_json::from_slice(&bytes).expect("valid json");

        assert_eq!(value["type"], "Event");
        assert_eq!(value["data"]["kind"], "Alone");
    }
}
