//! Integration tests for the Hearth server: full connection flows over a
//! real WebSocket.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use hearth::prelude::*;
use hearth_combat::Growth;
use hearth_protocol::CharacterId;
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Fixture world
// =========================================================================

fn world() -> Arc<WorldMap> {
    let square = Location {
        id: "town-square".into(),
        name: "Town Square".into(),
        description: "The central square of a small town.".into(),
        exits: [("east".to_string(), LocationId::from("market"))].into(),
    };
    let market = Location {
        id: "market".into(),
        name: "Market".into(),
        description: "A bustling market.".into(),
        exits: [("west".to_string(), LocationId::from("town-square"))].into(),
    };
    Arc::new(WorldMap::new(vec![square, market], "town-square".into()).unwrap())
}

fn templates() -> Arc<TemplateTable> {
    let warrior = StatTemplate {
        id: "warrior".into(),
        base: Stats {
            hp: 50,
            attack: 10,
            guard: 5,
            agility: 5,
        },
        growth: Growth::default(),
    };
    Arc::new(TemplateTable::new(vec![warrior], vec![]).unwrap())
}

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a server on a random port with one stored character ("u-1",
/// Ayla) and returns the address.
async fn start_server() -> String {
    let store = MemoryCharacterStore::with_records([CharacterRecord::new(
        CharacterId::new("u-1"),
        "Ayla",
        "Red Bird",
        "warrior",
    )]);
    let server = HearthServerBuilder::new()
        .bind("127.0.0.1:0")
        .blocked_words(["darn"])
        .combat_seed(7)
        .build(world(), templates(), DevAuthenticator, store)
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

/// Connects and consumes the welcome frame.
async fn connect(addr: &str) -> ClientWs {
    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    match recv(&mut ws).await {
        ServerMessage::Welcome { .. } => {}
        other => panic!("expected Welcome, got {other:?}"),
    }
    ws
}

async fn send(ws: &mut ClientWs, msg: &ClientMessage) {
    let json = serde_json::to_string(msg).expect("encode");
    ws.send(Message::Text(json.into())).await.expect("send");
}

async fn recv(ws: &mut ClientWs) -> ServerMessage {
    let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
        .await
        .expect("timed out waiting for a frame")
        .expect("stream ended")
        .expect("websocket error");
    serde_json::from_slice(&msg.into_data()).expect("decode")
}

async fn recv_event(ws: &mut ClientWs) -> GameEvent {
    match recv(ws).await {
        ServerMessage::Event(event) => event,
        other => panic!("expected an event, got {other:?}"),
    }
}

/// Logs in with `token` and consumes the welcome-back and room frames.
async fn login(ws: &mut ClientWs, token: &str) {
    send(
        ws,
        &ClientMessage::Login {
            id_token: token.into(),
        },
    )
    .await;
    assert!(matches!(recv_event(ws).await, GameEvent::LoggedIn { .. }));
    assert!(matches!(recv_event(ws).await, GameEvent::Room(_)));
}

fn command(text: &str) -> ClientMessage {
    ClientMessage::Command { text: text.into() }
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_welcome_sent_on_connect() {
    let addr = start_server().await;
    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .unwrap();

    assert_eq!(
        recv(&mut ws).await,
        ServerMessage::Welcome {
            text: "Welcome to the MUD! Please register or log in.".into()
        }
    );
}

#[tokio::test]
async fn test_registration_flow_creates_and_logs_in() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send(
        &mut ws,
        &ClientMessage::InitiateRegistration {
            character_name: "  Bram ".into(),
            clan: "Green Frog".into(),
        },
    )
    .await;
    assert_eq!(recv(&mut ws).await, ServerMessage::CreateUser);

    send(
        &mut ws,
        &ClientMessage::CompleteRegistration {
            id_token: "u-2".into(),
        },
    )
    .await;
    assert_eq!(recv(&mut ws).await, ServerMessage::RegistrationComplete);
    assert_eq!(
        recv_event(&mut ws).await,
        GameEvent::LoggedIn {
            name: "Bram".into(),
            location: "Town Square".into(),
        }
    );
    assert!(matches!(recv_event(&mut ws).await, GameEvent::Room(_)));
}

#[tokio::test]
async fn test_registration_invalid_clan_rejected() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send(
        &mut ws,
        &ClientMessage::InitiateRegistration {
            character_name: "Bram".into(),
            clan: "Purple Cow".into(),
        },
    )
    .await;

    assert_eq!(
        recv(&mut ws).await,
        ServerMessage::RegistrationError {
            message: "Invalid clan".into()
        }
    );
}

#[tokio::test]
async fn test_registration_filtered_name_rejected() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send(
        &mut ws,
        &ClientMessage::InitiateRegistration {
            character_name: "Darn".into(),
            clan: "Red Bird".into(),
        },
    )
    .await;

    assert!(matches!(
        recv(&mut ws).await,
        ServerMessage::RegistrationError { .. }
    ));
}

#[tokio::test]
async fn test_complete_registration_without_initiate_fails() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send(
        &mut ws,
        &ClientMessage::CompleteRegistration {
            id_token: "u-9".into(),
        },
    )
    .await;

    assert_eq!(
        recv(&mut ws).await,
        ServerMessage::RegistrationError {
            message: "Failed to complete registration: \
                      Registration data not found"
                .into()
        }
    );
}

#[tokio::test]
async fn test_login_stored_character_enters_world() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send(
        &mut ws,
        &ClientMessage::Login {
            id_token: "u-1".into(),
        },
    )
    .await;

    assert_eq!(
        recv_event(&mut ws).await,
        GameEvent::LoggedIn {
            name: "Ayla".into(),
            location: "Town Square".into(),
        }
    );
    let GameEvent::Room(view) = recv_event(&mut ws).await else {
        panic!("expected a room view");
    };
    assert_eq!(view.exits, vec!["east"]);
}

#[tokio::test]
async fn test_login_unknown_character_fails() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send(
        &mut ws,
        &ClientMessage::Login {
            id_token: "nobody".into(),
        },
    )
    .await;

    assert_eq!(
        recv(&mut ws).await,
        ServerMessage::LoginFailed {
            message: "Character not found.".into()
        }
    );
}

#[tokio::test]
async fn test_login_twice_from_two_connections_refused() {
    let addr = start_server().await;
    let mut first = connect(&addr).await;
    login(&mut first, "u-1").await;

    let mut second = connect(&addr).await;
    send(
        &mut second,
        &ClientMessage::Login {
            id_token: "u-1".into(),
        },
    )
    .await;

    assert_eq!(
        recv(&mut second).await,
        ServerMessage::LoginFailed {
            message: "You are already logged in from another session.".into()
        }
    );
}

#[tokio::test]
async fn test_command_before_login_rejected() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send(&mut ws, &command("look")).await;

    match recv(&mut ws).await {
        ServerMessage::Error { code, message } => {
            assert_eq!(code, 401);
            assert_eq!(message, "You must be logged in to perform commands.");
        }
        other => panic!("expected Error 401, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_frame_reported_and_connection_survives() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    ws.send(Message::Text("not json".into())).await.unwrap();
    assert!(matches!(
        recv(&mut ws).await,
        ServerMessage::Error { code: 400, .. }
    ));

    login(&mut ws, "u-1").await;
    send(&mut ws, &command("who")).await;
    assert_eq!(recv_event(&mut ws).await, GameEvent::Alone);
}

#[tokio::test]
async fn test_say_and_move_seen_by_other_player() {
    let addr = start_server().await;
    let mut ayla = connect(&addr).await;
    login(&mut ayla, "u-1").await;

    let mut bram = connect(&addr).await;
    send(
        &mut bram,
        &ClientMessage::InitiateRegistration {
            character_name: "Bram".into(),
            clan: "Blue Flower".into(),
        },
    )
    .await;
    assert_eq!(recv(&mut bram).await, ServerMessage::CreateUser);
    send(
        &mut bram,
        &ClientMessage::CompleteRegistration {
            id_token: "u-2".into(),
        },
    )
    .await;
    assert_eq!(recv(&mut bram).await, ServerMessage::RegistrationComplete);
    recv_event(&mut bram).await;
    recv_event(&mut bram).await;
    assert_eq!(
        recv_event(&mut ayla).await,
        GameEvent::Arrived {
            name: "Bram".into(),
            from: None,
        }
    );

    send(&mut bram, &command("say hello")).await;
    let said = GameEvent::Said {
        speaker: "Bram".into(),
        text: "hello".into(),
    };
    assert_eq!(recv_event(&mut bram).await, said);
    assert_eq!(recv_event(&mut ayla).await, said);

    send(&mut bram, &command("e")).await;
    assert_eq!(
        recv_event(&mut ayla).await,
        GameEvent::Departed {
            name: "Bram".into(),
            direction: "east".into(),
        }
    );
    assert_eq!(
        recv_event(&mut bram).await,
        GameEvent::Moved {
            direction: "east".into(),
            destination: "Market".into(),
        }
    );
}

#[tokio::test]
async fn test_quit_announces_departure_and_closes() {
    let addr = start_server().await;
    let mut ayla = connect(&addr).await;
    login(&mut ayla, "u-1").await;

    let mut bram = connect(&addr).await;
    send(
        &mut bram,
        &ClientMessage::InitiateRegistration {
            character_name: "Bram".into(),
            clan: "Blue Flower".into(),
        },
    )
    .await;
    recv(&mut bram).await;
    send(
        &mut bram,
        &ClientMessage::CompleteRegistration {
            id_token: "u-2".into(),
        },
    )
    .await;
    recv(&mut bram).await;
    recv_event(&mut ayla).await; // Bram arrives

    send(&mut ayla, &ClientMessage::Quit).await;

    // Bram may still be reading their own login frames; skip to the news.
    let vanished = GameEvent::Vanished {
        name: "Ayla".into(),
    };
    let mut seen = false;
    for _ in 0..4 {
        if recv_event(&mut bram).await == vanished {
            seen = true;
            break;
        }
    }
    assert!(seen, "Bram should see Ayla vanish");

    let result = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match ayla.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await;
    assert!(result.is_ok(), "server should close the connection");
}

#[tokio::test]
async fn test_character_saved_on_disconnect_keeps_location() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;
    login(&mut ws, "u-1").await;
    send(&mut ws, &command("east")).await;
    recv_event(&mut ws).await; // Moved
    recv_event(&mut ws).await; // Room

    ws.close(None).await.unwrap();
    // Let the guard disconnect and save.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let mut again = connect(&addr).await;
    send(
        &mut again,
        &ClientMessage::Login {
            id_token: "u-1".into(),
        },
    )
    .await;
    assert_eq!(
        recv_event(&mut again).await,
        GameEvent::LoggedIn {
            name: "Ayla".into(),
            location: "Market".into(),
        }
    );
}
