//! Protocol behavior tests for the chat client.
//!
//! Each test scripts the server side of a conversation with the mock server
//! and checks the request lines sent, the result of the operation and the
//! session state afterwards.

use chat_rs::mock::{MockHandle, MockServer, MockStream, ScriptedConsole};
use chat_rs::{Action, Error, Handshake, InboxMessage, Menu, Session, SessionState};

/// Attach a session to the scripted server, answering the handshake.
async fn connect(server: MockServer) -> (Session<MockStream>, MockHandle) {
    let (stream, handle) = MockServer::new()
        .expect("sync ", "modeok\n")
        .merge(server)
        .into_stream();
    let mut session = Session::new();
    let handshake = session.attach(stream).await.unwrap();
    assert_eq!(handshake, Handshake::Confirmed);
    (session, handle)
}

/// Connect and log in as alice.
async fn authorize(server: MockServer) -> (Session<MockStream>, MockHandle) {
    let (mut session, handle) =
        connect(MockServer::new().expect("login alice", "loginok\n").merge(server)).await;
    session.login("alice").await.unwrap();
    (session, handle)
}

#[tokio::test]
async fn test_handshake_is_permissive() {
    let (stream, handle) = MockServer::new().expect("sync ", "hello there\n").into_stream();
    let mut session = Session::new();

    let handshake = session.attach(stream).await.unwrap();
    assert_eq!(handshake, Handshake::Unexpected("hello there".to_string()));
    assert_eq!(session.state(), SessionState::Connected);
    assert!(!handle.is_closed());
}

#[tokio::test]
async fn test_handshake_stream_failure_still_connects() {
    let (stream, _handle) = MockServer::new().fail_writes().into_stream();
    let mut session = Session::new();

    let handshake = session.attach(stream).await.unwrap();
    assert!(matches!(handshake, Handshake::Interrupted(Error::Io(_))));
    assert_eq!(session.state(), SessionState::Connected);
}

#[tokio::test]
async fn test_login_ok() {
    let (mut session, handle) = connect(MockServer::new().expect("login alice", "loginok\n")).await;

    session.login("alice").await.unwrap();
    assert_eq!(session.state(), SessionState::Authorized);
    assert_eq!(handle.sent_lines(), vec!["sync ", "login alice"]);
}

#[tokio::test]
async fn test_login_format_error() {
    let (mut session, _handle) = connect(
        MockServer::new().expect("login al ice", "loginerr incorrect username format\n"),
    )
    .await;

    let result = session.login("al ice").await;
    assert_eq!(
        result,
        Err(Error::Rejected {
            command: "login",
            reason: "incorrect username format".to_string(),
        })
    );
    assert_eq!(session.state(), SessionState::Connected);
}

#[tokio::test]
async fn test_login_unexpected_reply() {
    let (mut session, _handle) = connect(MockServer::new().expect("login alice", "msgok\n")).await;

    let result = session.login("alice").await;
    assert!(matches!(result, Err(Error::InvalidResponse(_))));
    assert_eq!(session.state(), SessionState::Connected);
}

#[tokio::test]
async fn test_login_stream_failure() {
    let (mut session, _handle) = connect(MockServer::new().expect("login alice", "logi")).await;

    let result = session.login("alice").await;
    assert_eq!(result, Err(Error::ConnectionClosed));
    assert_eq!(session.state(), SessionState::Connected);
}

#[tokio::test]
async fn test_login_reply_with_other_keyword() {
    let (mut session, _handle) =
        connect(MockServer::new().expect("login alice", "inbox x\n")).await;

    let result = session.login("alice").await;
    assert_eq!(
        result,
        Err(Error::InvalidResponse(
            "unexpected login response: inbox x".to_string()
        ))
    );
    assert_eq!(session.state(), SessionState::Connected);
}

#[tokio::test]
async fn test_public_message() {
    let (mut session, handle) = connect(
        MockServer::new()
            .expect("msg hello everyone", "msgok 4\n")
            .expect("msg again", "msgerr spam\n")
            .expect("msg once more", "foo\n"),
    )
    .await;

    session.public_message("hello everyone").await.unwrap();
    assert!(matches!(
        session.public_message("again").await,
        Err(Error::Rejected { command: "msg", .. })
    ));
    assert!(matches!(
        session.public_message("once more").await,
        Err(Error::InvalidResponse(_))
    ));
    assert!(handle.is_complete());
}

#[tokio::test]
async fn test_public_message_stream_failure() {
    let (mut session, _handle) =
        connect(MockServer::new().expect("msg hello", "").fail_reads()).await;

    let err = session.public_message("hello").await.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(session.state(), SessionState::Connected);
}

#[tokio::test]
async fn test_private_message_single_recipient() {
    let (mut session, handle) =
        authorize(MockServer::new().expect("privmsg bob hi bob", "msgok 1\n")).await;

    let delivery = session.private_message("bob", "hi bob").await.unwrap();
    assert_eq!(delivery.recipients, 1);
    assert!(delivery.is_single());
    assert!(handle.is_complete());
}

#[tokio::test]
async fn test_private_message_many_recipients_is_success() {
    let (mut session, _handle) =
        authorize(MockServer::new().expect("privmsg bob hi", "msgok 3\n")).await;

    let delivery = session.private_message("bob", "hi").await.unwrap();
    assert_eq!(delivery.recipients, 3);
    assert!(!delivery.is_single());
}

#[tokio::test]
async fn test_private_message_failures() {
    let (mut session, _handle) = authorize(
        MockServer::new()
            .expect("privmsg nobody hi", "msgerr\n")
            .expect("privmsg bob hi", "foo\n")
            .expect("privmsg bob hey", "msgok many\n"),
    )
    .await;

    assert!(matches!(
        session.private_message("nobody", "hi").await,
        Err(Error::Rejected {
            command: "privmsg",
            ..
        })
    ));
    assert!(matches!(
        session.private_message("bob", "hi").await,
        Err(Error::InvalidResponse(_))
    ));
    assert!(matches!(
        session.private_message("bob", "hey").await,
        Err(Error::InvalidResponse(_))
    ));
    assert_eq!(session.state(), SessionState::Authorized);
}

#[tokio::test]
async fn test_private_message_count_with_leading_zero() {
    let (mut session, _handle) =
        authorize(MockServer::new().expect("privmsg bob hi", "msgok 01\n")).await;

    let delivery = session.private_message("bob", "hi").await.unwrap();
    assert!(delivery.is_single());
}

#[tokio::test]
async fn test_private_message_stream_failure() {
    let (mut session, _handle) =
        authorize(MockServer::new().expect("privmsg bob hi", "msgok")).await;

    let err = session.private_message("bob", "hi").await.unwrap_err();
    assert_eq!(err, Error::ConnectionClosed);
    assert!(err.is_transport());
    assert_eq!(session.state(), SessionState::Authorized);
}

#[tokio::test]
async fn test_private_message_requires_authorization() {
    let (mut session, handle) = connect(MockServer::new()).await;
    let written = handle.bytes_written();

    let result = session.private_message("bob", "hi").await;
    assert_eq!(
        result,
        Err(Error::IllegalState {
            action: "privmsg",
            state: SessionState::Connected,
        })
    );
    assert_eq!(handle.bytes_written(), written);
}

#[tokio::test]
async fn test_catalog_rejects_private_message_without_io() {
    let (session, handle) = connect(MockServer::new()).await;
    let written = handle.bytes_written();

    let console = ScriptedConsole::new(["bob", "hi"]);
    let mut menu = Menu::with_session(session, console, Default::default());

    assert!(!menu.perform(Action::PrivateMessage).await);
    assert_eq!(handle.bytes_written(), written);
    assert_eq!(menu.console().remaining_answers(), 2);
}

#[tokio::test]
async fn test_users() {
    let (mut session, _handle) =
        connect(MockServer::new().expect("users ", "users alice bob carol\r\n")).await;

    let users = session.users().await.unwrap();
    assert_eq!(users, vec!["alice", "bob", "carol"]);
}

#[tokio::test]
async fn test_users_stream_failure() {
    let (mut session, _handle) =
        authorize(MockServer::new().expect("users ", "").fail_reads()).await;

    let err = session.users().await.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(session.state(), SessionState::Authorized);
}

#[tokio::test]
async fn test_inbox_empty_reads_nothing_more() {
    let (mut session, handle) =
        connect(MockServer::new().expect("inbox ", "inbox 0\nnot for the inbox\n")).await;

    let messages = session.inbox().await.unwrap();
    assert!(messages.is_empty());
    assert_eq!(handle.unread(), "not for the inbox\n".len());
}

#[tokio::test]
async fn test_inbox_messages_in_order() {
    let (mut session, handle) = connect(MockServer::new().expect(
        "inbox ",
        "inbox 2\r\nmsg alice hello all\r\nprivmsg bob see you at noon\r\n",
    ))
    .await;

    let messages = session.inbox().await.unwrap();
    assert_eq!(
        messages,
        vec![
            InboxMessage {
                sender: "alice".to_string(),
                body: "hello all".to_string(),
            },
            InboxMessage {
                sender: "bob".to_string(),
                body: "see you at noon".to_string(),
            },
        ]
    );
    assert_eq!(handle.unread(), 0);
}

#[tokio::test]
async fn test_inbox_failure_on_second_message() {
    let (mut session, _handle) = connect(
        MockServer::new()
            .expect("inbox ", "inbox 2\nmsg alice hello all\n")
            .fail_reads(),
    )
    .await;

    let result = session.inbox().await;
    assert!(matches!(result, Err(Error::Io(_))));
    assert_eq!(session.state(), SessionState::Connected);
}

#[tokio::test]
async fn test_inbox_header_stream_failure() {
    let (mut session, _handle) =
        connect(MockServer::new().expect("inbox ", "inbox 3").fail_reads()).await;

    let err = session.inbox().await.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(session.state(), SessionState::Connected);
}

#[tokio::test]
async fn test_inbox_huge_count_ends_with_stream() {
    let (mut session, handle) = connect(
        MockServer::new().expect("inbox ", "inbox 4294967295\nmsg alice hi\n"),
    )
    .await;

    let result = session.inbox().await;
    assert_eq!(result, Err(Error::ConnectionClosed));
    assert_eq!(session.state(), SessionState::Connected);
    assert_eq!(handle.unread(), 0);
}

#[tokio::test]
async fn test_inbox_non_numeric_count() {
    let (mut session, _handle) = connect(MockServer::new().expect("inbox ", "inbox many\n")).await;

    let result = session.inbox().await;
    assert!(matches!(result, Err(Error::InvalidResponse(_))));
}

#[tokio::test]
async fn test_disconnect_resets_state_even_if_close_fails() {
    let (mut session, handle) = authorize(MockServer::new().fail_close()).await;

    let result = session.disconnect().await;
    assert!(matches!(result, Err(Error::Connection(_))));
    assert_eq!(session.state(), SessionState::Disconnected);
    assert!(!handle.is_closed());
}

#[tokio::test]
async fn test_operations_after_disconnect_are_illegal() {
    let (mut session, _handle) = connect(MockServer::new()).await;
    session.disconnect().await.unwrap();

    assert!(matches!(
        session.users().await,
        Err(Error::IllegalState {
            state: SessionState::Disconnected,
            ..
        })
    ));
    assert!(matches!(
        session.disconnect().await,
        Err(Error::IllegalState { .. })
    ));
}
