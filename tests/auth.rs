mod common;

use common::{connected_client, FLAKY_EMAIL, JWT, SESSION_TOKEN};
use neon_client::NeonClientError;
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[tokio::test]
async fn sign_in_keeps_session() {
    let client = connected_client().await;

    let signed_in = client
        .auth()
        .sign_in_email("ann@example.com", "secret")
        .await
        .unwrap();

    assert_eq!(signed_in.token.as_deref(), Some(SESSION_TOKEN));
    assert_eq!(signed_in.user.email, "ann@example.com");
    assert!(client.auth().is_signed_in().await);
    assert_eq!(client.auth().require_user().await.unwrap().id, "u1");
}

#[tokio::test]
async fn wrong_password_surfaces_api_error() {
    let client = connected_client().await;

    let err = client
        .auth()
        .sign_in_email("ann@example.com", "nope")
        .await
        .unwrap_err();

    match err {
        NeonClientError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "INVALID_EMAIL_OR_PASSWORD: Invalid email or password");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!client.auth().is_signed_in().await);
}

#[tokio::test]
async fn session_and_token_follow_sign_in() {
    let client = connected_client().await;
    client
        .auth()
        .sign_up_email("ann@example.com", "secret", "Ann")
        .await
        .unwrap();

    let info = client.auth().get_session().await.unwrap().unwrap();
    assert_eq!(info.session.user_id, "u1");
    assert!(!info.session.is_expired());

    assert_eq!(client.auth().access_token().await.unwrap().as_deref(), Some(JWT));
}

#[tokio::test]
async fn sign_out_clears_session() {
    let client = connected_client().await;
    client
        .auth()
        .sign_in_email("ann@example.com", "secret")
        .await
        .unwrap();

    client.auth().sign_out().await.unwrap();

    assert!(!client.auth().is_signed_in().await);
    assert!(client.auth().access_token().await.unwrap().is_none());
    assert!(client.auth().get_session().await.unwrap().is_none());
}

#[tokio::test]
async fn failed_sign_out_still_clears_session() {
    let client = connected_client().await;
    client
        .auth()
        .sign_in_email(FLAKY_EMAIL, "secret")
        .await
        .unwrap();
    assert!(client.auth().is_signed_in().await);

    let err = client.auth().sign_out().await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert!(!client.auth().is_signed_in().await);
    assert!(client.auth().current_user().await.is_none());
    assert!(client.auth().access_token().await.unwrap().is_none());
}

#[tokio::test]
async fn session_is_shared_between_clones() {
    let client = connected_client().await;
    let other = client.clone();

    client
        .auth()
        .sign_in_email("ann@example.com", "secret")
        .await
        .unwrap();

    assert!(other.auth().is_signed_in().await);
}

#[tokio::test]
async fn health_reports_both_services() {
    let client = connected_client().await;
    let health = client.health().await;

    assert!(health.auth);
    assert!(health.data_api);
    assert!(health.all_healthy());
}

#[tokio::test]
async fn sign_in_logs_leave_out_email() {
    let logs = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let client = connected_client().await;
    client
        .auth()
        .sign_up_email("ann@example.com", "secret", "Ann")
        .await
        .unwrap();
    client
        .auth()
        .sign_in_email("ann@example.com", "secret")
        .await
        .unwrap();

    let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains("Calling Neon Auth sign-in"));
    assert!(!output.contains("ann@example.com"));
}
