//! Connection manager behaviour against an in-memory chain

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use daodash::core::{reduce, Action, ViewState};
use daodash::error::DaoError;
use daodash::infrastructure::runtime::{Failure, RuntimeEvent};

use common::{manager, FakeChain, MEMBER, RINKEBY};

#[tokio::test]
async fn test_connect_reports_account_and_network() {
    let (conn, opens) = manager(Arc::new(FakeChain::new(RINKEBY)), RINKEBY);

    let info = conn.connect().await.unwrap();
    assert_eq!(info.chain_id, RINKEBY);
    assert_eq!(info.account, Some(MEMBER));
    assert_eq!(info.endpoint, "fake://node");
    assert!(conn.is_connected().await);
    assert_eq!(opens.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_connection_is_reused_until_disconnect() {
    let (conn, opens) = manager(Arc::new(FakeChain::new(RINKEBY)), RINKEBY);

    conn.connect().await.unwrap();
    conn.connect().await.unwrap();
    conn.handle(false).await.unwrap();
    conn.handle(true).await.unwrap();
    assert_eq!(opens.load(Ordering::SeqCst), 1);

    conn.disconnect().await;
    assert!(!conn.is_connected().await);

    // Reads do not quietly reconnect
    assert!(matches!(
        conn.handle(false).await,
        Err(DaoError::NotConnected)
    ));
    assert!(matches!(conn.handle(true).await, Err(DaoError::NotConnected)));
    assert!(!conn.is_connected().await);
    assert_eq!(opens.load(Ordering::SeqCst), 1);

    conn.connect().await.unwrap();
    conn.handle(false).await.unwrap();
    assert_eq!(opens.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_handle_before_connect_is_not_connected() {
    let (conn, opens) = manager(Arc::new(FakeChain::new(RINKEBY)), RINKEBY);
    assert!(matches!(
        conn.handle(false).await,
        Err(DaoError::NotConnected)
    ));
    assert_eq!(opens.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_wrong_network_fails_and_caches_nothing() {
    let (conn, opens) = manager(Arc::new(FakeChain::new(1)), RINKEBY);

    let err = conn.connect().await.unwrap_err();
    assert!(matches!(
        err,
        DaoError::WrongNetwork {
            expected: RINKEBY,
            actual: 1
        }
    ));
    assert!(!conn.is_connected().await);

    // Nothing was cached, so requests are refused without reopening
    assert!(matches!(
        conn.handle(false).await,
        Err(DaoError::NotConnected)
    ));
    assert_eq!(opens.load(Ordering::SeqCst), 1);

    // The UI stays disconnected and shows the alert
    let (state, commands) = reduce(
        &ViewState::new(),
        Action::Runtime(RuntimeEvent::ConnectFailed(Failure::from(&err))),
    );
    assert!(!state.wallet_connected);
    assert!(commands.is_empty());
    let alert = state.alert.unwrap();
    assert!(alert.contains("rinkeby"), "{alert}");
}

#[tokio::test]
async fn test_signer_required_for_signing_handle() {
    let mut chain = FakeChain::new(RINKEBY);
    chain.signer = None;
    let (conn, _) = manager(Arc::new(chain), RINKEBY);

    let info = conn.connect().await.unwrap();
    assert_eq!(info.account, None);
    let handle = conn.handle(false).await.unwrap();
    assert_eq!(handle.signer(), None);
    assert!(matches!(conn.handle(true).await, Err(DaoError::NoSigner)));
}
