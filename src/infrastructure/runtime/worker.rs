//! Async worker - runs in Tokio runtime and executes chain requests

use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::infrastructure::runtime::bridge::{Failure, RuntimeCommand, RuntimeEvent};
use crate::modules::dao::DaoService;

/// Run the async worker loop
///
/// Each command runs as its own task so a transaction waiting for
/// confirmation never blocks reads. Ordering between tasks is not enforced
/// here; the service's in-flight slot serializes mutations.
pub async fn run_async_worker(
    service: Arc<DaoService>,
    cmd_rx: Receiver<RuntimeCommand>,
    evt_tx: Sender<RuntimeEvent>,
) -> Result<()> {
    loop {
        // Process commands (non-blocking)
        loop {
            let cmd = match cmd_rx.try_recv() {
                Ok(cmd) => cmd,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            };
            if cmd == RuntimeCommand::Shutdown {
                tracing::debug!("worker shutting down");
                return Ok(());
            }
            tracing::debug!(?cmd, "runtime command");
            spawn_command(Arc::clone(&service), cmd, evt_tx.clone());
        }

        // Small yield to prevent busy loop
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

fn spawn_command(service: Arc<DaoService>, cmd: RuntimeCommand, evt_tx: Sender<RuntimeEvent>) {
    tokio::spawn(async move {
        match cmd {
            RuntimeCommand::Connect => match service.connect().await {
                Ok(info) => {
                    let _ = evt_tx.send(RuntimeEvent::Connected {
                        endpoint: info.endpoint,
                        chain_id: info.chain_id,
                        account: info.account,
                    });
                }
                Err(err) => {
                    tracing::warn!("connect failed: {err}");
                    let _ = evt_tx.send(RuntimeEvent::ConnectFailed(Failure::from(&err)));
                }
            },
            RuntimeCommand::Disconnect => {
                service.connection().disconnect().await;
                let _ = evt_tx.send(RuntimeEvent::Disconnected);
            }
            RuntimeCommand::RefreshOverview => service.publish_overview(&evt_tx).await,
            RuntimeCommand::FetchProposalCount => service.publish_proposal_count(&evt_tx).await,
            RuntimeCommand::FetchProposals => service.publish_proposals(&evt_tx).await,
            RuntimeCommand::Submit(mutation) => {
                let _ = service.submit(mutation, &evt_tx).await;
            }
            RuntimeCommand::Shutdown => {}
        }
    });
}
