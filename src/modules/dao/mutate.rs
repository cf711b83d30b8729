//! Mutators: submit, wait for confirmation, refresh what changed

use std::sync::mpsc::Sender;

use alloy::primitives::B256;

use super::DaoService;
use crate::domain::Mutation;
use crate::error::{DaoError, DaoResult};
use crate::infrastructure::ethereum::{DaoContract, PendingTx};
use crate::infrastructure::runtime::{Failure, RuntimeEvent};

impl DaoService {
    /// Run one mutation end to end.
    ///
    /// Emits `TxSubmitted` once the node accepts the transaction, then
    /// `TxConfirmed` or `TxFailed` once it settles, so loading is always
    /// cleared. Only a confirmed mutation triggers the dependent refresh.
    pub async fn submit(
        &self,
        mutation: Mutation,
        evt_tx: &Sender<RuntimeEvent>,
    ) -> DaoResult<B256> {
        let result = self.submit_guarded(mutation, evt_tx).await;
        match &result {
            Ok(hash) => {
                tracing::info!(%hash, %mutation, "transaction confirmed");
                let _ = evt_tx.send(RuntimeEvent::TxConfirmed {
                    mutation,
                    hash: *hash,
                });
                if mutation.refreshes_proposals() {
                    self.publish_proposals(evt_tx).await;
                } else {
                    self.publish_proposal_count(evt_tx).await;
                }
            }
            Err(err) => {
                tracing::warn!(%mutation, "transaction failed: {err}");
                let _ = evt_tx.send(RuntimeEvent::TxFailed {
                    mutation,
                    failure: Failure::from(err),
                });
            }
        }
        result
    }

    async fn submit_guarded(
        &self,
        mutation: Mutation,
        evt_tx: &Sender<RuntimeEvent>,
    ) -> DaoResult<B256> {
        let _slot = self.in_flight.try_lock().map_err(|_| DaoError::Busy)?;

        let handle = self.conn.handle(true).await?;
        let dao = DaoContract::new(self.contracts.dao, &handle);
        let pending: PendingTx = match mutation {
            Mutation::CreateProposal { token_id } => dao.create_proposal(token_id).await?,
            Mutation::Vote {
                proposal_id,
                choice,
            } => dao.vote(proposal_id, choice).await?,
            Mutation::Execute { proposal_id } => dao.execute(proposal_id).await?,
        };

        let _ = evt_tx.send(RuntimeEvent::TxSubmitted {
            mutation,
            hash: pending.hash(),
        });
        pending.confirm().await
    }
}
