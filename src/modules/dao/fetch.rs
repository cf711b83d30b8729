//! Data fetchers

use std::sync::mpsc::Sender;

use alloy::primitives::U256;

use super::DaoService;
use crate::domain::Proposal;
use crate::error::{DaoError, DaoResult};
use crate::infrastructure::ethereum::{ConnectionInfo, DaoContract, NftContract};
use crate::infrastructure::runtime::{Failure, FetchKind, RuntimeEvent};

impl DaoService {
    /// Open the session connection on the required network
    pub async fn connect(&self) -> DaoResult<ConnectionInfo> {
        self.conn.connect().await
    }

    /// DAO contract balance in wei
    pub async fn treasury_balance(&self) -> DaoResult<U256> {
        let handle = self.conn.handle(false).await?;
        DaoContract::new(self.contracts.dao, &handle)
            .treasury_balance()
            .await
    }

    pub async fn proposal_count(&self) -> DaoResult<u64> {
        let handle = self.conn.handle(false).await?;
        DaoContract::new(self.contracts.dao, &handle)
            .num_proposals()
            .await
    }

    /// Membership tokens owned by the signing account. Needs the signer for its address.
    pub async fn membership_balance(&self) -> DaoResult<u64> {
        let handle = self.conn.handle(true).await?;
        let owner = handle.signer().ok_or(DaoError::NoSigner)?;
        NftContract::new(self.contracts.nft, &handle)
            .balance_of(owner)
            .await
    }

    pub async fn proposal_by_id(&self, id: u64) -> DaoResult<Proposal> {
        let handle = self.conn.handle(false).await?;
        let raw = DaoContract::new(self.contracts.dao, &handle)
            .proposal(id)
            .await?;
        Proposal::from_raw(id, raw).map_err(DaoError::Call)
    }

    /// Every proposal in `[0, count)`, fetched one by one in ascending id order
    pub async fn all_proposals(&self) -> DaoResult<Vec<Proposal>> {
        let count = self.proposal_count().await?;
        // The count comes from the contract; never size an allocation by it
        let mut proposals = Vec::new();
        for id in 0..count {
            proposals.push(self.proposal_by_id(id).await?);
        }
        tracing::debug!(count, "proposals fetched");
        Ok(proposals)
    }

    /// Fetch the header values independently; one failing does not hide the others
    pub async fn publish_overview(&self, evt_tx: &Sender<RuntimeEvent>) {
        let (treasury, membership, count) = futures::future::join3(
            self.treasury_balance(),
            self.membership_balance(),
            self.proposal_count(),
        )
        .await;

        publish(evt_tx, FetchKind::Treasury, treasury.map(RuntimeEvent::TreasuryBalance));
        publish(evt_tx, FetchKind::Membership, membership.map(RuntimeEvent::MembershipBalance));
        publish(evt_tx, FetchKind::ProposalCount, count.map(RuntimeEvent::ProposalCount));
    }

    pub async fn publish_proposal_count(&self, evt_tx: &Sender<RuntimeEvent>) {
        let count = self.proposal_count().await;
        publish(evt_tx, FetchKind::ProposalCount, count.map(RuntimeEvent::ProposalCount));
    }

    /// Rebuild the list; the count is republished so the header matches it
    pub async fn publish_proposals(&self, evt_tx: &Sender<RuntimeEvent>) {
        match self.all_proposals().await {
            Ok(proposals) => {
                let _ = evt_tx.send(RuntimeEvent::ProposalCount(proposals.len() as u64));
                let _ = evt_tx.send(RuntimeEvent::Proposals(proposals));
            }
            Err(err) => publish(evt_tx, FetchKind::Proposals, Err(err)),
        }
    }
}

fn publish(evt_tx: &Sender<RuntimeEvent>, what: FetchKind, result: DaoResult<RuntimeEvent>) {
    let event = match result {
        Ok(event) => event,
        Err(err) => {
            tracing::warn!(what = what.label(), "fetch failed: {err}");
            RuntimeEvent::FetchFailed {
                what,
                failure: Failure::from(&err),
            }
        }
    };
    let _ = evt_tx.send(event);
}
