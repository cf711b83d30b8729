//! DAO service: fetchers, mutators and the events they publish

mod common;

use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::sync::Arc;

use alloy::primitives::U256;
use alloy::sol_types::SolCall;
use chrono::Utc;
use tokio::sync::Notify;

use daodash::core::{reduce, Action, ViewState};
use daodash::domain::{Mutation, VoteChoice};
use daodash::error::DaoError;
use daodash::infrastructure::runtime::{run_async_worker, FetchKind, RuntimeCommand, RuntimeEvent};

use common::{
    disconnected_service, drain, next_event, service, FakeChain, IDaoGovernor, StoredProposal,
    RINKEBY,
};

fn stored(token: u64, deadline_secs: u64) -> StoredProposal {
    StoredProposal {
        nft_token_id: token,
        deadline_secs,
        yay: 0,
        nay: 0,
        executed: false,
    }
}

fn member_state() -> ViewState {
    ViewState {
        wallet_connected: true,
        membership_balance: 1,
        ..ViewState::default()
    }
}

fn apply(state: ViewState, event: RuntimeEvent) -> ViewState {
    reduce(&state, Action::Runtime(event)).0
}

#[tokio::test]
async fn test_all_proposals_empty() {
    let chain = Arc::new(FakeChain::new(RINKEBY));
    let svc = service(chain.clone()).await;

    assert_eq!(svc.proposal_count().await.unwrap(), 0);
    assert!(svc.all_proposals().await.unwrap().is_empty());
    assert_eq!(chain.calls_to(IDaoGovernor::proposalsCall::SELECTOR), 0);
}

#[tokio::test]
async fn test_all_proposals_in_id_order() {
    let chain = Arc::new(FakeChain::new(RINKEBY).with_proposals(vec![
        stored(7, 1_700_000_000),
        stored(8, 1_700_000_100),
        stored(9, 1_700_000_200),
    ]));
    let svc = service(chain.clone()).await;

    let proposals = svc.all_proposals().await.unwrap();
    let ids: Vec<u64> = proposals.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![0, 1, 2]);
    assert_eq!(proposals[2].nft_token_id, "9");
    // Seconds on chain, milliseconds locally
    assert_eq!(proposals[0].deadline.timestamp_millis(), 1_700_000_000_000);
    assert_eq!(chain.calls_to(IDaoGovernor::proposalsCall::SELECTOR), 3);

    // Refetching without changes gives the same list
    assert_eq!(svc.all_proposals().await.unwrap(), proposals);
}

#[tokio::test]
async fn test_overview_publishes_each_value() {
    let mut chain = FakeChain::new(RINKEBY).with_proposals(vec![stored(1, 1)]);
    chain.treasury = U256::from(1_500_000_000_000_000_000u64);
    chain.nft_balance = U256::from(3);
    let svc = service(Arc::new(chain)).await;
    let (tx, rx) = mpsc::channel();

    svc.publish_overview(&tx).await;

    let state = drain(&rx).into_iter().fold(member_state(), apply);
    assert_eq!(state.treasury_ether(), "1.5");
    assert_eq!(state.membership_balance, 3);
    assert_eq!(state.proposal_count, 1);
}

#[tokio::test]
async fn test_membership_without_signer_fails_alone() {
    let mut chain = FakeChain::new(RINKEBY);
    chain.signer = None;
    chain.treasury = U256::from(5);
    let svc = service(Arc::new(chain)).await;
    let (tx, rx) = mpsc::channel();

    svc.publish_overview(&tx).await;

    let events = drain(&rx);
    assert_eq!(events.len(), 3);
    assert!(events.contains(&RuntimeEvent::TreasuryBalance(U256::from(5))));
    assert!(events.contains(&RuntimeEvent::ProposalCount(0)));
    assert!(events.iter().any(|e| matches!(
        e,
        RuntimeEvent::FetchFailed {
            what: FetchKind::Membership,
            ..
        }
    )));
}

#[tokio::test]
async fn test_create_proposal_flow() {
    let gate = Arc::new(Notify::new());
    let mut chain = FakeChain::new(RINKEBY);
    chain.gate = Some(gate.clone());
    let chain = Arc::new(chain);
    let svc = service(chain.clone()).await;
    let (tx, rx) = mpsc::channel();

    let (mut state, commands) = reduce(&member_state(), Action::SetTokenId("42".to_string()));
    assert!(commands.is_empty());
    let (next, commands) = reduce(&state, Action::SubmitProposal);
    state = next;
    let mutation = Mutation::CreateProposal {
        token_id: U256::from(42),
    };
    assert_eq!(
        commands,
        vec![RuntimeCommand::Submit(mutation)]
    );

    let task = {
        let svc = svc.clone();
        tokio::spawn(async move { svc.submit(mutation, &tx).await })
    };

    let submitted = next_event(&rx).await;
    assert!(matches!(submitted, RuntimeEvent::TxSubmitted { .. }));
    state = apply(state, submitted);
    assert!(state.loading);
    assert_eq!(chain.calls_to(IDaoGovernor::numProposalsCall::SELECTOR), 0);

    let sent = chain.sent();
    assert_eq!(sent.len(), 1);
    let call = IDaoGovernor::createProposalCall::abi_decode(&sent[0]).unwrap();
    assert_eq!(call.nftTokenId, U256::from(42));

    gate.notify_one();
    let hash = task.await.unwrap().unwrap();

    let confirmed = next_event(&rx).await;
    assert_eq!(confirmed, RuntimeEvent::TxConfirmed { mutation, hash });
    state = apply(state, confirmed);
    assert!(!state.loading);
    assert!(state.pending.is_none());

    assert_eq!(next_event(&rx).await, RuntimeEvent::ProposalCount(1));
    assert_eq!(chain.calls_to(IDaoGovernor::numProposalsCall::SELECTOR), 1);
    assert!(drain(&rx).is_empty());
}

#[tokio::test]
async fn test_vote_refreshes_proposal_list() {
    let deadline = Utc::now().timestamp() as u64 + 600;
    let chain = Arc::new(FakeChain::new(RINKEBY).with_proposals(vec![stored(3, deadline)]));
    let svc = service(chain.clone()).await;
    let (tx, rx) = mpsc::channel();

    let mutation = Mutation::Vote {
        proposal_id: 0,
        choice: VoteChoice::Nay,
    };
    svc.submit(mutation, &tx).await.unwrap();

    let sent = chain.sent();
    let call = IDaoGovernor::voteOnProposalCall::abi_decode(&sent[0]).unwrap();
    assert_eq!(call.proposalIndex, U256::ZERO);
    assert_eq!(call.vote, 1);

    let events = drain(&rx);
    assert!(matches!(events[0], RuntimeEvent::TxSubmitted { .. }));
    assert!(matches!(events[1], RuntimeEvent::TxConfirmed { .. }));
    assert_eq!(events[2], RuntimeEvent::ProposalCount(1));
    match &events[3] {
        RuntimeEvent::Proposals(list) => {
            assert_eq!(list.len(), 1);
            assert_eq!(list[0].nay_votes, 1);
            assert_eq!(list[0].yay_votes, 0);
        }
        other => panic!("expected proposals, got {other:?}"),
    }
}

#[tokio::test]
async fn test_execute_marks_proposal_executed() {
    let chain = Arc::new(FakeChain::new(RINKEBY).with_proposals(vec![stored(3, 1)]));
    let svc = service(chain.clone()).await;
    let (tx, rx) = mpsc::channel();

    svc.submit(Mutation::Execute { proposal_id: 0 }, &tx)
        .await
        .unwrap();

    let state = drain(&rx).into_iter().fold(member_state(), apply);
    assert!(state.proposals[0].executed);
}

#[tokio::test]
async fn test_second_mutation_is_busy() {
    let gate = Arc::new(Notify::new());
    let mut chain = FakeChain::new(RINKEBY);
    chain.gate = Some(gate.clone());
    let svc = service(Arc::new(chain)).await;
    let (tx, rx) = mpsc::channel();

    let first = Mutation::CreateProposal {
        token_id: U256::from(1),
    };
    let task = {
        let svc = svc.clone();
        let tx = tx.clone();
        tokio::spawn(async move { svc.submit(first, &tx).await })
    };
    assert!(matches!(next_event(&rx).await, RuntimeEvent::TxSubmitted { .. }));

    let second = Mutation::CreateProposal {
        token_id: U256::from(2),
    };
    let err = svc.submit(second, &tx).await.unwrap_err();
    assert!(matches!(err, DaoError::Busy));
    assert!(matches!(
        next_event(&rx).await,
        RuntimeEvent::TxFailed { mutation, .. } if mutation == second
    ));

    gate.notify_one();
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_reverted_transaction_clears_loading_without_refresh() {
    let chain = FakeChain::new(RINKEBY);
    chain.revert.store(true, Ordering::SeqCst);
    let chain = Arc::new(chain);
    let svc = service(chain.clone()).await;
    let (tx, rx) = mpsc::channel();

    let mutation = Mutation::CreateProposal {
        token_id: U256::from(5),
    };
    let mut state = member_state();
    state.pending = Some(mutation);

    let err = svc.submit(mutation, &tx).await.unwrap_err();
    assert!(matches!(err, DaoError::Reverted(_)));

    let events = drain(&rx);
    assert_eq!(events.len(), 2);
    let state = events.into_iter().fold(state, apply);
    assert!(!state.loading);
    assert!(state.pending.is_none());
    assert_eq!(chain.calls_to(IDaoGovernor::numProposalsCall::SELECTOR), 0);
}

#[tokio::test]
async fn test_wrong_network_blocks_reads() {
    let chain = Arc::new(FakeChain::new(5));
    let svc = disconnected_service(chain.clone());

    assert!(svc.connect().await.unwrap_err().is_wrong_network());
    assert!(matches!(
        svc.treasury_balance().await,
        Err(DaoError::NotConnected)
    ));
    assert!(matches!(
        svc.all_proposals().await,
        Err(DaoError::NotConnected)
    ));
    assert_eq!(chain.calls_to(IDaoGovernor::numProposalsCall::SELECTOR), 0);
}

#[tokio::test]
async fn test_reads_stop_after_disconnect() {
    let chain = Arc::new(FakeChain::new(RINKEBY).with_proposals(vec![stored(1, 1)]));
    let svc = service(chain.clone()).await;
    let (tx, rx) = mpsc::channel();

    svc.connection().disconnect().await;
    svc.publish_proposals(&tx).await;

    match next_event(&rx).await {
        RuntimeEvent::FetchFailed {
            what: FetchKind::Proposals,
            failure,
        } => assert_eq!(failure.message, DaoError::NotConnected.to_string()),
        other => panic!("expected a failed fetch, got {other:?}"),
    }
    assert_eq!(chain.calls_to(IDaoGovernor::numProposalsCall::SELECTOR), 0);
}

#[tokio::test]
async fn test_huge_proposal_count_reports_failure() {
    let mut chain = FakeChain::new(RINKEBY);
    chain.count_override = Some(U256::from(u64::MAX));
    let svc = service(Arc::new(chain)).await;

    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (evt_tx, evt_rx) = mpsc::channel();
    let worker = tokio::spawn(run_async_worker(svc, cmd_rx, evt_tx));

    cmd_tx.send(RuntimeCommand::FetchProposals).unwrap();
    assert!(matches!(
        next_event(&evt_rx).await,
        RuntimeEvent::FetchFailed {
            what: FetchKind::Proposals,
            ..
        }
    ));

    // The worker keeps serving commands afterwards
    cmd_tx.send(RuntimeCommand::FetchProposalCount).unwrap();
    assert_eq!(
        next_event(&evt_rx).await,
        RuntimeEvent::ProposalCount(u64::MAX)
    );

    cmd_tx.send(RuntimeCommand::Shutdown).unwrap();
    worker.await.unwrap().unwrap();
}
