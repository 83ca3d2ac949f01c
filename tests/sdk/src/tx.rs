// Copyright 2025 Nearcast Contributors
// SPDX-License-Identifier: Apache-2.0, MIT
#[cfg(test)]
mod tests {
    use more_asserts::assert_gt;
    use nearcast_provider::tx::{BroadcastMode, TxStatus};
    use nearcast_sdk::account::Account;
    use nearcast_sdk::tx::Tx;
    use nearcast_sdk::TxParams;
    use nearcast_signer::Signer;

    use crate::test_utils;

    #[tokio::test]
    #[ignore]
    async fn self_transfer_commits_with_next_nonce() {
        let Some(mut signer) = test_utils::get_runner_wallet() else {
            return;
        };
        let provider = test_utils::get_network_config().provider().unwrap();
        let before = Account::nonce(&provider, &signer).await.unwrap();

        let receiver = signer.account_id().clone();
        let res = Tx::transfer(&provider, &mut signer, receiver, 1, TxParams::default())
            .await
            .unwrap();
        let TxStatus::Committed(outcome) = &res.status else {
            panic!("transfer was not committed: {:?}", res.status);
        };
        assert_eq!(outcome.transaction.nonce, before + 1);
        assert_gt!(outcome.total_gas_burnt(), 0);

        let status = Tx::status(&provider, &res.hash, signer.account_id())
            .await
            .unwrap();
        assert!(status.is_committed());
    }

    #[tokio::test]
    #[ignore]
    async fn async_broadcast_returns_hash() {
        let Some(mut signer) = test_utils::get_runner_wallet() else {
            return;
        };
        let provider = test_utils::get_network_config().provider().unwrap();

        let receiver = signer.account_id().clone();
        let res = Tx::transfer(
            &provider,
            &mut signer,
            receiver,
            1,
            TxParams {
                nonce: None,
                broadcast_mode: BroadcastMode::Async,
            },
        )
        .await
        .unwrap();
        assert!(matches!(res.status, TxStatus::Pending));
    }

    #[tokio::test]
    #[ignore]
    async fn used_nonce_is_rejected_locally() {
        let Some(mut signer) = test_utils::get_runner_wallet() else {
            return;
        };
        let provider = test_utils::get_network_config().provider().unwrap();
        let nonce = Account::nonce(&provider, &signer).await.unwrap();

        let receiver = signer.account_id().clone();
        let res = Tx::transfer(
            &provider,
            &mut signer,
            receiver,
            1,
            TxParams {
                nonce: Some(nonce),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(res, Err(nearcast_provider::Error::Validation(_))));
    }
}
