// Copyright 2025 Nearcast Contributors
// SPDX-License-Identifier: Apache-2.0, MIT
#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use more_asserts::assert_gt;
    use nearcast_provider::types::AccountId;
    use nearcast_provider::Error;
    use nearcast_sdk::account::Account;
    use nearcast_signer::key::random_secretkey;
    use nearcast_signer::Signer;

    use crate::test_utils;

    #[tokio::test]
    #[ignore]
    async fn runner_has_access_key() {
        let Some(signer) = test_utils::get_runner_wallet() else {
            return;
        };
        let provider = test_utils::get_network_config().provider().unwrap();

        let info = Account::access_key(&provider, &signer).await.unwrap();
        assert_gt!(info.block_height, 0);
        assert_eq!(info.next_nonce().unwrap(), info.nonce + 1);
    }

    #[tokio::test]
    #[ignore]
    async fn unknown_access_key_is_not_found() {
        let Some(signer) = test_utils::get_runner_wallet() else {
            return;
        };
        let provider = test_utils::get_network_config().provider().unwrap();

        let res = Account::access_key_of(
            &provider,
            signer.account_id(),
            &random_secretkey().public_key(),
        )
        .await;
        assert!(matches!(res, Err(Error::NotFound(_))), "{res:?}");

        let missing = AccountId::from_str("nearcast-missing-account.test").unwrap();
        let res = Account::access_key_of(&provider, &missing, &random_secretkey().public_key()).await;
        assert!(matches!(res, Err(Error::NotFound(_))), "{res:?}");
    }
}
