//! Balances, contract info and node listings

use std::time::Duration;

use bigdecimal::BigDecimal;
use num_traits::Zero;

use super::{Button, Choice, ConversationRouter, Outgoing, Selection, messages};
use crate::amount::{TOKEN, display_tokens, format_amount};
use crate::error::{BotError, BotResult};
use crate::interaction::{ContractCall, ContractFunction};
use crate::models::{User, Wallet};

fn tokens(amount: &BigDecimal) -> String {
    format!("{} {}", format_amount(amount, 4), TOKEN)
}

/// `h:mm:ss`
pub(super) fn format_eta(eta: Duration) -> String {
    let secs = eta.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
}

impl ConversationRouter {
    pub(super) async fn balances(&self, user: &User) -> BotResult<Vec<Outgoing>> {
        let mut outgoing = vec![Outgoing::Text(messages::BALANCES.into())];

        if user.wallets.is_empty() {
            outgoing.push(Outgoing::Text(messages::NO_WALLETS.into()));
            return Ok(outgoing);
        }
        if self.db.get_owner_address()?.is_none() {
            outgoing.push(Outgoing::Text(messages::OWNER_NOT_SET.into()));
            return Ok(outgoing);
        }

        let contract = self.directory.get();
        let count = user.wallets.len();
        for (i, wallet) in user.wallets.iter().enumerate() {
            let mut text = format!("`Wallet {}/{}`", i + 1, count);
            text.push_str(&self.wallet_summary(wallet, contract.as_deref()).await);
            outgoing.push(Outgoing::Choice(Choice {
                text,
                rows: vec![vec![Button::callback("🗑 Remove", Selection::RemoveWallet(wallet.id))]],
            }));
        }
        Ok(outgoing)
    }

    /// Failing views are left out of the summary
    async fn wallet_summary(&self, wallet: &Wallet, contract: Option<&str>) -> String {
        let address = wallet.address.as_str();
        let denomination = self.network.denomination();
        let mut text = String::new();

        match self.network.get_account(address).await {
            Ok(account) => text.push_str(&format!(
                "\n`Balance:` {}",
                display_tokens(&account.balance, denomination)
            )),
            Err(e) => {
                log::warn!("Balance of {} unavailable: {}", address, e);
                text.push('\n');
                text.push_str(messages::BALANCE_ERROR);
            }
        }

        let Some(contract) = contract else {
            return text;
        };

        if let Some(stake) = positive(self.network.user_active_stake(contract, address).await) {
            text.push_str(&format!("\n`Delegated:` {}", tokens(&stake)));
        }

        if let Some(unstaked) = positive(self.network.user_unstaked_value(contract, address).await) {
            text.push_str(&format!("\n`Undelegated:` {}", tokens(&unstaked)));
            match self.network.user_undelegated_list(contract, address).await {
                Ok(entries) => {
                    let round_ms = self.network.network_config().round_duration_ms;
                    for entry in entries {
                        text.push_str(&format!(
                            "\n    - {} (ETA: {})",
                            display_tokens(&entry.amount, denomination),
                            format_eta(entry.eta(round_ms))
                        ));
                    }
                }
                Err(e) => log::warn!("Undelegated list of {} unavailable: {}", address, e),
            }
        }

        if let Some(unbondable) = positive(self.network.user_unbondable(contract, address).await) {
            text.push_str(&format!("\n`Can withdraw:` {}", tokens(&unbondable)));
        }

        if let Some(rewards) = positive(self.network.claimable_rewards(contract, address).await) {
            text.push_str(&format!("\n`Claimable rewards:` {}", tokens(&rewards)));
        }

        text
    }

    pub(super) async fn contract_info(&self, user: &User) -> BotResult<Vec<Outgoing>> {
        let mut outgoing = vec![Outgoing::Text(messages::CONTRACT_INFO.into())];

        if self.db.get_owner_address()?.is_none() {
            outgoing.push(Outgoing::Text(messages::OWNER_NOT_SET.into()));
            return Ok(outgoing);
        }
        let contract = self.contract_address()?;
        let denomination = self.network.denomination();

        let mut text = format!("`Contract address`: {}", contract);
        match self.network.contract_info(&contract).await {
            Ok(info) => {
                text.push_str(&format!("\n`Service fee:` {}%", format_amount(&info.service_fee, 2)));
                if info.changeable_service_fee {
                    text.push_str(" (changeable)");
                }
                if info.with_delegation_cap {
                    text.push_str(&format!(
                        "\n`Max delegation cap:` {}",
                        display_tokens(&info.max_delegation_cap, denomination)
                    ));
                }
                text.push_str(&format!(
                    "\n`Initial owner funds:` {}",
                    display_tokens(&info.initial_owner_funds, denomination)
                ));
                text.push_str(&format!("\n`Unbond period:` {}", info.unbond_period));
                text.push_str(&format!("\n`Automatic activation:` {}", info.automatic_activation));
                text.push_str(&format!("\n`Created at nonce:` {}", info.created_nonce));
            }
            Err(e) => log::warn!("Contract config of {} unavailable: {}", contract, e),
        }

        if self.is_owner(user) {
            let totals = self.network.contract_totals(&contract).await;
            text.push('\n');
            if let Some(nodes) = totals.num_nodes {
                text.push_str(&format!("\n`Nodes:` {}", nodes));
            }
            if let Some(users) = totals.num_users {
                text.push_str(&format!("\n`Delegators:` {}", users));
            }
            let bot_users = self.db.list_users()?;
            let tracked: usize = bot_users.iter().map(|u| u.wallets.len()).sum();
            text.push_str(&format!("\n`Bot users:` {} ({} wallets)", bot_users.len(), tracked));
            for (label, value) in [
                ("Total active stake", &totals.active_stake),
                ("Total cumulated rewards", &totals.cumulated_rewards),
                ("Total unstaked", &totals.unstaked),
                ("Total unstaked from nodes", &totals.unstaked_from_nodes),
                ("Total unbonded from nodes", &totals.unbonded_from_nodes),
            ] {
                if let Some(value) = value {
                    text.push_str(&format!("\n`{}:` {}", label, tokens(value)));
                }
            }
        }

        outgoing.push(Outgoing::Text(text));
        Ok(outgoing)
    }

    pub(super) async fn nodes(&self) -> BotResult<Vec<Outgoing>> {
        let contract = self.contract_address()?;
        let nodes = match self.network.all_node_states(&contract).await {
            Ok(nodes) => nodes,
            Err(e @ BotError::MalformedResponse(_)) => return Err(e),
            Err(e) => {
                log::warn!("Node states of {} unavailable: {}", contract, e);
                return Ok(vec![Outgoing::Text(messages::NODES_UNAVAILABLE.into())]);
            }
        };

        let count = nodes.len();
        let outgoing = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                let key = node.key_hex();
                let link = |function| {
                    self.links
                        .call(&contract, &ContractCall::new(function).raw_arg(key.clone()))
                };
                Outgoing::Choice(Choice {
                    text: format!("`Node {}/{}`\n`Key:` {}\n`State:` {}", i + 1, count, key, node.state),
                    rows: vec![
                        vec![
                            Button::url("Stake", link(ContractFunction::StakeNodes)),
                            Button::url("Unstake", link(ContractFunction::UnStakeNodes)),
                            Button::url("Unbond", link(ContractFunction::UnBondNodes)),
                        ],
                        vec![
                            Button::url("Restake", link(ContractFunction::ReStakeUnStakedNodes)),
                            Button::url("Unjail", link(ContractFunction::UnJailNodes)),
                            Button::url("Remove", link(ContractFunction::RemoveNodes)),
                        ],
                    ],
                })
            })
            .collect();
        Ok(outgoing)
    }
}

fn positive(result: BotResult<BigDecimal>) -> Option<BigDecimal> {
    result.ok().filter(|value| *value > BigDecimal::zero())
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::conversation::Reaction;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_int(server: &MockServer, function: &str, value: &str) {
        Mock::given(method("POST"))
            .and(path("/vm-values/int"))
            .and(body_partial_json(json!({"funcName": function})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"data": value}, "error": "", "code": "successful"
            })))
            .mount(server)
            .await;
    }

    async fn mock_bytes(server: &MockServer, function: &str, items: &[&[u8]]) {
        let encoded: Vec<String> = items.iter().map(|item| STANDARD.encode(item)).collect();
        Mock::given(method("POST"))
            .and(path("/vm-values/query"))
            .and(body_partial_json(json!({"funcName": function})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"data": {"returnData": encoded, "returnCode": "ok"}},
                "error": "", "code": "successful"
            })))
            .mount(server)
            .await;
    }

    #[test]
    fn test_format_eta() {
        assert_eq!(format_eta(Duration::from_secs(0)), "0:00:00");
        assert_eq!(format_eta(Duration::from_secs(3725)), "1:02:05");
        assert_eq!(format_eta(Duration::from_secs(36 * 3600)), "36:00:00");
    }

    #[tokio::test]
    async fn test_balances_guards() {
        let router = router();
        let user = register(&router, USER_ID);
        let outgoing = router.balances(&user).await.unwrap();
        assert_eq!(outgoing[1], Outgoing::Text(messages::NO_WALLETS.into()));

        db(&router).add_wallet(user.id, ALICE).unwrap();
        let user = db(&router).get_user_by_tg_id(USER_ID).unwrap().unwrap();
        let outgoing = router.balances(&user).await.unwrap();
        assert_eq!(outgoing[1], Outgoing::Text(messages::OWNER_NOT_SET.into()));
    }

    #[tokio::test]
    async fn test_balances_summary() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/address/{}", ALICE)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"account": {"address": ALICE, "nonce": 1, "balance": "1500000000000000000"}},
                "error": "", "code": "successful"
            })))
            .mount(&server)
            .await;
        mock_int(&server, "getUserActiveStake", "20000000000000000000").await;
        mock_int(&server, "getUserUnStakedValue", "10000000000000000000").await;
        mock_int(&server, "getUserUnBondable", "0").await;
        mock_int(&server, "getClaimableRewards", "123400000000000000").await;
        // 10 eGLD, 600 rounds left
        mock_bytes(&server, "getUserUnDelegatedList", &[&[0x8a, 0xc7, 0x23, 0x04, 0x89, 0xe8, 0x00, 0x00], &[0x02, 0x58]]).await;

        let router = router_with(&server.uri());
        let user = register(&router, USER_ID);
        let wallet = db(&router).add_wallet(user.id, ALICE).unwrap();
        db(&router).set_owner_address(ALICE).unwrap();
        set_contract(&router);
        let user = db(&router).get_user_by_tg_id(USER_ID).unwrap().unwrap();

        let outgoing = router.balances(&user).await.unwrap();
        assert_eq!(outgoing.len(), 2);
        let Outgoing::Choice(choice) = &outgoing[1] else {
            panic!("expected a wallet card, got {:?}", outgoing[1]);
        };
        assert_eq!(
            choice.text,
            "`Wallet 1/1`\n`Balance:` 1.5000 eGLD\n`Delegated:` 20.0000 eGLD\n`Undelegated:` 10.0000 eGLD\n    - 10.0000 eGLD (ETA: 1:00:00)\n`Claimable rewards:` 0.1234 eGLD"
        );
        assert_eq!(
            choice.rows,
            vec![vec![Button::callback("🗑 Remove", Selection::RemoveWallet(wallet.id))]]
        );
    }

    #[tokio::test]
    async fn test_balance_error_is_shown_inline() {
        let router = router();
        let user = register(&router, USER_ID);
        db(&router).add_wallet(user.id, ALICE).unwrap();
        db(&router).set_owner_address(ALICE).unwrap();
        let user = db(&router).get_user_by_tg_id(USER_ID).unwrap().unwrap();

        let outgoing = router.balances(&user).await.unwrap();
        let Outgoing::Choice(choice) = &outgoing[1] else {
            panic!("expected a wallet card");
        };
        assert_eq!(choice.text, "`Wallet 1/1`\n❌ Balance error");
    }

    #[tokio::test]
    async fn test_contract_info_requires_owner_and_contract() {
        let router = router();
        let user = register(&router, USER_ID);
        let outgoing = router.contract_info(&user).await.unwrap();
        assert_eq!(outgoing[1], Outgoing::Text(messages::OWNER_NOT_SET.into()));

        db(&router).set_owner_address(ALICE).unwrap();
        assert!(matches!(router.contract_info(&user).await, Err(BotError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_contract_info_public_view() {
        let server = MockServer::start().await;
        mock_bytes(
            &server,
            "getContractConfig",
            &[&[0u8; 32], &[0x04, 0xe2], &[], &[0x8a, 0xc7, 0x23, 0x04, 0x89, 0xe8, 0x00, 0x00], b"true", b"false", b"true", &[0x64], &[0x0a]],
        )
        .await;

        let router = router_with(&server.uri());
        let user = register(&router, USER_ID);
        db(&router).set_owner_address(ALICE).unwrap();
        set_contract(&router);

        let outgoing = router.contract_info(&user).await.unwrap();
        assert_eq!(
            outgoing[1],
            Outgoing::Text(format!(
                "`Contract address`: {}\n`Service fee:` 12.50% (changeable)\n`Initial owner funds:` 10.0000 eGLD\n`Unbond period:` 10\n`Automatic activation:` true\n`Created at nonce:` 100",
                CONTRACT
            ))
        );
    }

    #[tokio::test]
    async fn test_contract_info_owner_counts_bot_users() {
        let server = MockServer::start().await;
        let router = router_with(&server.uri());
        let owner = register(&router, OWNER_ID);
        let user = register(&router, USER_ID);
        db(&router).add_wallet(user.id, ALICE).unwrap();
        db(&router).set_owner_address(ALICE).unwrap();
        set_contract(&router);

        let texts = texts(&Reaction::Send(router.contract_info(&owner).await.unwrap()));
        assert!(texts[1].ends_with("`Bot users:` 2 (1 wallets)"), "{}", texts[1]);
    }

    #[tokio::test]
    async fn test_nodes_view() {
        let server = MockServer::start().await;
        let key = [0xabu8; 96];
        mock_bytes(&server, "getAllNodeStates", &[b"staked", &key]).await;

        let router = router_with(&server.uri());
        set_contract(&router);
        let outgoing = router.nodes().await.unwrap();
        assert_eq!(outgoing.len(), 1);
        let Outgoing::Choice(choice) = &outgoing[0] else {
            panic!("expected a node card");
        };
        let key_hex = hex::encode(key);
        assert_eq!(choice.text, format!("`Node 1/1`\n`Key:` {}\n`State:` staked", key_hex));
        assert_eq!(
            choice.rows[0][0],
            Button::url(
                "Stake",
                format!(
                    "{}/hook/transaction?receiver={}&value=0&gasLimit=12000000&data=stakeNodes@{}&callbackUrl=none",
                    HOOK, CONTRACT, key_hex
                )
            )
        );
    }

    #[tokio::test]
    async fn test_nodes_unavailable() {
        let router = router();
        set_contract(&router);
        let outgoing = router.nodes().await.unwrap();
        assert_eq!(outgoing, vec![Outgoing::Text(messages::NODES_UNAVAILABLE.into())]);
    }
}
