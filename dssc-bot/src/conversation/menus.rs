//! Navigation menus

use super::{Button, Choice, ConversationRouter, Selection};
use crate::interaction::{ContractCall, ContractFunction};
use crate::models::User;

/// `yes`, the argument enabling automatic activation
const ENABLE: &str = "796573";

fn choice(text: &str, rows: Vec<Vec<Button>>) -> Choice {
    Choice {
        text: text.to_string(),
        rows,
    }
}

impl ConversationRouter {
    /// Wallet links are only offered once the contract address is known
    pub(super) fn main_menu(&self, user: &User) -> Choice {
        let mut rows = vec![
            vec![Button::callback("🏦 My Wallets", Selection::MyWallets)],
            vec![
                Button::callback("🥩 Delegate", Selection::Delegate),
                Button::callback("🐖 Undelegate", Selection::Undelegate),
            ],
        ];

        if let Some(contract) = self.directory.get() {
            let call = |function| self.links.call(&contract, &ContractCall::new(function));
            rows.push(vec![
                Button::url("🥓 Compound", call(ContractFunction::ReDelegateRewards)),
                Button::url("😋 Claim Rewards", call(ContractFunction::ClaimRewards)),
                Button::url("🍽 Withdraw", call(ContractFunction::Withdraw)),
            ]);
        }

        rows.push(vec![Button::callback("ℹ️ Contract Info", Selection::ContractInfo)]);
        rows.push(vec![
            Button::callback("📜 Help", Selection::MainHelp),
            Button::callback("❕ About", Selection::About),
        ]);

        if self.is_owner(user) {
            rows.push(vec![Button::callback("💻 Nodes management", Selection::NodesMenu)]);
            rows.push(vec![Button::callback("👮‍♂️ Admin control panel", Selection::AdminMenu)]);
        }

        choice("`Main Menu`", rows)
    }

    pub(super) fn admin_menu(&self) -> Choice {
        let mut rows = vec![
            vec![Button::callback("Set owner address", Selection::SetOwnerAddress)],
            vec![Button::callback("Create DSSC", Selection::CreateDssc)],
            vec![Button::callback("Change Service Fee", Selection::ChangeServiceFee)],
            vec![Button::callback("Modify Delegation Cap", Selection::ModifyDelegationCap)],
        ];
        if let Some(contract) = self.directory.get() {
            let call = ContractCall::new(ContractFunction::SetAutomaticActivation).raw_arg(ENABLE);
            rows.push(vec![Button::url(
                "Enable Automatic Activation",
                self.links.call(&contract, &call),
            )]);
        }
        rows.push(vec![Button::callback("🚪 Back", Selection::Back)]);

        choice("`Admin Control Panel`", rows)
    }
}

pub(super) fn wallets_menu() -> Choice {
    choice(
        "`My Wallets Menu`",
        vec![
            vec![
                Button::callback("➕ Add", Selection::AddWallet),
                Button::callback("💰 Balances", Selection::Balances),
            ],
            vec![
                Button::callback("📜 Help", Selection::MyWalletsHelp),
                Button::callback("🚪 Back", Selection::Back),
            ],
        ],
    )
}

pub(super) fn nodes_menu() -> Choice {
    choice(
        "`Nodes management`",
        vec![
            vec![
                Button::callback("➕ Add Node", Selection::AddNode),
                Button::callback("🖥 My Nodes", Selection::MyNodes),
            ],
            vec![Button::callback("🚪 Back", Selection::Back)],
        ],
    )
}
