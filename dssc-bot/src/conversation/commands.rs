//! Slash commands. Any command registers its sender.

use super::{ConversationRouter, IgnoreReason, Outgoing, Reaction};
use crate::error::BotResult;
use crate::models::{User, UserProfile};

const START: &str = "start";

impl ConversationRouter {
    pub async fn on_command(&self, profile: &UserProfile, command: &str, args: &str) -> Reaction {
        log::info!("Command /{} {:?} from {}", command, args, profile.display_name());

        let user = match self.ensure_user(profile) {
            Ok(user) => user,
            Err(e) => return self.failure("register user", e),
        };

        match command {
            START => Reaction::Send(vec![Outgoing::Menu(self.main_menu(&user))]),
            _ => Reaction::Ignored(IgnoreReason::Unmatched),
        }
    }

    /// Register on first contact, refresh the profile afterwards
    fn ensure_user(&self, profile: &UserProfile) -> BotResult<User> {
        if let Some(user) = self.registered_user(profile)? {
            if self.db.update_user_profile(profile)? {
                log::debug!("Profile of {} refreshed", profile.display_name());
            }
            return Ok(user);
        }
        let user = self.db.add_user(profile)?;
        log::info!("New user registered: {}", profile.display_name());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;

    #[tokio::test]
    async fn test_start_registers_and_shows_menu() {
        let router = router();
        let reaction = router.on_command(&profile(USER_ID), "start", "").await;
        match reaction {
            Reaction::Send(items) => {
                assert!(matches!(&items[0], Outgoing::Menu(menu) if menu.text == "`Main Menu`"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(db(&router).get_user_by_tg_id(USER_ID).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_other_commands_only_register() {
        let router = router();
        let reaction = router.on_command(&profile(USER_ID), "help", "").await;
        assert_eq!(reaction, Reaction::Ignored(IgnoreReason::Unmatched));
        assert_eq!(db(&router).list_users().unwrap().len(), 1);

        // second contact does not duplicate
        router.on_command(&profile(USER_ID), "start", "").await;
        assert_eq!(db(&router).list_users().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_profile_refresh() {
        let router = router();
        router.on_command(&profile(USER_ID), "start", "").await;
        let mut renamed = profile(USER_ID);
        renamed.first_name = "Renamed".into();
        router.on_command(&renamed, "start", "").await;
        let user = db(&router).get_user_by_tg_id(USER_ID).unwrap().unwrap();
        assert_eq!(user.profile.first_name, "Renamed");
    }
}
