//! One collector per metric group.
//!
//! | Group               | Databases          |
//! |---------------------|--------------------|
//! | `players`           | characters, auth   |
//! | `mail`              | characters         |
//! | `accounts`          | auth               |
//! | `server`            | auth               |
//! | `auctions`          | characters         |
//! | `guilds`            | characters         |
//! | `max_level`         | characters         |
//! | `unread_mail`       | characters         |
//! | `gm_accounts`       | auth               |
//! | `last_restart`      | auth               |
//! | `banned_characters` | characters         |
//! | `chat`              | characters, auth   |
//! | `instances`         | characters         |
//! | `network`           | characters, auth   |
//! | `battlegrounds`     | characters, world  |

mod accounts;
mod auctions;
mod battlegrounds;
mod characters;
mod chat;
mod guilds;
mod instances;
mod mail;
mod network;
mod players;
mod server;

pub use accounts::{Accounts, GmAccounts};
pub use auctions::Auctions;
pub use battlegrounds::Battlegrounds;
pub use characters::{BannedCharacters, MaxLevel};
pub use chat::Chat;
pub use guilds::Guilds;
pub use instances::Instances;
pub use mail::{Mail, UnreadMail};
pub use network::Network;
pub use players::Players;
pub use server::{LastRestart, Server};

use wowmon_core::CollectionConfig;

use crate::collector::Collector;

/// Every metric group, in collection order.
pub fn default_collectors(cfg: &CollectionConfig) -> Vec<Box<dyn Collector>> {
    vec![
        Box::new(Players),
        Box::new(Mail),
        Box::new(Accounts),
        Box::new(Server {
            realm_id: cfg.realm_id,
        }),
        Box::new(Auctions),
        Box::new(Guilds),
        Box::new(MaxLevel {
            level: cfg.max_level,
        }),
        Box::new(UnreadMail),
        Box::new(GmAccounts {
            realm_id: cfg.realm_id,
        }),
        Box::new(LastRestart {
            realm_id: cfg.realm_id,
        }),
        Box::new(BannedCharacters),
        Box::new(Chat),
        Box::new(Instances),
        Box::new(Network {
            high_latency_ms: cfg.high_latency_ms,
            top_ip_limit: cfg.top_ip_limit,
        }),
        Box::new(Battlegrounds),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn group_names_are_unique() {
        let collectors = default_collectors(&CollectionConfig::default());
        let names: HashSet<_> = collectors.iter().map(|c| c.name()).collect();
        assert_eq!(names.len(), collectors.len());
        assert_eq!(collectors.len(), 15);
    }
}
