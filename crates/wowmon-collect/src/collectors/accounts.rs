//! Account counts from the auth database. Raw counts, no exclusion filter.

use wowmon_metrics::Batch;
use wowmon_metrics::definitions::{ACCOUNTS_BANNED, ACCOUNTS_ONLINE, ACCOUNTS_TOTAL, GM_ACCOUNTS};
use wowmon_source::{Database, Query};

use crate::collector::{CollectFuture, Collector, CycleContext, count};

pub struct Accounts;

impl Collector for Accounts {
    fn name(&self) -> &'static str {
        "accounts"
    }

    fn collect<'a>(&'a self, cx: &'a mut CycleContext, out: &'a mut Batch) -> CollectFuture<'a> {
        Box::pin(async move {
            let total = Query::new("accounts_total", Database::Auth, "SELECT COUNT(*) FROM account");
            out.set(&ACCOUNTS_TOTAL, &[], count(cx.source(), &total).await?);

            let online = Query::new(
                "accounts_online",
                Database::Auth,
                "SELECT COUNT(*) FROM account WHERE online = 1",
            );
            out.set(&ACCOUNTS_ONLINE, &[], count(cx.source(), &online).await?);

            let banned = Query::new(
                "accounts_banned",
                Database::Auth,
                "SELECT COUNT(*) FROM account_banned WHERE active = 1",
            );
            out.set(&ACCOUNTS_BANNED, &[], count(cx.source(), &banned).await?);

            Ok(())
        })
    }
}

/// Accounts holding any GM level on this realm or on all realms (`-1`).
pub struct GmAccounts {
    pub realm_id: i64,
}

impl Collector for GmAccounts {
    fn name(&self) -> &'static str {
        "gm_accounts"
    }

    fn collect<'a>(&'a self, cx: &'a mut CycleContext, out: &'a mut Batch) -> CollectFuture<'a> {
        Box::pin(async move {
            let gm = Query::new(
                "gm_accounts",
                Database::Auth,
                "SELECT COUNT(DISTINCT id) FROM account_access WHERE gmlevel > 0 AND RealmID IN (-1, ?)",
            )
            .bind(self.realm_id);
            out.set(&GM_ACCOUNTS, &[], count(cx.source(), &gm).await?);
            Ok(())
        })
    }
}
