//! Realm uptime bookkeeping from `auth.uptime`.
//!
//! An empty `uptime` table is not an error: nothing is written and the
//! gauges keep whatever value they had before the cycle.

use wowmon_metrics::Batch;
use wowmon_metrics::definitions::{LAST_RESTART, SERVER_MAX_PLAYERS, SERVER_UPTIME};
use wowmon_source::{Database, Query};

use crate::collector::{CollectFuture, Collector, CycleContext, first_row};

pub struct Server {
    pub realm_id: i64,
}

impl Collector for Server {
    fn name(&self) -> &'static str {
        "server"
    }

    fn collect<'a>(&'a self, cx: &'a mut CycleContext, out: &'a mut Batch) -> CollectFuture<'a> {
        Box::pin(async move {
            let latest = Query::new(
                "server_uptime",
                Database::Auth,
                "SELECT uptime, maxplayers FROM uptime WHERE realmid = ? ORDER BY starttime DESC LIMIT 1",
            )
            .bind(self.realm_id);
            if let Some(row) = first_row(cx.source(), &latest).await? {
                out.set(&SERVER_UPTIME, &[], row.int(0)? as f64);
                out.set(&SERVER_MAX_PLAYERS, &[], row.int(1)? as f64);
            }
            Ok(())
        })
    }
}

pub struct LastRestart {
    pub realm_id: i64,
}

impl Collector for LastRestart {
    fn name(&self) -> &'static str {
        "last_restart"
    }

    fn collect<'a>(&'a self, cx: &'a mut CycleContext, out: &'a mut Batch) -> CollectFuture<'a> {
        Box::pin(async move {
            let latest = Query::new(
                "last_restart",
                Database::Auth,
                "SELECT starttime FROM uptime WHERE realmid = ? ORDER BY starttime DESC LIMIT 1",
            )
            .bind(self.realm_id);
            if let Some(row) = first_row(cx.source(), &latest).await? {
                out.set(&LAST_RESTART, &[], row.int(0)? as f64);
            }
            Ok(())
        })
    }
}
