//! Guild count.

use wowmon_metrics::Batch;
use wowmon_metrics::definitions::GUILDS;
use wowmon_source::{Database, Query};

use crate::collector::{CollectFuture, Collector, CycleContext, count};

pub struct Guilds;

impl Collector for Guilds {
    fn name(&self) -> &'static str {
        "guilds"
    }

    fn collect<'a>(&'a self, cx: &'a mut CycleContext, out: &'a mut Batch) -> CollectFuture<'a> {
        Box::pin(async move {
            let guilds = Query::new("guild_count", Database::Characters, "SELECT COUNT(*) FROM guild");
            out.set(&GUILDS, &[], count(cx.source(), &guilds).await?);
            Ok(())
        })
    }
}
