//! Chat channels and server log tables.

use wowmon_metrics::definitions::{
    ARENA_LOGS, CHANNEL_BANS, CHANNELS, ENCOUNTER_LOGS, GUILD_EVENTS, IP_ACTION_LOGS, LOGS_BY_TYPE,
    MONEY_LOGS,
};
use wowmon_metrics::{Batch, MetricDesc};
use wowmon_source::{Database, Query};

use crate::collector::{CollectFuture, Collector, CycleContext, count, each_row};

/// Plain row counts: (metric, query name, database, table).
static TABLE_COUNTS: &[(&MetricDesc, &str, Database, &str)] = &[
    (&CHANNELS, "channels", Database::Characters, "channels"),
    (&CHANNEL_BANS, "channel_bans", Database::Characters, "channels_bans"),
    (&GUILD_EVENTS, "guild_events", Database::Characters, "guild_eventlog"),
    (&MONEY_LOGS, "money_logs", Database::Characters, "log_money"),
    (&ENCOUNTER_LOGS, "encounter_logs", Database::Characters, "log_encounter"),
    (&ARENA_LOGS, "arena_logs", Database::Characters, "log_arena_fights"),
    (&IP_ACTION_LOGS, "ip_action_logs", Database::Auth, "logs_ip_actions"),
];

pub struct Chat;

impl Collector for Chat {
    fn name(&self) -> &'static str {
        "chat"
    }

    fn collect<'a>(&'a self, cx: &'a mut CycleContext, out: &'a mut Batch) -> CollectFuture<'a> {
        Box::pin(async move {
            out.reset(&LOGS_BY_TYPE);

            for &(desc, name, database, table) in TABLE_COUNTS {
                let query = Query::new(name, database, format!("SELECT COUNT(*) FROM {table}"));
                out.set(desc, &[], count(cx.source(), &query).await?);
            }

            let by_type = Query::new(
                "logs_by_type",
                Database::Auth,
                "SELECT type, COUNT(*) FROM logs GROUP BY type",
            );
            each_row(cx.source(), &by_type, |row| {
                let kind = row.text(0)?;
                out.set(&LOGS_BY_TYPE, &[kind.as_str()], row.int(1)? as f64);
                Ok(())
            })
            .await
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use crate::filter::is_filtered;

    use wowmon_metrics::{Registry, definitions};
    use wowmon_source::{MemorySource, row};

    use super::*;

    #[tokio::test]
    async fn counts_every_log_table() {
        let mut source = MemorySource::new().with_rows("logs_by_type", vec![row!["gm", 3], row!["chat", 9]]);
        for (i, &(_, name, ..)) in TABLE_COUNTS.iter().enumerate() {
            source = source.with_rows(name, vec![row![i as i64 + 1]]);
        }
        let registry = Registry::with_metrics(definitions::ALL).unwrap();
        let mut cx = CycleContext::new(Arc::new(source));
        let mut batch = Batch::new();
        Chat.collect(&mut cx, &mut batch).await.unwrap();
        let mut staging = registry.stage();
        staging.apply(batch).unwrap();
        let snap = registry.publish(staging);

        assert_eq!(snap.get("wow_channel_count", &[]), Some(1.0));
        assert_eq!(snap.get("wow_ip_action_logs", &[]), Some(7.0));
        assert_eq!(snap.get("wow_log_count", &["gm"]), Some(3.0));
        assert_eq!(snap.get("wow_log_count", &["chat"]), Some(9.0));
    }

    #[tokio::test]
    async fn log_counts_are_unfiltered() {
        let mut source = MemorySource::new().with_rows("logs_by_type", vec![]);
        for &(_, name, ..) in TABLE_COUNTS {
            source = source.with_rows(name, vec![row![0]]);
        }
        let source = Arc::new(source);
        let mut cx = CycleContext::new(source.clone());
        Chat.collect(&mut cx, &mut Batch::new()).await.unwrap();

        for &(_, name, database, table) in TABLE_COUNTS {
            let query = source.last_query(name).unwrap();
            assert_eq!(query.database, database, "{name}");
            assert!(query.sql.contains(table), "{name}");
            assert!(!is_filtered(&query.sql), "{name}");
        }
        assert!(!is_filtered(&source.last_sql("logs_by_type").unwrap()));
    }
}
