//! Character-level counts outside the main demographics group.

use wowmon_core::Faction;
use wowmon_metrics::Batch;
use wowmon_metrics::definitions::{BANNED_CHARACTERS, MAX_LEVEL_CHARACTERS};
use wowmon_source::{Database, Query};

use crate::collector::{CollectFuture, Collector, CycleContext, count, each_row};
use crate::filter::real_population;

/// Real characters at the level cap, by faction.
pub struct MaxLevel {
    pub level: i64,
}

impl Collector for MaxLevel {
    fn name(&self) -> &'static str {
        "max_level"
    }

    fn collect<'a>(&'a self, cx: &'a mut CycleContext, out: &'a mut Batch) -> CollectFuture<'a> {
        Box::pin(async move {
            out.reset(&MAX_LEVEL_CHARACTERS);
            let capped = Query::new(
                "max_level_by_race",
                Database::Characters,
                format!(
                    "SELECT race, COUNT(*) FROM characters WHERE level = ? AND {} GROUP BY race",
                    real_population(None)
                ),
            )
            .bind(self.level);
            each_row(cx.source(), &capped, |row| {
                if let Some(faction) = Faction::from_race(row.int(0)?) {
                    out.add(&MAX_LEVEL_CHARACTERS, &[faction.as_str()], row.int(1)? as f64);
                }
                Ok(())
            })
            .await
        })
    }
}

/// Characters under an active ban. Raw count, no exclusion filter.
pub struct BannedCharacters;

impl Collector for BannedCharacters {
    fn name(&self) -> &'static str {
        "banned_characters"
    }

    fn collect<'a>(&'a self, cx: &'a mut CycleContext, out: &'a mut Batch) -> CollectFuture<'a> {
        Box::pin(async move {
            let banned = Query::new(
                "banned_characters",
                Database::Characters,
                "SELECT COUNT(DISTINCT guid) FROM character_banned WHERE active = 1",
            );
            out.set(&BANNED_CHARACTERS, &[], count(cx.source(), &banned).await?);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use wowmon_metrics::{Registry, definitions};
    use wowmon_source::{MemorySource, Param, row};

    use super::*;
    use crate::filter::is_filtered;

    #[tokio::test]
    async fn configured_level_cap_is_bound() {
        let source = Arc::new(
            MemorySource::new()
                .with_rows_for("max_level_by_race", vec![Param::Int(60)], vec![row![2, 4], row![8, 1]])
                .with_error("max_level_by_race", "wrong level bound"),
        );
        let registry = Registry::with_metrics(definitions::ALL).unwrap();
        let mut cx = CycleContext::new(source);
        let mut batch = Batch::new();
        MaxLevel { level: 60 }.collect(&mut cx, &mut batch).await.unwrap();
        let mut staging = registry.stage();
        staging.apply(batch).unwrap();
        let snap = registry.publish(staging);
        assert_eq!(snap.get("wow_max_level_characters", &["Horde"]), Some(5.0));
        assert_eq!(snap.get("wow_max_level_characters", &["Alliance"]), None);
    }

    #[tokio::test]
    async fn level_cap_query_is_filtered() {
        let source = Arc::new(MemorySource::new().with_rows("max_level_by_race", vec![]));
        let mut cx = CycleContext::new(source.clone());
        MaxLevel { level: 80 }.collect(&mut cx, &mut Batch::new()).await.unwrap();

        let query = source.last_query("max_level_by_race").unwrap();
        assert!(is_filtered(&query.sql));
        assert_eq!(query.params, vec![Param::Int(80)]);
    }

    #[tokio::test]
    async fn banned_characters_is_a_raw_count() {
        let source = Arc::new(MemorySource::new().with_rows("banned_characters", vec![row![3]]));
        let registry = Registry::with_metrics(definitions::ALL).unwrap();
        let mut cx = CycleContext::new(source.clone());
        let mut batch = Batch::new();
        BannedCharacters.collect(&mut cx, &mut batch).await.unwrap();
        let mut staging = registry.stage();
        staging.apply(batch).unwrap();
        let snap = registry.publish(staging);

        assert_eq!(snap.get("wow_banned_characters", &[]), Some(3.0));
        assert!(!is_filtered(&source.last_sql("banned_characters").unwrap()));
    }
}
