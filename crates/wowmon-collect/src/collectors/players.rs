//! Player demographics.

use wowmon_core::Faction;
use wowmon_core::tables::CLASSES;
use wowmon_metrics::Batch;
use wowmon_metrics::definitions::{
    ONLINE_PLAYERS_BY_LEVEL, PLAYERS_BY_CLASS, PLAYERS_BY_LEVEL, PLAYERS_ONLINE, PLAYERS_TOTAL,
};
use wowmon_source::{Database, Query};

use crate::collector::{CollectFuture, Collector, CycleContext, each_row, fetch};
use crate::filter::real_population;

pub struct Players;

impl Collector for Players {
    fn name(&self) -> &'static str {
        "players"
    }

    fn collect<'a>(&'a self, cx: &'a mut CycleContext, out: &'a mut Batch) -> CollectFuture<'a> {
        Box::pin(async move {
            out.reset(&PLAYERS_ONLINE);
            out.reset(&PLAYERS_TOTAL);
            out.reset(&PLAYERS_BY_LEVEL);
            out.reset(&PLAYERS_BY_CLASS);
            out.reset(&ONLINE_PLAYERS_BY_LEVEL);

            // Raw online count: no exclusion filter.
            let online = Query::new(
                "players_online_by_race",
                Database::Characters,
                "SELECT race, COUNT(*) AS count FROM characters WHERE online = 1 GROUP BY race",
            );
            each_row(cx.source(), &online, |row| {
                if let Some(faction) = Faction::from_race(row.int(0)?) {
                    out.add(&PLAYERS_ONLINE, &[faction.as_str()], row.int(1)? as f64);
                }
                Ok(())
            })
            .await?;

            let total = Query::new(
                "players_total_by_race",
                Database::Characters,
                format!(
                    "SELECT race, COUNT(*) AS count FROM characters WHERE {} GROUP BY race",
                    real_population(None)
                ),
            );
            each_row(cx.source(), &total, |row| {
                if let Some(faction) = Faction::from_race(row.int(0)?) {
                    out.add(&PLAYERS_TOTAL, &[faction.as_str()], row.int(1)? as f64);
                }
                Ok(())
            })
            .await?;

            let by_level = Query::new(
                "players_by_level_race",
                Database::Characters,
                format!(
                    "SELECT level, race, COUNT(*) AS count FROM characters \
                     WHERE {} AND logout_time > 0 GROUP BY level, race",
                    real_population(None)
                ),
            );
            each_row(cx.source(), &by_level, |row| {
                let level = row.int(0)?.to_string();
                if let Some(faction) = Faction::from_race(row.int(1)?) {
                    out.add(&PLAYERS_BY_LEVEL, &[level.as_str(), faction.as_str()], row.int(2)? as f64);
                }
                Ok(())
            })
            .await?;

            let by_class = Query::new(
                "players_by_class_race",
                Database::Characters,
                format!(
                    "SELECT class, race, COUNT(*) AS count FROM characters \
                     WHERE {} GROUP BY class, race",
                    real_population(None)
                ),
            );
            each_row(cx.source(), &by_class, |row| {
                let class = CLASSES.label(row.int(0)?);
                if let Some(faction) = Faction::from_race(row.int(1)?) {
                    out.add(&PLAYERS_BY_CLASS, &[&*class, faction.as_str()], row.int(2)? as f64);
                }
                Ok(())
            })
            .await?;

            let roster = Query::new(
                "online_roster",
                Database::Characters,
                "SELECT c.name, c.level, c.account FROM characters c \
                 WHERE c.online = 1 AND (c.deleteDate IS NULL OR c.deleteDate = 0) \
                 ORDER BY c.level, c.name",
            );
            for row in fetch(cx.source(), &roster).await? {
                let character = row.text(0)?;
                let level = row.int(1)?;
                let account = cx.account_name(row.int(2)?).await;
                out.set(&ONLINE_PLAYERS_BY_LEVEL, &[character.as_str(), account.as_str()], level as f64);
            }

            Ok(())
        })
    }
}
