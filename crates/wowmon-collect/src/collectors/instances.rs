//! Dungeon and raid instance state.

use wowmon_core::tables::{DIFFICULTIES, LFG_STATES};
use wowmon_metrics::Batch;
use wowmon_metrics::definitions::{
    ACTIVE_INSTANCES, CHARACTERS_IN_INSTANCES, COMPLETED_ENCOUNTERS, INSTANCE_RESETS,
    INSTANCE_SAVES, INSTANCES_BY_DIFFICULTY, LAG_REPORTS, LFG_DATA,
};
use wowmon_source::{Database, Query};

use crate::collector::{CollectFuture, Collector, CycleContext, count, each_row};

pub struct Instances;

impl Collector for Instances {
    fn name(&self) -> &'static str {
        "instances"
    }

    fn collect<'a>(&'a self, cx: &'a mut CycleContext, out: &'a mut Batch) -> CollectFuture<'a> {
        Box::pin(async move {
            out.reset(&INSTANCES_BY_DIFFICULTY);
            out.reset(&COMPLETED_ENCOUNTERS);
            out.reset(&INSTANCE_RESETS);
            out.reset(&LFG_DATA);

            let active = Query::new(
                "active_instances",
                Database::Characters,
                "SELECT COUNT(*) FROM instance WHERE resettime > UNIX_TIMESTAMP()",
            );
            out.set(&ACTIVE_INSTANCES, &[], count(cx.source(), &active).await?);

            let by_difficulty = Query::new(
                "instances_by_difficulty",
                Database::Characters,
                "SELECT difficulty, COUNT(*) FROM instance GROUP BY difficulty",
            );
            each_row(cx.source(), &by_difficulty, |row| {
                let difficulty = DIFFICULTIES.label(row.int(0)?);
                out.set(&INSTANCES_BY_DIFFICULTY, &[&*difficulty], row.int(1)? as f64);
                Ok(())
            })
            .await?;

            let encounters = Query::new(
                "completed_encounters",
                Database::Characters,
                "SELECT id, completedEncounters FROM instance WHERE completedEncounters > 0",
            );
            each_row(cx.source(), &encounters, |row| {
                let instance = row.int(0)?.to_string();
                out.set(&COMPLETED_ENCOUNTERS, &[instance.as_str()], row.int(1)? as f64);
                Ok(())
            })
            .await?;

            let resets = Query::new(
                "instance_resets",
                Database::Characters,
                "SELECT mapid, difficulty, resettime FROM instance_reset",
            );
            each_row(cx.source(), &resets, |row| {
                let map = row.int(0)?.to_string();
                let difficulty = DIFFICULTIES.label(row.int(1)?);
                out.set(&INSTANCE_RESETS, &[map.as_str(), &*difficulty], row.int(2)? as f64);
                Ok(())
            })
            .await?;

            let bound = Query::new(
                "characters_in_instances",
                Database::Characters,
                "SELECT COUNT(DISTINCT guid) FROM character_instance",
            );
            out.set(&CHARACTERS_IN_INSTANCES, &[], count(cx.source(), &bound).await?);

            let lfg = Query::new(
                "lfg_by_state",
                Database::Characters,
                "SELECT state, COUNT(*) FROM lfg_data GROUP BY state",
            );
            each_row(cx.source(), &lfg, |row| {
                let state = LFG_STATES.label(row.int(0)?);
                out.set(&LFG_DATA, &[&*state], row.int(1)? as f64);
                Ok(())
            })
            .await?;

            let lag = Query::new("lag_reports", Database::Characters, "SELECT COUNT(*) FROM lag_reports");
            out.set(&LAG_REPORTS, &[], count(cx.source(), &lag).await?);

            let saves = Query::new(
                "instance_saves",
                Database::Characters,
                "SELECT COUNT(*) FROM instance_saved_go_state_data",
            );
            out.set(&INSTANCE_SAVES, &[], count(cx.source(), &saves).await?);

            Ok(())
        })
    }
}
