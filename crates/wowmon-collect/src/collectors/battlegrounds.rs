//! Battleground activity, PvP statistics and world templates.

use wowmon_core::Faction;
use wowmon_core::tables::{BATTLEGROUND_TYPES, DESERTION_TYPES};
use wowmon_metrics::Batch;
use wowmon_metrics::definitions::{
    BG_DESERTERS, BG_DESERTERS_BY_TYPE, BG_PLAYER_STATS, BG_STATS, BG_TEMPLATE_DETAILS,
    BG_TEMPLATES, BG_WINS_BY_FACTION, BGS_BY_BRACKET, BGS_BY_TYPE, RANDOM_BG_QUEUE, RECENT_BGS,
};
use wowmon_source::{Database, Query};

use crate::collector::{CollectFuture, Collector, CycleContext, count, each_row, first_row};

/// Averaged `pvpstats_players` columns, in query order after the two totals.
const PLAYER_AVERAGES: [&str; 6] = [
    "avg_killing_blows",
    "avg_deaths",
    "avg_honorable_kills",
    "avg_bonus_honor",
    "avg_damage_done",
    "avg_healing_done",
];

const RECENT_WINDOWS: [&str; 3] = ["last_24h", "last_7d", "last_30d"];

pub struct Battlegrounds;

impl Collector for Battlegrounds {
    fn name(&self) -> &'static str {
        "battlegrounds"
    }

    fn collect<'a>(&'a self, cx: &'a mut CycleContext, out: &'a mut Batch) -> CollectFuture<'a> {
        Box::pin(async move {
            for desc in [
                &BG_DESERTERS_BY_TYPE,
                &BG_STATS,
                &BGS_BY_TYPE,
                &BGS_BY_BRACKET,
                &BG_WINS_BY_FACTION,
                &BG_PLAYER_STATS,
                &BG_TEMPLATES,
                &BG_TEMPLATE_DETAILS,
                &RECENT_BGS,
            ] {
                out.reset(desc);
            }

            let deserters = Query::new(
                "bg_deserters",
                Database::Characters,
                "SELECT COUNT(*) FROM battleground_deserters",
            );
            out.set(&BG_DESERTERS, &[], count(cx.source(), &deserters).await?);

            let deserters_by_type = Query::new(
                "bg_deserters_by_type",
                Database::Characters,
                "SELECT type, COUNT(*) AS count FROM battleground_deserters GROUP BY type",
            );
            each_row(cx.source(), &deserters_by_type, |row| {
                let kind = DESERTION_TYPES.label(row.int(0)?);
                out.set(&BG_DESERTERS_BY_TYPE, &[&*kind], row.int(1)? as f64);
                Ok(())
            })
            .await?;

            let queue = Query::new(
                "bg_random_queue",
                Database::Characters,
                "SELECT COUNT(*) FROM character_battleground_random",
            );
            out.set(&RANDOM_BG_QUEUE, &[], count(cx.source(), &queue).await?);

            let totals = Query::new(
                "bg_totals",
                Database::Characters,
                "SELECT COUNT(DISTINCT id) AS total_battlegrounds, \
                 COUNT(DISTINCT character_guid) AS total_players \
                 FROM pvpstats_battlegrounds bg \
                 LEFT JOIN pvpstats_players bp ON bg.id = bp.battleground_id",
            );
            if let Some(row) = first_row(cx.source(), &totals).await? {
                out.set(&BG_STATS, &["total_battlegrounds"], row.int(0)? as f64);
                out.set(&BG_STATS, &["total_players"], row.int(1)? as f64);
            }

            let by_type = Query::new(
                "bgs_by_type",
                Database::Characters,
                "SELECT type, COUNT(*) AS count FROM pvpstats_battlegrounds GROUP BY type",
            );
            each_row(cx.source(), &by_type, |row| {
                let kind = BATTLEGROUND_TYPES.label(row.int(0)?);
                out.set(&BGS_BY_TYPE, &[&*kind], row.int(1)? as f64);
                Ok(())
            })
            .await?;

            let by_bracket = Query::new(
                "bgs_by_bracket",
                Database::Characters,
                "SELECT bracket_id, COUNT(*) AS count FROM pvpstats_battlegrounds GROUP BY bracket_id",
            );
            each_row(cx.source(), &by_bracket, |row| {
                let bracket = format!("bracket_{}", row.int(0)?);
                out.set(&BGS_BY_BRACKET, &[bracket.as_str()], row.int(1)? as f64);
                Ok(())
            })
            .await?;

            let wins = Query::new(
                "bg_wins_by_faction",
                Database::Characters,
                "SELECT winner_faction, COUNT(*) AS count FROM pvpstats_battlegrounds \
                 WHERE winner_faction IN (0, 1) GROUP BY winner_faction",
            );
            each_row(cx.source(), &wins, |row| {
                if let Some(faction) = Faction::from_team(row.int(0)?) {
                    out.set(&BG_WINS_BY_FACTION, &[faction.as_str()], row.int(1)? as f64);
                }
                Ok(())
            })
            .await?;

            let players = Query::new(
                "bg_player_stats",
                Database::Characters,
                "SELECT COUNT(*) AS total_participants, \
                 SUM(CASE WHEN winner = 1 THEN 1 ELSE 0 END) AS total_winners, \
                 AVG(score_killing_blows), AVG(score_deaths), AVG(score_honorable_kills), \
                 AVG(score_bonus_honor), AVG(score_damage_done), AVG(score_healing_done) \
                 FROM pvpstats_players",
            );
            if let Some(row) = first_row(cx.source(), &players).await? {
                out.set(&BG_PLAYER_STATS, &["total_participants"], row.int(0)? as f64);
                if let Some(winners) = row.opt_int(1)? {
                    out.set(&BG_PLAYER_STATS, &["total_winners"], winners as f64);
                }
                for (i, stat) in PLAYER_AVERAGES.iter().enumerate() {
                    if let Some(avg) = row.opt_float(i + 2)? {
                        out.set(&BG_PLAYER_STATS, &[*stat], avg);
                    }
                }
            }

            let templates = Query::new(
                "bg_templates",
                Database::World,
                "SELECT ID, ScriptName, Comment, MinPlayersPerTeam, MaxPlayersPerTeam, \
                 MinLvl, MaxLvl, Weight FROM battleground_template",
            );
            each_row(cx.source(), &templates, |row| {
                let id = row.int(0)?;
                let label = template_label(
                    id,
                    row.opt_text(1)?.unwrap_or_default(),
                    row.opt_text(2)?.unwrap_or_default(),
                );
                let id = id.to_string();
                let (min_players, max_players) = (row.int(3)?.to_string(), row.int(4)?.to_string());
                let (min_level, max_level) = (row.int(5)?.to_string(), row.int(6)?.to_string());
                let weight = row.int(7)? as f64;

                out.set(&BG_TEMPLATES, &[id.as_str(), label.as_str()], weight);
                out.set(
                    &BG_TEMPLATE_DETAILS,
                    &[
                        id.as_str(),
                        label.as_str(),
                        min_level.as_str(),
                        max_level.as_str(),
                        min_players.as_str(),
                        max_players.as_str(),
                    ],
                    weight,
                );
                Ok(())
            })
            .await?;

            let recent = Query::new(
                "bg_recent",
                Database::Characters,
                "SELECT \
                 SUM(CASE WHEN date >= DATE_SUB(NOW(), INTERVAL 24 HOUR) THEN 1 ELSE 0 END), \
                 SUM(CASE WHEN date >= DATE_SUB(NOW(), INTERVAL 7 DAY) THEN 1 ELSE 0 END), \
                 SUM(CASE WHEN date >= DATE_SUB(NOW(), INTERVAL 30 DAY) THEN 1 ELSE 0 END) \
                 FROM pvpstats_battlegrounds",
            );
            if let Some(row) = first_row(cx.source(), &recent).await? {
                for (i, window) in RECENT_WINDOWS.iter().enumerate() {
                    if let Some(n) = row.opt_int(i)? {
                        out.set(&RECENT_BGS, &[*window], n as f64);
                    }
                }
            }

            Ok(())
        })
    }
}

/// Script name, else comment, else `BG_<id>`.
fn template_label(id: i64, script_name: String, comment: String) -> String {
    if !script_name.is_empty() {
        script_name
    } else if !comment.is_empty() {
        comment
    } else {
        format!("BG_{id}")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use wowmon_metrics::{Registry, Snapshot, definitions};
    use wowmon_source::{MemorySource, row};

    use super::*;

    fn source() -> MemorySource {
        MemorySource::new()
            .with_rows("bg_deserters", vec![row![4]])
            .with_rows("bg_deserters_by_type", vec![row![0, 3], row![2, 1]])
            .with_rows("bg_random_queue", vec![row![2]])
            .with_rows("bg_totals", vec![row![10, 55]])
            .with_rows("bgs_by_type", vec![row![2, 6], row![30, 4]])
            .with_rows("bgs_by_bracket", vec![row![7, 10]])
            .with_rows("bg_wins_by_faction", vec![row![0, 6], row![1, 4]])
            .with_rows(
                "bg_player_stats",
                vec![row![55, 30.0, 2.5, 1.25, None::<f64>, 12.0, 10500.0, 3000.0]],
            )
            .with_rows(
                "bg_templates",
                vec![
                    row![2, "bg_warsong", "Warsong Gulch", 10, 10, 10, 80, 1],
                    row![3, "", "Arathi Basin", 15, 15, 20, 80, 2],
                    row![32, None::<String>, "", 0, 40, 10, 80, 1],
                ],
            )
            .with_rows("bg_recent", vec![row![None::<i64>, 3.0, 10.0]])
    }

    async fn run(source: MemorySource) -> Snapshot {
        let registry = Registry::with_metrics(definitions::ALL).unwrap();
        let mut cx = CycleContext::new(Arc::new(source));
        let mut batch = Batch::new();
        Battlegrounds.collect(&mut cx, &mut batch).await.unwrap();
        let mut staging = registry.stage();
        staging.apply(batch).unwrap();
        registry.publish(staging)
    }

    #[tokio::test]
    async fn labels_and_counts() {
        let snap = run(source()).await;
        assert_eq!(snap.get("wow_battleground_deserters", &[]), Some(4.0));
        assert_eq!(snap.get("wow_battleground_deserters_by_type", &["Leave"]), Some(3.0));
        assert_eq!(snap.get("wow_battleground_stats", &["total_players"]), Some(55.0));
        assert_eq!(snap.get("wow_battlegrounds_by_type", &["Warsong Gulch"]), Some(6.0));
        assert_eq!(snap.get("wow_battlegrounds_by_type", &["Unknown_30"]), Some(4.0));
        assert_eq!(snap.get("wow_battlegrounds_by_bracket", &["bracket_7"]), Some(10.0));
        assert_eq!(snap.get("wow_battleground_wins_by_faction", &["Alliance"]), Some(6.0));
        assert_eq!(snap.get("wow_battleground_wins_by_faction", &["Horde"]), Some(4.0));
    }

    #[tokio::test]
    async fn null_averages_are_skipped() {
        let snap = run(source()).await;
        assert_eq!(
            snap.get("wow_battleground_player_stats", &["total_winners"]),
            Some(30.0)
        );
        assert_eq!(
            snap.get("wow_battleground_player_stats", &["avg_killing_blows"]),
            Some(2.5)
        );
        assert_eq!(
            snap.get("wow_battleground_player_stats", &["avg_honorable_kills"]),
            None
        );
        assert_eq!(snap.series("wow_battleground_player_stats").len(), 7);
        assert_eq!(snap.get("wow_recent_battlegrounds", &["last_24h"]), None);
        assert_eq!(snap.get("wow_recent_battlegrounds", &["last_7d"]), Some(3.0));
    }

    #[tokio::test]
    async fn template_labels_fall_back() {
        let snap = run(source()).await;
        assert_eq!(snap.get("wow_battleground_templates", &["2", "bg_warsong"]), Some(1.0));
        assert_eq!(snap.get("wow_battleground_templates", &["3", "Arathi Basin"]), Some(2.0));
        assert_eq!(snap.get("wow_battleground_templates", &["32", "BG_32"]), Some(1.0));
        assert_eq!(
            snap.get(
                "wow_battleground_template_details",
                &["3", "Arathi Basin", "20", "80", "15", "15"]
            ),
            Some(2.0)
        );
    }

    #[tokio::test]
    async fn row_scan_error_fails_the_group() {
        let source = source().with_rows("bgs_by_type", vec![row!["not a number", 1]]);
        let mut cx = CycleContext::new(Arc::new(source));
        let mut batch = Batch::new();
        assert!(Battlegrounds.collect(&mut cx, &mut batch).await.is_err());
    }
}
