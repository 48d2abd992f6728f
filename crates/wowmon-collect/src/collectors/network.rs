//! Player latency and IP activity.
//!
//! Latency aggregates over an empty population come back as NULL; those
//! series are left unpublished rather than reported as zero.

use wowmon_core::tables::{IP_ACTIONS, LAG_TYPES};
use wowmon_metrics::Batch;
use wowmon_metrics::definitions::{
    AVERAGE_LATENCY, HIGH_LATENCY_PLAYERS, IP_ACTIONS_BY_TYPE, IP_BANNED, LAG_REPORTS_BY_TYPE,
    NETWORK_ACTIVITY_BY_IP, PLAYER_LATENCY,
};
use wowmon_source::{Database, Query};

use crate::collector::{CollectFuture, Collector, CycleContext, count, each_row, first_row};
use crate::filter::real_population;

pub struct Network {
    pub high_latency_ms: i64,
    pub top_ip_limit: i64,
}

impl Collector for Network {
    fn name(&self) -> &'static str {
        "network"
    }

    fn collect<'a>(&'a self, cx: &'a mut CycleContext, out: &'a mut Batch) -> CollectFuture<'a> {
        Box::pin(async move {
            out.reset(&PLAYER_LATENCY);
            out.reset(&IP_ACTIONS_BY_TYPE);
            out.reset(&LAG_REPORTS_BY_TYPE);
            out.reset(&NETWORK_ACTIVITY_BY_IP);

            let population = real_population(None);

            let average = Query::new(
                "latency_average",
                Database::Characters,
                format!("SELECT AVG(latency) FROM characters WHERE online = 1 AND latency > 0 AND {population}"),
            );
            if let Some(row) = first_row(cx.source(), &average).await? {
                if let Some(avg) = row.opt_float(0)? {
                    out.set(&PLAYER_LATENCY, &["average"], avg);
                    out.set(&AVERAGE_LATENCY, &[], avg);
                }
            }

            let high = Query::new(
                "high_latency_count",
                Database::Characters,
                format!("SELECT COUNT(*) FROM characters WHERE online = 1 AND latency > ? AND {population}"),
            )
            .bind(self.high_latency_ms);
            let high = count(cx.source(), &high).await?;
            out.set(&HIGH_LATENCY_PLAYERS, &[], high);
            out.set(&PLAYER_LATENCY, &["high_latency"], high);

            let bounds = Query::new(
                "latency_min_max",
                Database::Characters,
                format!(
                    "SELECT MIN(latency), MAX(latency) FROM characters \
                     WHERE online = 1 AND latency > 0 AND {population}"
                ),
            );
            if let Some(row) = first_row(cx.source(), &bounds).await? {
                if let Some(min) = row.opt_float(0)? {
                    out.set(&PLAYER_LATENCY, &["min"], min);
                }
                if let Some(max) = row.opt_float(1)? {
                    out.set(&PLAYER_LATENCY, &["max"], max);
                }
            }

            let banned = Query::new("ip_banned", Database::Auth, "SELECT COUNT(*) FROM ip_banned");
            out.set(&IP_BANNED, &[], count(cx.source(), &banned).await?);

            let actions = Query::new(
                "ip_actions_by_type",
                Database::Auth,
                "SELECT type, COUNT(*) FROM logs_ip_actions GROUP BY type",
            );
            each_row(cx.source(), &actions, |row| {
                let action = IP_ACTIONS.label(row.int(0)?);
                out.set(&IP_ACTIONS_BY_TYPE, &[&*action], row.int(1)? as f64);
                Ok(())
            })
            .await?;

            let lag = Query::new(
                "lag_reports_by_type",
                Database::Characters,
                "SELECT lagType, COUNT(*) FROM lag_reports GROUP BY lagType",
            );
            each_row(cx.source(), &lag, |row| {
                let lag_type = LAG_TYPES.label(row.int(0)?);
                out.set(&LAG_REPORTS_BY_TYPE, &[&*lag_type], row.int(1)? as f64);
                Ok(())
            })
            .await?;

            let top = Query::new(
                "top_ips",
                Database::Auth,
                "SELECT ip, COUNT(*) AS activity FROM logs_ip_actions \
                 GROUP BY ip ORDER BY activity DESC LIMIT ?",
            )
            .bind(self.top_ip_limit);
            each_row(cx.source(), &top, |row| {
                let ip = row.text(0)?;
                out.set(&NETWORK_ACTIVITY_BY_IP, &[ip.as_str()], row.int(1)? as f64);
                Ok(())
            })
            .await
        })
    }
}
