//! Mailbox totals.

use wowmon_core::Faction;
use wowmon_metrics::Batch;
use wowmon_metrics::definitions::{MAIL_BY_FACTION, MAIL_TOTAL, MAIL_WITH_ITEMS, UNREAD_MAIL};
use wowmon_source::{Database, Query};

use crate::collector::{CollectFuture, Collector, CycleContext, count, each_row};
use crate::filter::real_population;

pub struct Mail;

impl Collector for Mail {
    fn name(&self) -> &'static str {
        "mail"
    }

    fn collect<'a>(&'a self, cx: &'a mut CycleContext, out: &'a mut Batch) -> CollectFuture<'a> {
        Box::pin(async move {
            out.reset(&MAIL_BY_FACTION);

            let total = Query::new("mail_total", Database::Characters, "SELECT COUNT(*) FROM mail");
            out.set(&MAIL_TOTAL, &[], count(cx.source(), &total).await?);

            let with_items = Query::new(
                "mail_with_items",
                Database::Characters,
                "SELECT COUNT(*) FROM mail WHERE has_items = 1",
            );
            out.set(&MAIL_WITH_ITEMS, &[], count(cx.source(), &with_items).await?);

            let by_sender = Query::new(
                "mail_by_sender_race",
                Database::Characters,
                format!(
                    "SELECT c.race, COUNT(*) AS count FROM mail m \
                     JOIN characters c ON m.sender = c.guid \
                     WHERE {} GROUP BY c.race",
                    real_population(Some("c"))
                ),
            );
            each_row(cx.source(), &by_sender, |row| {
                if let Some(faction) = Faction::from_race(row.int(0)?) {
                    out.add(&MAIL_BY_FACTION, &[faction.as_str()], row.int(1)? as f64);
                }
                Ok(())
            })
            .await?;

            Ok(())
        })
    }
}

pub struct UnreadMail;

impl Collector for UnreadMail {
    fn name(&self) -> &'static str {
        "unread_mail"
    }

    fn collect<'a>(&'a self, cx: &'a mut CycleContext, out: &'a mut Batch) -> CollectFuture<'a> {
        Box::pin(async move {
            let unread = Query::new(
                "unread_mail",
                Database::Characters,
                "SELECT COUNT(*) FROM mail WHERE checked = 0",
            );
            out.set(&UNREAD_MAIL, &[], count(cx.source(), &unread).await?);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use wowmon_metrics::{Registry, definitions};
    use wowmon_source::{MemorySource, row};

    use super::*;
    use crate::filter::is_filtered;

    #[tokio::test]
    async fn sender_races_fold_into_factions() {
        let source = Arc::new(
            MemorySource::new()
                .with_rows("mail_total", vec![row![12]])
                .with_rows("mail_with_items", vec![row![4]])
                .with_rows("mail_by_sender_race", vec![row![1, 3], row![7, 2], row![5, 6]]),
        );
        let registry = Registry::with_metrics(definitions::ALL).unwrap();
        let mut cx = CycleContext::new(source);
        let mut batch = Batch::new();
        Mail.collect(&mut cx, &mut batch).await.unwrap();
        let mut staging = registry.stage();
        staging.apply(batch).unwrap();
        let snap = registry.publish(staging);

        assert_eq!(snap.get("wow_mail_total", &[]), Some(12.0));
        assert_eq!(snap.get("wow_mail_with_items", &[]), Some(4.0));
        assert_eq!(snap.get("wow_mail_by_faction", &["Alliance"]), Some(5.0));
        assert_eq!(snap.get("wow_mail_by_faction", &["Horde"]), Some(6.0));
    }

    #[tokio::test]
    async fn failed_count_fails_the_group() {
        let source = Arc::new(MemorySource::new().with_error("mail_total", "table locked"));
        let mut cx = CycleContext::new(source);
        let mut batch = Batch::new();
        let err = Mail.collect(&mut cx, &mut batch).await.unwrap_err();
        assert!(format!("{err:#}").contains("mail_total"));
    }

    #[tokio::test]
    async fn only_sender_breakdown_is_filtered() {
        let source = Arc::new(
            MemorySource::new()
                .with_rows("mail_total", vec![row![1]])
                .with_rows("mail_with_items", vec![row![0]])
                .with_rows("mail_by_sender_race", vec![]),
        );
        let mut cx = CycleContext::new(source.clone());
        Mail.collect(&mut cx, &mut Batch::new()).await.unwrap();

        let by_sender = source.last_sql("mail_by_sender_race").unwrap();
        assert!(is_filtered(&by_sender));
        assert!(by_sender.contains("c.name NOT LIKE '%gm%'"));
        assert!(!is_filtered(&source.last_sql("mail_total").unwrap()));
        assert!(!is_filtered(&source.last_sql("mail_with_items").unwrap()));
    }

    #[tokio::test]
    async fn unread_mail_counts_unchecked_messages() {
        let source = Arc::new(MemorySource::new().with_rows("unread_mail", vec![row![17]]));
        let registry = Registry::with_metrics(definitions::ALL).unwrap();
        let mut cx = CycleContext::new(source.clone());
        let mut batch = Batch::new();
        UnreadMail.collect(&mut cx, &mut batch).await.unwrap();
        let mut staging = registry.stage();
        staging.apply(batch).unwrap();
        let snap = registry.publish(staging);

        assert_eq!(snap.get("wow_unread_mail_count", &[]), Some(17.0));
        let sql = source.last_sql("unread_mail").unwrap();
        assert!(sql.contains("checked = 0"));
        assert!(!is_filtered(&sql));
    }
}
