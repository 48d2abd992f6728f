//! Open auctions per auction house.

use wowmon_core::tables::AUCTION_HOUSES;
use wowmon_metrics::Batch;
use wowmon_metrics::definitions::AUCTIONS;
use wowmon_source::{Database, Query};

use crate::collector::{CollectFuture, Collector, CycleContext, each_row};

pub struct Auctions;

impl Collector for Auctions {
    fn name(&self) -> &'static str {
        "auctions"
    }

    fn collect<'a>(&'a self, cx: &'a mut CycleContext, out: &'a mut Batch) -> CollectFuture<'a> {
        Box::pin(async move {
            out.reset(&AUCTIONS);
            let by_house = Query::new(
                "auctions_by_house",
                Database::Characters,
                "SELECT houseid, COUNT(*) FROM auctionhouse GROUP BY houseid",
            );
            each_row(cx.source(), &by_house, |row| {
                let house = AUCTION_HOUSES.label(row.int(0)?);
                out.set(&AUCTIONS, &[&*house], row.int(1)? as f64);
                Ok(())
            })
            .await
        })
    }
}
