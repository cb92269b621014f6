//! Deterministic constructors for tests and the simulator.

use commonware_runtime::{buffer::PoolRef, Clock, Metrics, Spawner, Storage};
use commonware_storage::{adb, translator::EightCap};
use commonware_utils::{NZUsize, NZU64};
use overdrive_types::EconomyRules;

use crate::store::{Adb, Memory};
use crate::Ledger;

/// Default rules table for tests. The documented defaults line up with the
/// scenario fixtures (bundle 500/5, threshold 100_000, payout 100, 2%
/// commission).
pub fn test_rules() -> EconomyRules {
    EconomyRules::default()
}

/// An engine over the in-memory store.
pub async fn create_memory_ledger<E: Clock>(context: E, rules: EconomyRules) -> Ledger<E, Memory> {
    Ledger::init(context, rules, Memory::default())
        .await
        .expect("failed to initialize ledger")
}

/// An authenticated database for durable-store tests.
pub async fn create_store<E: Spawner + Metrics + Clock + Storage>(context: &E) -> Adb<E, EightCap> {
    let buffer_pool = PoolRef::new(NZUsize!(1024), NZUsize!(1024));
    Adb::init(
        context.with_label("ledger"),
        adb::any::variable::Config {
            mmr_journal_partition: String::from("ledger-mmr-journal"),
            mmr_metadata_partition: String::from("ledger-mmr-metadata"),
            mmr_items_per_blob: NZU64!(1024),
            mmr_write_buffer: NZUsize!(1024),
            log_journal_partition: String::from("ledger-log-journal"),
            log_items_per_section: NZU64!(1024),
            log_write_buffer: NZUsize!(1024),
            log_compression: None,
            log_codec_config: (),
            locations_journal_partition: String::from("ledger-locations-journal"),
            locations_items_per_blob: NZU64!(1024),
            translator: EightCap,
            thread_pool: None,
            buffer_pool,
        },
    )
    .await
    .expect("failed to initialize ledger ADB")
}
