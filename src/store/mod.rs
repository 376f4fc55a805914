//! Historical reference data behind the risk engine.
//!
//! [`HistoricalStore`] is the async trait the engine scores against;
//! [`MemoryStore`] implements it with sharded concurrent maps and an atomic
//! per-key performance upsert.

mod historical;
mod memory;

pub use historical::{
    CarrierAggregate, DeliveryOutcome, GeoAggregate, HistoricalStore, PatternKind,
    PerformanceAggregate, StoreError, TemporalPattern,
};
pub use memory::MemoryStore;
