//! Region reconciliation and sequencing.
//!
//! - [`region`]: candidate regions and the set reconciliation mutates
//! - [`reconcile`]: overlap resolution and gap filling
//! - [`sequencer`]: column and text mode ordering, merge order

pub mod reconcile;
pub mod region;
pub mod sequencer;

pub use reconcile::{
    fill_gaps, reconcile, resolve_overlaps, OverlapPattern, ReconcileOptions, ReconcileStats,
};
pub use region::{RawBox, Region, RegionKey, RegionSet};
pub use sequencer::{sequence, sequence_columns, sequence_text, SequencedRegions};
