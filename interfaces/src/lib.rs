pub mod defs;

pub use defs::{DialogWidget, ItemCatalog, ItemId, ItemObservation, ItemRecord, ObservationSink, TransformedState};
