// Adapters layer: concrete implementations of the domain ports (storage, record sources).

pub mod csv_source;
pub mod memory;
pub mod storage;
