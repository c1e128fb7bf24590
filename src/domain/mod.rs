// Domain layer: raw rows, normalized entities and ports (interfaces).
// No I/O here; adapters implement the ports.

pub mod model;
pub mod ports;
pub mod records;
