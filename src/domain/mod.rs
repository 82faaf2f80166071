// Domain layer: aggregates, version rules and ports. No HTTP or filesystem code here.

pub mod model;
pub mod ports;
pub mod version;
