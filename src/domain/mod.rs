// Domain layer: records, the filter algebra and ports (interfaces).

pub mod filter;
pub mod model;
pub mod ports;
