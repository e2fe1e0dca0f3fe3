// Domain layer: core models and ports (interfaces). No network or framework types.

pub mod model;
pub mod ports;
