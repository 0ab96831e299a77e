// Domain layer: the paper model and the ports the pipeline is written against.

pub mod model;
pub mod ports;
