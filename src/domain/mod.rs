// Domain layer: cart and booking models plus the ports the core talks through.

pub mod booking;
pub mod model;
pub mod ports;
