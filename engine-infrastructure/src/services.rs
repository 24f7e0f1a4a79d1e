pub mod store_gateway;

pub use store_gateway::*;
