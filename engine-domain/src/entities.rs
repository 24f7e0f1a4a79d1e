// Domain entities
pub mod action;
pub mod activity;
pub mod config;
pub mod decision;
pub mod device;
pub mod ip;
pub mod suspicious;

pub use action::*;
pub use activity::*;
pub use config::*;
pub use decision::*;
pub use device::*;
pub use ip::*;
pub use suspicious::*;
