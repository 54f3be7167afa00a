pub mod brief;
pub mod config;
pub mod defaults;
pub mod design;
pub mod error;
pub mod quality;
pub mod workflow;

pub use brief::*;
pub use config::{Config, ForgeLimits, Provider};
pub use design::*;
pub use error::ForgeError;
pub use quality::*;
pub use workflow::*;
