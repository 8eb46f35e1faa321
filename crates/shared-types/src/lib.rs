pub mod config;
pub mod destination;
pub mod profile;
pub mod role;

pub use config::*;
pub use destination::*;
pub use profile::*;
pub use role::*;
