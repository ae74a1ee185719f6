pub mod connection;
pub mod broadcast;
pub mod guard;

pub use connection::*;
pub use broadcast::*;
pub use guard::*;
