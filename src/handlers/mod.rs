pub mod health;
pub mod login;
pub mod session;

pub use health::*;
pub use login::*;
pub use session::*;
