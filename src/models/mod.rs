pub mod doc;
pub mod messages;
pub mod health;
pub mod diagnostics;
pub mod error;

pub use doc::*;
pub use messages::*;
pub use health::*;
pub use diagnostics::*;
pub use error::*;
