pub mod dates;
pub mod error;
pub mod raw;
pub mod roster;
pub mod view;

pub use error::ModelError;
pub use raw::*;
pub use roster::Roster;
pub use view::*;
