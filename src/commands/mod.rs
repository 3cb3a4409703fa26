pub mod definitions;
pub mod handlers;

pub use definitions::*;
pub use handlers::*;
