pub mod aggregate;
pub mod format;

pub use aggregate::*;
pub use format::*;
