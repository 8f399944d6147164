mod file;
pub use file::{ViatomFile, ViatomHeader, ViatomRecord};

mod error;
pub use error::ViatomError;

mod helpers;
