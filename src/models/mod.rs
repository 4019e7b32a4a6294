pub mod common;
pub mod forms;
pub mod verification;

pub use common::*;
pub use forms::*;
pub use verification::*;
