pub mod form_service;
pub mod profile_service;
pub mod verification_service;

pub use form_service::*;
pub use profile_service::*;
pub use verification_service::*;
