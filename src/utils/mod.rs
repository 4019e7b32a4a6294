pub mod clock;
pub mod code_generator;
pub mod jwt;
pub mod phone;
pub mod rate_limiter;
pub mod retry;
pub mod validation;

pub use clock::*;
pub use code_generator::*;
pub use jwt::*;
pub use phone::*;
pub use rate_limiter::RateLimiter;
pub use retry::{RetryPolicy, with_retry};
pub use validation::*;
