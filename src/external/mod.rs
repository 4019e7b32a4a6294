pub mod mailer;
pub mod resend;
pub mod sms;
pub mod twilio;

pub use mailer::*;
pub use resend::*;
pub use sms::*;
pub use twilio::*;
