pub mod contact_submissions;
pub mod newsletter_subscribers;
pub mod privacy_requests;
pub mod profiles;
pub mod verification_codes;

pub use contact_submissions as contact_submission_entity;
pub use newsletter_subscribers as newsletter_subscriber_entity;
pub use privacy_requests as privacy_request_entity;
pub use privacy_requests::PrivacyRequestType;
pub use profiles as profile_entity;
pub use verification_codes as verification_code_entity;
