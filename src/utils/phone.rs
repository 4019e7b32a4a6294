use crate::error::{AppError, AppResult};

/// Reduce a US phone number to its 10-digit subscriber number.
///
/// Formatting characters are dropped and a leading `1` country code is removed
/// from 11-digit input. Anything else that is not exactly 10 digits is rejected.
pub fn normalize_phone_number(phone: &str) -> AppResult<String> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    match digits.len() {
        10 => Ok(digits),
        11 if digits.starts_with('1') => Ok(digits[1..].to_string()),
        _ => Err(AppError::ValidationError(
            "Invalid phone number. Please enter a valid 10-digit US phone number".to_string(),
        )),
    }
}

/// E.164 form of a normalized number, as the SMS gateway expects it.
pub fn to_e164(normalized: &str) -> String {
    format!("+1{normalized}")
}

/// Hide all but the last four digits, for log lines.
pub fn mask_phone(phone: &str) -> String {
    let len = phone.chars().count();
    if len <= 4 {
        return "*".repeat(len);
    }
    let visible: String = phone.chars().skip(len - 4).collect();
    format!("{}{}", "*".repeat(len - 4), visible)
}
