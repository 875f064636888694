//! Phone number normalization for WhatsApp dispatch
//!
//! The messaging gateway expects digits-only numbers carrying the Brazilian
//! country code. Numbers arrive from spreadsheets and forms in every shape
//! (`+55 (27) 99999-0000`, `27 99999 0000`, `999990000`), so every recipient is
//! passed through [`normalize_phone_number`] before sending.

/// Brazilian country calling code
pub const COUNTRY_CODE: &str = "55";

/// Normalize a raw phone string into a dispatch-ready number
///
/// Strips every character that is not an ASCII digit. If the remaining digits
/// start with `55` they are returned unchanged, otherwise `55` is prepended.
///
/// Local numbers that begin with the `27` area code still receive the prefix.
/// Numbers carrying some other international code also get `55` prepended;
/// the service only dispatches to Brazilian numbers.
///
/// # Examples
/// ```
/// use cdl_common::normalize_phone_number;
///
/// assert_eq!(normalize_phone_number("+55 27 99999-0000"), "5527999990000");
/// assert_eq!(normalize_phone_number("27999990000"), "5527999990000");
/// ```
pub fn normalize_phone_number(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.starts_with(COUNTRY_CODE) {
        digits
    } else {
        format!("{}{}", COUNTRY_CODE, digits)
    }
}
