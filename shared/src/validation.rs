//! Validation utilities for the Recycling Commerce Platform
//!
//! Used by the inbound messaging collaborators before they call into the
//! core; the core itself trusts its inputs.

// ============================================================================
// Quotation Code Validations
// ============================================================================

/// Validate quotation code format: '#' followed by 6 uppercase alphanumerics
pub fn validate_quotation_code(code: &str) -> Result<(), &'static str> {
    let mut chars = code.chars();
    if chars.next() != Some('#') {
        return Err("Quotation code must start with '#'");
    }
    let body: Vec<char> = chars.collect();
    if body.len() != 6 {
        return Err("Quotation code must have 6 characters after '#'");
    }
    if !body.iter().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
        return Err("Quotation code must be uppercase alphanumeric only");
    }
    Ok(())
}

// ============================================================================
// Geographic Validations
// ============================================================================

/// Validate coordinates are a plausible GPS fix
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), &'static str> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err("Latitude must be between -90 and 90");
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err("Longitude must be between -180 and 180");
    }
    Ok(())
}

// ============================================================================
// Peru-Specific Validations
// ============================================================================

/// Validate Peruvian mobile phone number format
/// Accepts: 987654321, +51987654321, 51987654321
pub fn validate_peru_phone(phone: &str) -> Result<(), &'static str> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    // National mobile: 9 digits starting with 9 (e.g., 987654321)
    if digits.len() == 9 && digits.starts_with('9') {
        return Ok(());
    }
    // International format with country code: 11 digits starting with 519
    if digits.len() == 11 && digits.starts_with("519") {
        return Ok(());
    }

    Err("Invalid Peruvian mobile number format")
}
