//! Validation utilities for the Chemical Manufacturing Inventory Platform
//!
//! Includes Thailand-specific contact validations for compliance with local
//! conventions.

use rust_decimal::Decimal;

// ============================================================================
// Inventory Validations
// ============================================================================

/// Validate a quantity is strictly positive
pub fn validate_positive_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate a unit cost or price is not negative
pub fn validate_non_negative_amount(amount: Decimal) -> Result<(), &'static str> {
    if amount < Decimal::ZERO {
        return Err("Amount cannot be negative");
    }
    Ok(())
}

/// Validate a supplier quality rating is on the 0-5 scale
pub fn validate_supplier_rating(rating: Decimal) -> Result<(), &'static str> {
    if rating < Decimal::ZERO || rating > Decimal::from(5) {
        return Err("Rating must be between 0 and 5");
    }
    Ok(())
}

// ============================================================================
// Sales Validations
// ============================================================================

/// Validate a discount does not exceed the pre-discount subtotal
pub fn validate_discount(discount: Decimal, subtotal: Decimal) -> Result<(), &'static str> {
    if discount < Decimal::ZERO {
        return Err("Discount cannot be negative");
    }
    if discount > subtotal {
        return Err("Discount cannot exceed the subtotal");
    }
    Ok(())
}

/// Validate split-tender entries cover the transaction total exactly
pub fn validate_payment_breakdown(
    amounts: &[Decimal],
    total: Decimal,
) -> Result<(), &'static str> {
    if amounts.is_empty() {
        return Err("At least one payment entry is required");
    }
    for amount in amounts {
        if *amount <= Decimal::ZERO {
            return Err("Payment amounts must be positive");
        }
    }
    let paid: Decimal = amounts.iter().sum();
    if paid != total {
        return Err("Payment entries must sum to the transaction total");
    }
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate a product SKU (3-32 uppercase alphanumeric, dashes allowed)
pub fn validate_sku(sku: &str) -> Result<(), &'static str> {
    if sku.len() < 3 {
        return Err("SKU must be at least 3 characters");
    }
    if sku.len() > 32 {
        return Err("SKU must be at most 32 characters");
    }
    if !sku
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
    {
        return Err("SKU must be uppercase alphanumeric");
    }
    Ok(())
}

// ============================================================================
// Thailand-Specific Validations
// ============================================================================

/// Validate Thai phone number format
/// Accepts: 0812345678, 081-234-5678, +66812345678
pub fn validate_thai_phone(phone: &str) -> Result<(), &'static str> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    // Thai mobile: 10 digits starting with 0 (e.g., 0812345678)
    if digits.len() == 10 && digits.starts_with('0') {
        return Ok(());
    }

    // International format: 11 digits starting with 66
    if digits.len() == 11 && digits.starts_with("66") {
        return Ok(());
    }

    Err("Invalid Thai phone number")
}
