//! Field validation helpers shared by the form types.

use std::borrow::Cow;

use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::error::FieldErrors;

/// Validate a form, reporting violations keyed by camelCase field name.
pub fn check<T: Validate>(form: &T) -> Result<(), FieldErrors> {
    form.validate().map_err(FieldErrors::from)
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        collect(&errors, &mut out);
        out
    }
}

fn collect(errors: &ValidationErrors, out: &mut FieldErrors) {
    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(list) => {
                let name = camel_case(field);
                for error in list {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| error.code.to_string());
                    out.add(name.clone(), message);
                }
            }
            // Nested forms are flattened into the parent document, so
            // their fields are reported under their own names.
            ValidationErrorsKind::Struct(inner) => collect(inner, out),
            ValidationErrorsKind::List(items) => {
                for inner in items.values() {
                    collect(inner, out);
                }
            }
        }
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn exact_digits(value: &str, len: usize, code: &'static str, message: &'static str) -> Result<(), ValidationError> {
    if value.len() == len && value.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new(code).with_message(Cow::Borrowed(message)))
    }
}

pub fn validate_phone_number(value: &str) -> Result<(), ValidationError> {
    exact_digits(value, 10, "phone_number", "Phone number must be 10 digits")
}

pub fn validate_pin_number(value: &str) -> Result<(), ValidationError> {
    exact_digits(value, 6, "pin_number", "Pin number must be 6 digits")
}

pub fn validate_aadhar_card(value: &str) -> Result<(), ValidationError> {
    exact_digits(value, 10, "aadhar_card", "Aadhar Card must be 10 digits")
}

pub fn validate_agreement(value: &bool) -> Result<(), ValidationError> {
    if *value {
        Ok(())
    } else {
        Err(ValidationError::new("agree_to_terms")
            .with_message(Cow::Borrowed("You must agree to the terms")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_field_names() {
        assert_eq!(camel_case("phone_number"), "phoneNumber");
        assert_eq!(camel_case("email"), "email");
        assert_eq!(camel_case("confirmPassword"), "confirmPassword");
    }

    #[test]
    fn digit_rules() {
        assert!(validate_phone_number("0123456789").is_ok());
        assert!(validate_phone_number("012345678").is_err());
        assert!(validate_phone_number("01234567890").is_err());
        assert!(validate_phone_number("01234-6789").is_err());
        assert!(validate_pin_number("560001").is_ok());
        assert!(validate_pin_number("5600011").is_err());
        assert!(validate_agreement(&false).is_err());
    }
}
