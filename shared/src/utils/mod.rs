//! Destination utilities

pub mod email;
pub mod phone;

pub use email::{is_valid_email, mask_email};
pub use phone::{is_valid_phone, mask_phone_number, normalize_phone_number};

/// Mask a destination for logs, choosing the email or phone format
pub fn mask_destination(destination: &str) -> String {
    if destination.contains('@') {
        mask_email(destination)
    } else {
        mask_phone_number(destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_destination_dispatches_on_shape() {
        assert_eq!(mask_destination("alice@x.com"), "a***@x.com");
        assert_eq!(mask_destination("+61412345678"), "+61****5678");
    }
}
