use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /api/v1/otp/send`
///
/// Absent fields deserialize as empty strings so the service reports them
/// as missing input instead of a JSON parse failure.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendCodeRequest {
    /// Email address, or phone number in E.164 form with a leading `+`
    ///
    /// Spaces, dashes, dots and parentheses in a phone number are ignored.
    #[serde(default)]
    #[validate(length(max = 254))]
    pub destination: String,

    /// "email" or "phone" ("sms" is accepted as an alias)
    #[serde(default)]
    #[validate(length(max = 16))]
    pub channel: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendCodeResponse {
    pub message: String,
    /// Seconds the code stays valid
    pub expires_in: i64,
}

/// Body of `POST /api/v1/otp/verify`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyCodeRequest {
    /// The destination the code was sent to
    #[serde(default)]
    #[validate(length(max = 254))]
    pub subject: String,

    #[serde(default)]
    #[validate(length(max = 16))]
    pub code: String,
}

/// Verification result; never says why a code was rejected
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyCodeResponse {
    pub verified: bool,
}

/// Body of `POST /api/v1/otp/clear`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ClearCodeRequest {
    #[serde(default)]
    #[validate(length(max = 254))]
    pub subject: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default_to_empty() {
        let request: SendCodeRequest = serde_json::from_str("{}").unwrap();
        assert!(request.destination.is_empty());
        assert!(request.channel.is_empty());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_oversized_code_fails_validation() {
        let request = VerifyCodeRequest {
            subject: "user@example.com".to_string(),
            code: "1".repeat(17),
        };
        assert!(request.validate().is_err());
    }
}
