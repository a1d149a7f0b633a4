//! Carve-out configuration for non-production test identities and demo accounts

use serde::{Deserialize, Serialize};

/// A demo account that always accepts one fixed code and never receives one
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DemoAccount {
    /// Destination as configured (normalized when the policy is built)
    pub subject: String,
    /// The fixed code accepted for this account
    pub code: String,
}

/// Carve-out policy configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PolicyConfig {
    /// Destination suffixes treated as test identities outside production
    /// (e.g. `@example.test`)
    #[serde(default)]
    pub test_identity_suffixes: Vec<String>,

    /// Fixed code accepted for test identities
    #[serde(default)]
    pub test_code: Option<String>,

    /// Demo accounts, honoured in every environment
    #[serde(default)]
    pub demo_accounts: Vec<DemoAccount>,
}

impl PolicyConfig {
    /// Development defaults: `@example.test` addresses accept `000000`
    pub fn development() -> Self {
        Self {
            test_identity_suffixes: vec!["@example.test".to_string()],
            test_code: Some("000000".to_string()),
            demo_accounts: Vec::new(),
        }
    }

    /// Create from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_env_or(Self::default())
    }

    /// Overlay environment variables on top of `base`
    ///
    /// - `OTP_TEST_IDENTITY_SUFFIXES`: comma separated suffix list
    /// - `OTP_TEST_CODE`: fixed code for test identities
    /// - `OTP_DEMO_ACCOUNTS`: comma separated `subject:code` pairs
    pub fn from_env_or(base: Self) -> Self {
        let test_identity_suffixes = std::env::var("OTP_TEST_IDENTITY_SUFFIXES")
            .map(|raw| split_list(&raw))
            .unwrap_or(base.test_identity_suffixes);

        let test_code = std::env::var("OTP_TEST_CODE")
            .ok()
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty())
            .or(base.test_code);

        let demo_accounts = std::env::var("OTP_DEMO_ACCOUNTS")
            .map(|raw| parse_demo_accounts(&raw))
            .unwrap_or(base.demo_accounts);

        Self {
            test_identity_suffixes,
            test_code,
            demo_accounts,
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `subject:code` pairs; the last colon separates the code so phone
/// numbers and addresses never need escaping. Malformed entries are skipped.
fn parse_demo_accounts(raw: &str) -> Vec<DemoAccount> {
    split_list(raw)
        .into_iter()
        .filter_map(|entry| {
            let (subject, code) = entry.rsplit_once(':')?;
            let (subject, code) = (subject.trim(), code.trim());
            if subject.is_empty() || code.is_empty() {
                return None;
            }
            Some(DemoAccount {
                subject: subject.to_string(),
                code: code.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_demo_accounts() {
        let accounts = parse_demo_accounts("demo@shop.io:123456, +61400000000:654321,broken,:111111");
        assert_eq!(
            accounts,
            vec![
                DemoAccount {
                    subject: "demo@shop.io".to_string(),
                    code: "123456".to_string(),
                },
                DemoAccount {
                    subject: "+61400000000".to_string(),
                    code: "654321".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_from_env_overrides_base() {
        temp_env::with_vars(
            [
                ("OTP_TEST_IDENTITY_SUFFIXES", Some("@qa.local, @example.test")),
                ("OTP_TEST_CODE", Some(" 424242 ")),
                ("OTP_DEMO_ACCOUNTS", None),
            ],
            || {
                let config = PolicyConfig::from_env_or(PolicyConfig::development());
                assert_eq!(config.test_identity_suffixes, vec!["@qa.local", "@example.test"]);
                assert_eq!(config.test_code.as_deref(), Some("424242"));
                assert!(config.demo_accounts.is_empty());
            },
        );
    }
}
