//! Access policy carve-outs for demo accounts and test identities
//!
//! A carve-out replaces generation and verification entirely for the
//! subjects it covers. Neither the rate limiter nor the credential store is
//! consulted for them.

use std::collections::HashMap;

use constant_time_eq::constant_time_eq;
use otp_shared::{Environment, PolicyConfig};

use crate::domain::value_objects::SubjectKey;

/// Pure predicates evaluated by the dispatch service before any store access
pub trait AccessPolicy: Send + Sync {
    /// Whether issuing for `subject` should be skipped entirely
    fn skip_issue(&self, subject: &SubjectKey) -> bool;

    /// Fixed verification result for `subject`, or `None` for the normal path
    fn forced_outcome(&self, subject: &SubjectKey, candidate: &str) -> Option<bool>;
}

/// Policy without carve-outs
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBypassPolicy;

impl AccessPolicy for NoBypassPolicy {
    fn skip_issue(&self, _subject: &SubjectKey) -> bool {
        false
    }

    fn forced_outcome(&self, _subject: &SubjectKey, _candidate: &str) -> Option<bool> {
        None
    }
}

/// Carve-outs fixed at startup from configuration
///
/// Demo accounts apply in every environment. Test identity suffixes only
/// apply outside production and only when a test code is configured.
#[derive(Debug, Clone, Default)]
pub struct StaticPolicy {
    demo_accounts: HashMap<String, String>,
    test_identity_suffixes: Vec<String>,
    test_code: Option<String>,
}

impl StaticPolicy {
    pub fn from_config(config: &PolicyConfig, environment: Environment) -> Self {
        let demo_accounts = config
            .demo_accounts
            .iter()
            .filter_map(|account| {
                let subject = SubjectKey::parse(&account.subject, "subject").ok()?;
                Some((subject.as_str().to_string(), account.code.trim().to_string()))
            })
            .collect();

        let (test_identity_suffixes, test_code) = if environment.is_production() {
            (Vec::new(), None)
        } else {
            (
                config
                    .test_identity_suffixes
                    .iter()
                    .map(|suffix| suffix.trim().to_lowercase())
                    .filter(|suffix| !suffix.is_empty())
                    .collect(),
                config.test_code.clone(),
            )
        };

        Self {
            demo_accounts,
            test_identity_suffixes,
            test_code,
        }
    }

    /// Whether any carve-out is configured at all
    pub fn is_empty(&self) -> bool {
        self.demo_accounts.is_empty() && self.fixed_test_code().is_none()
    }

    fn fixed_test_code(&self) -> Option<&str> {
        if self.test_identity_suffixes.is_empty() {
            return None;
        }
        self.test_code.as_deref()
    }

    fn fixed_code_for(&self, subject: &SubjectKey) -> Option<&str> {
        if let Some(code) = self.demo_accounts.get(subject.as_str()) {
            return Some(code);
        }
        let code = self.fixed_test_code()?;
        self.test_identity_suffixes
            .iter()
            .any(|suffix| subject.as_str().ends_with(suffix.as_str()))
            .then_some(code)
    }
}

impl AccessPolicy for StaticPolicy {
    fn skip_issue(&self, subject: &SubjectKey) -> bool {
        self.fixed_code_for(subject).is_some()
    }

    fn forced_outcome(&self, subject: &SubjectKey, candidate: &str) -> Option<bool> {
        self.fixed_code_for(subject)
            .map(|code| constant_time_eq(code.as_bytes(), candidate.trim().as_bytes()))
    }
}
