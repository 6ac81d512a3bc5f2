//! Process-wide outbound network policy.
//!
//! Every HTTP call in the crate asks [`check_outbound`] first. Tests use
//! [`NetworkPolicyGuard`] to prove that a code path performs no I/O.

use crate::errors::{ProviderError, ProviderResult};
use std::sync::{Mutex, OnceLock};

pub const NETWORK_POLICY_ENV: &str = "SPLITWATCH_NETWORK_POLICY";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NetworkPolicy {
    Allow,
    Deny(String),
}

fn state() -> &'static Mutex<NetworkPolicy> {
    static STATE: OnceLock<Mutex<NetworkPolicy>> = OnceLock::new();
    STATE.get_or_init(|| Mutex::new(NetworkPolicy::Allow))
}

/// Scoped policy override; the previous policy is restored on drop.
pub struct NetworkPolicyGuard {
    previous: NetworkPolicy,
}

impl NetworkPolicyGuard {
    pub fn set(policy: NetworkPolicy) -> Self {
        let mut current = state().lock().unwrap_or_else(|p| p.into_inner());
        let previous = std::mem::replace(&mut *current, policy);
        Self { previous }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self::set(NetworkPolicy::Deny(reason.into()))
    }
}

impl Drop for NetworkPolicyGuard {
    fn drop(&mut self) {
        if let Ok(mut current) = state().lock() {
            *current = self.previous.clone();
        }
    }
}

pub fn check_outbound(target: &str) -> ProviderResult<()> {
    match effective_policy() {
        NetworkPolicy::Allow => Ok(()),
        NetworkPolicy::Deny(reason) => Err(ProviderError::Blocked {
            target: target.to_string(),
            reason,
        }),
    }
}

fn effective_policy() -> NetworkPolicy {
    if let Ok(raw) = std::env::var(NETWORK_POLICY_ENV) {
        if raw.trim().eq_ignore_ascii_case("deny") {
            return NetworkPolicy::Deny(format!("{NETWORK_POLICY_ENV}=deny"));
        }
    }
    state()
        .lock()
        .map(|p| p.clone())
        .unwrap_or(NetworkPolicy::Allow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn scoped_deny_blocks_and_restores() {
        std::env::remove_var(NETWORK_POLICY_ENV);
        let guard = NetworkPolicyGuard::deny("test deny");
        let err = check_outbound("test-target").unwrap_err().to_string();
        assert!(err.contains("outbound network blocked by policy"));
        assert!(err.contains("test-target"));
        drop(guard);
        check_outbound("test-target").unwrap();
    }

    #[test]
    #[serial]
    fn env_deny_overrides_scoped_allow() {
        let previous = std::env::var(NETWORK_POLICY_ENV).ok();
        let _guard = NetworkPolicyGuard::set(NetworkPolicy::Allow);
        std::env::set_var(NETWORK_POLICY_ENV, "deny");
        let err = check_outbound("env-target").unwrap_err().to_string();
        assert!(err.contains("SPLITWATCH_NETWORK_POLICY=deny"));
        match previous {
            Some(v) => std::env::set_var(NETWORK_POLICY_ENV, v),
            None => std::env::remove_var(NETWORK_POLICY_ENV),
        }
    }
}
