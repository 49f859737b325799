//! Silo configuration surface (§6).

// Layer 1: Standard library
use std::time::Duration;

// Layer 2: Third-party
use serde::{Deserialize, Serialize};

// Layer 3: Internal
use crate::mailbox::BackpressureStrategy;
use crate::supervisor::RestartPolicy;
use crate::util::ids::SiloId;

/// Default heartbeat cadence for cluster membership (§4.3).
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);

/// Default failure-detection threshold: `3 * heartbeat_interval`.
pub const DEFAULT_FAILURE_THRESHOLD: Duration = Duration::from_secs(15);

/// Default virtual nodes contributed per silo to the hash ring (§4.2).
pub const DEFAULT_VIRTUAL_NODES_PER_SILO: u32 = crate::ring::DEFAULT_VIRTUAL_NODES_PER_SILO;

/// Default bounded mailbox capacity (§4.5).
pub const DEFAULT_MAILBOX_CAPACITY: usize = crate::mailbox::DEFAULT_MAILBOX_CAPACITY;

/// Default idle window before an inactive actor is eligible for
/// deactivation (§4.6 "virtual lifetime").
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(600);

/// Default grace period a silo waits for in-flight turns to finish
/// during graceful shutdown (§4.11).
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Default reminder scan interval (§4.10).
pub const DEFAULT_REMINDER_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Default call-chain hop limit (§4.8).
pub const DEFAULT_CHAIN_MAX_DEPTH: u32 = 64;

/// Default call-chain deadline for a freshly-rooted chain (§4.8).
pub const DEFAULT_CHAIN_DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

/// The three BEAM-inspired restart strategies a parent applies to its
/// children on escalation (§4.9).
///
/// Named to match this crate's vocabulary rather than the teacher's
/// (`OneForAll` there is `AllForOne` here — same behavior, see
/// DESIGN.md for the rationale).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SupervisionStrategy {
    /// Restart only the failed child.
    #[default]
    OneForOne,
    /// Restart every sibling when one fails.
    AllForOne,
    /// Restart the failed child and every sibling started after it.
    RestForOne,
}

/// Everything one silo process needs to configure its runtime (§6):
/// identity, cluster membership tunables, ring fan-out, mailbox
/// defaults, lifetime/shutdown timeouts, reminder cadence, and the
/// supervision/call-chain defaults new activations inherit unless a
/// registration overrides them.
///
/// # Examples
///
/// ```rust
/// use quark::silo::SiloConfig;
/// use quark::util::SiloId;
///
/// let config = SiloConfig::builder(SiloId::new("silo-1"), "127.0.0.1:7000")
///     .with_mailbox_capacity(500)
///     .build()
///     .unwrap();
/// assert_eq!(config.mailbox_capacity, 500);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiloConfig {
    pub silo_id: SiloId,
    pub endpoint: String,
    pub heartbeat_interval: Duration,
    pub failure_threshold: Duration,
    pub virtual_nodes_per_silo: u32,
    pub mailbox_capacity: usize,
    pub mailbox_overflow_policy: BackpressureStrategy,
    pub idle_timeout: Duration,
    pub shutdown_timeout: Duration,
    pub reminder_tick_interval: Duration,
    pub default_supervision_strategy: SupervisionStrategy,
    pub default_restart_policy: RestartPolicy,
    pub chain_max_depth: u32,
    pub chain_default_deadline: Duration,
}

impl SiloConfig {
    /// Creates a builder seeded with the only two fields that have no
    /// sensible default: this silo's identity and its dial-in address.
    pub fn builder(silo_id: SiloId, endpoint: impl Into<String>) -> SiloConfigBuilder {
        SiloConfigBuilder {
            config: Self {
                silo_id,
                endpoint: endpoint.into(),
                heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
                failure_threshold: DEFAULT_FAILURE_THRESHOLD,
                virtual_nodes_per_silo: DEFAULT_VIRTUAL_NODES_PER_SILO,
                mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
                mailbox_overflow_policy: BackpressureStrategy::default(),
                idle_timeout: DEFAULT_IDLE_TIMEOUT,
                shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
                reminder_tick_interval: DEFAULT_REMINDER_TICK_INTERVAL,
                default_supervision_strategy: SupervisionStrategy::default(),
                default_restart_policy: RestartPolicy::Permanent,
                chain_max_depth: DEFAULT_CHAIN_MAX_DEPTH,
                chain_default_deadline: DEFAULT_CHAIN_DEFAULT_DEADLINE,
            },
        }
    }

    /// Validates cross-field invariants the builder cannot enforce at
    /// construction time (zero durations, zero capacities).
    pub fn validate(&self) -> Result<(), String> {
        if self.mailbox_capacity == 0 {
            return Err("mailbox_capacity must be > 0".to_string());
        }
        if self.virtual_nodes_per_silo == 0 {
            return Err("virtual_nodes_per_silo must be > 0".to_string());
        }
        if self.heartbeat_interval.is_zero() {
            return Err("heartbeat_interval must be > 0".to_string());
        }
        if self.failure_threshold <= self.heartbeat_interval {
            return Err("failure_threshold must exceed heartbeat_interval".to_string());
        }
        if self.shutdown_timeout.is_zero() {
            return Err("shutdown_timeout must be > 0".to_string());
        }
        if self.chain_max_depth == 0 {
            return Err("chain_max_depth must be > 0".to_string());
        }
        Ok(())
    }

    /// The silo's self-expel threshold, twice `failure_threshold` —
    /// sustained loss of contact with the membership table for this
    /// long causes the silo to voluntarily mark itself `ShuttingDown`
    /// (§4.3).
    pub fn self_expel_threshold(&self) -> Duration {
        self.failure_threshold * 2
    }
}

/// Builder for [`SiloConfig`] with a fluent API, following this crate's
/// builder-plus-validate convention.
#[derive(Debug)]
pub struct SiloConfigBuilder {
    config: SiloConfig,
}

impl SiloConfigBuilder {
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.config.heartbeat_interval = interval;
        self
    }

    pub fn with_failure_threshold(mut self, threshold: Duration) -> Self {
        self.config.failure_threshold = threshold;
        self
    }

    pub fn with_virtual_nodes_per_silo(mut self, count: u32) -> Self {
        self.config.virtual_nodes_per_silo = count;
        self
    }

    pub fn with_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.config.mailbox_capacity = capacity;
        self
    }

    pub fn with_mailbox_overflow_policy(mut self, policy: BackpressureStrategy) -> Self {
        self.config.mailbox_overflow_policy = policy;
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.config.shutdown_timeout = timeout;
        self
    }

    pub fn with_reminder_tick_interval(mut self, interval: Duration) -> Self {
        self.config.reminder_tick_interval = interval;
        self
    }

    pub fn with_default_supervision_strategy(mut self, strategy: SupervisionStrategy) -> Self {
        self.config.default_supervision_strategy = strategy;
        self
    }

    pub fn with_default_restart_policy(mut self, policy: RestartPolicy) -> Self {
        self.config.default_restart_policy = policy;
        self
    }

    pub fn with_chain_max_depth(mut self, depth: u32) -> Self {
        self.config.chain_max_depth = depth;
        self
    }

    pub fn with_chain_default_deadline(mut self, deadline: Duration) -> Self {
        self.config.chain_default_deadline = deadline;
        self
    }

    pub fn build(self) -> Result<SiloConfig, String> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_internally_consistent() {
        let config = SiloConfig::builder(SiloId::new("s1"), "127.0.0.1:7000").build().unwrap();
        assert_eq!(config.mailbox_capacity, DEFAULT_MAILBOX_CAPACITY);
        assert_eq!(config.virtual_nodes_per_silo, DEFAULT_VIRTUAL_NODES_PER_SILO);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_mailbox_capacity_rejected() {
        let result = SiloConfig::builder(SiloId::new("s1"), "127.0.0.1:7000")
            .with_mailbox_capacity(0)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn failure_threshold_must_exceed_heartbeat_interval() {
        let result = SiloConfig::builder(SiloId::new("s1"), "127.0.0.1:7000")
            .with_heartbeat_interval(Duration::from_secs(10))
            .with_failure_threshold(Duration::from_secs(5))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn self_expel_threshold_doubles_failure_threshold() {
        let config = SiloConfig::builder(SiloId::new("s1"), "127.0.0.1:7000").build().unwrap();
        assert_eq!(config.self_expel_threshold(), config.failure_threshold * 2);
    }

    #[test]
    fn builder_applies_every_override() {
        let config = SiloConfig::builder(SiloId::new("s1"), "127.0.0.1:7000")
            .with_mailbox_capacity(250)
            .with_mailbox_overflow_policy(BackpressureStrategy::DropOldest)
            .with_default_supervision_strategy(SupervisionStrategy::AllForOne)
            .with_chain_max_depth(8)
            .build()
            .unwrap();
        assert_eq!(config.mailbox_capacity, 250);
        assert_eq!(config.mailbox_overflow_policy, BackpressureStrategy::DropOldest);
        assert_eq!(config.default_supervision_strategy, SupervisionStrategy::AllForOne);
        assert_eq!(config.chain_max_depth, 8);
    }
}
