//! Restart policy, shutdown policy, and child lifecycle types consumed by
//! the activation layer's dispatcher.

// Layer 1: Standard library imports
use std::fmt;
use std::time::Duration;

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a child process.
///
/// Child IDs are UUID-based to ensure uniqueness across the supervisor tree.
///
/// # Examples
///
/// ```rust
/// use quark::supervisor::ChildId;
///
/// let id1 = ChildId::new();
/// let id2 = ChildId::new();
///
/// assert_ne!(id1, id2);  // Each ID is unique
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChildId(Uuid);

impl ChildId {
    /// Creates a new unique child ID.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quark::supervisor::ChildId;
    ///
    /// let id = ChildId::new();
    /// println!("Child ID: {}", id);
    /// ```
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ChildId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ChildId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Restart policy for supervised children.
///
/// Determines when a child should be restarted after termination.
/// Based on Erlang/OTP supervisor restart policies.
///
/// # Examples
///
/// ```rust
/// use quark::supervisor::RestartPolicy;
///
/// let permanent = RestartPolicy::Permanent;
/// assert!(permanent.should_restart(true));   // Restart on error
/// assert!(permanent.should_restart(false));  // Restart on normal exit
///
/// let transient = RestartPolicy::Transient;
/// assert!(transient.should_restart(true));   // Restart on error
/// assert!(!transient.should_restart(false)); // Don't restart on normal exit
///
/// let temporary = RestartPolicy::Temporary;
/// assert!(!temporary.should_restart(true));  // Never restart
/// assert!(!temporary.should_restart(false)); // Never restart
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestartPolicy {
    /// Always restart the child, regardless of exit reason.
    ///
    /// Use for critical services that must always be running.
    Permanent,

    /// Restart only if the child exits abnormally (with an error).
    ///
    /// Use for workers that may complete successfully and shouldn't restart.
    Transient,

    /// Never restart the child, regardless of exit reason.
    ///
    /// Use for one-shot tasks or temporary processes.
    Temporary,
}

impl RestartPolicy {
    /// Returns `true` if this policy should restart on the given exit condition.
    ///
    /// # Parameters
    ///
    /// - `is_error`: `true` if the child exited with an error, `false` for normal exit
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quark::supervisor::RestartPolicy;
    ///
    /// assert!(RestartPolicy::Permanent.should_restart(true));
    /// assert!(RestartPolicy::Permanent.should_restart(false));
    ///
    /// assert!(RestartPolicy::Transient.should_restart(true));
    /// assert!(!RestartPolicy::Transient.should_restart(false));
    ///
    /// assert!(!RestartPolicy::Temporary.should_restart(true));
    /// assert!(!RestartPolicy::Temporary.should_restart(false));
    /// ```
    pub fn should_restart(&self, is_error: bool) -> bool {
        match self {
            RestartPolicy::Permanent => true,
            RestartPolicy::Transient => is_error,
            RestartPolicy::Temporary => false,
        }
    }
}

/// Shutdown policy for supervised children.
///
/// Determines how a child should be stopped when requested.
///
/// # Examples
///
/// ```rust
/// use quark::supervisor::ShutdownPolicy;
/// use std::time::Duration;
///
/// let graceful = ShutdownPolicy::Graceful(Duration::from_secs(5));
/// let immediate = ShutdownPolicy::Immediate;
/// let infinity = ShutdownPolicy::Infinity;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownPolicy {
    /// Graceful shutdown with timeout.
    ///
    /// Attempt graceful shutdown, forcefully terminate if timeout expires.
    Graceful(Duration),

    /// Immediate forceful termination.
    ///
    /// No graceful shutdown attempt, terminate immediately.
    Immediate,

    /// Wait indefinitely for graceful shutdown.
    ///
    /// No timeout, wait forever for child to stop gracefully.
    Infinity,
}

impl ShutdownPolicy {
    /// Returns the timeout duration for this policy, if any.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quark::supervisor::ShutdownPolicy;
    /// use std::time::Duration;
    ///
    /// let graceful = ShutdownPolicy::Graceful(Duration::from_secs(5));
    /// assert_eq!(graceful.timeout(), Some(Duration::from_secs(5)));
    ///
    /// let immediate = ShutdownPolicy::Immediate;
    /// assert_eq!(immediate.timeout(), Some(Duration::ZERO));
    ///
    /// let infinity = ShutdownPolicy::Infinity;
    /// assert_eq!(infinity.timeout(), None);
    /// ```
    pub fn timeout(&self) -> Option<Duration> {
        match self {
            ShutdownPolicy::Graceful(duration) => Some(*duration),
            ShutdownPolicy::Immediate => Some(Duration::ZERO),
            ShutdownPolicy::Infinity => None,
        }
    }

    /// Returns `true` if this is a graceful shutdown policy.
    pub fn is_graceful(&self) -> bool {
        !matches!(self, ShutdownPolicy::Immediate)
    }
}

/// Current state of a supervised child.
///
/// Tracks the lifecycle state of a child process within the supervisor.
///
/// # State Transitions
///
/// ```text
/// Starting → Running → Stopping → Stopped
///     ↓         ↓
/// Failed    Restarting → Starting
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChildState {
    /// Child is in the process of starting
    Starting,

    /// Child is running normally
    Running,

    /// Child is in the process of stopping
    Stopping,

    /// Child has stopped
    Stopped,

    /// Child is being restarted after a failure
    Restarting,

    /// Child has failed and is awaiting supervisor decision
    Failed,
}

impl ChildState {
    /// Returns `true` if the child is in a terminal state.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quark::supervisor::ChildState;
    ///
    /// assert!(ChildState::Stopped.is_terminal());
    /// assert!(ChildState::Failed.is_terminal());
    /// assert!(!ChildState::Running.is_terminal());
    /// ```
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChildState::Stopped | ChildState::Failed)
    }

    /// Returns `true` if the child is in a transitional state.
    pub fn is_transitional(&self) -> bool {
        matches!(
            self,
            ChildState::Starting | ChildState::Stopping | ChildState::Restarting
        )
    }

    /// Returns `true` if the child is running.
    pub fn is_running(&self) -> bool {
        matches!(self, ChildState::Running)
    }
}

/// Health status of a supervised child.
///
/// Used by `Child::health_check()` to report operational status, enabling
/// proactive failure detection and recovery.
///
/// # Examples
///
/// ```rust
/// use quark::supervisor::ChildHealth;
///
/// let healthy = ChildHealth::Healthy;
/// assert!(healthy.is_healthy());
///
/// let degraded = ChildHealth::Degraded("High latency".into());
/// assert!(degraded.is_degraded());
/// assert_eq!(degraded.reason(), Some("High latency"));
///
/// let failed = ChildHealth::Failed("Connection lost".into());
/// assert!(failed.is_failed());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChildHealth {
    /// Child is operating normally
    Healthy,

    /// Child is operational but degraded.
    ///
    /// The child can still process work but is showing signs of issues
    /// (e.g., high latency, resource pressure, elevated error rates).
    Degraded(String),

    /// Child has failed and requires restart.
    Failed(String),
}

impl ChildHealth {
    /// Returns `true` if the child is healthy.
    pub fn is_healthy(&self) -> bool {
        matches!(self, ChildHealth::Healthy)
    }

    /// Returns `true` if the child is degraded.
    pub fn is_degraded(&self) -> bool {
        matches!(self, ChildHealth::Degraded(_))
    }

    /// Returns `true` if the child has failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, ChildHealth::Failed(_))
    }

    /// Returns the reason string if degraded or failed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quark::supervisor::ChildHealth;
    ///
    /// let healthy = ChildHealth::Healthy;
    /// assert_eq!(healthy.reason(), None);
    ///
    /// let degraded = ChildHealth::Degraded("Queue backlog".into());
    /// assert_eq!(degraded.reason(), Some("Queue backlog"));
    /// ```
    pub fn reason(&self) -> Option<&str> {
        match self {
            ChildHealth::Healthy => None,
            ChildHealth::Degraded(reason) | ChildHealth::Failed(reason) => Some(reason),
        }
    }
}
