// Layer 1: Standard library imports
use std::cell::RefCell;
use std::collections::HashSet;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use super::error::ChainError;
use crate::util::ids::ChainId;

/// Call-chain metadata carried in envelope metadata and restored into
/// ambient context ([`CURRENT_CHAIN`]) when an actor begins processing
/// the envelope that carries it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainMeta {
    pub chain_id: ChainId,
    pub visited: HashSet<(String, String)>,
    pub depth: u32,
    pub deadline: DateTime<Utc>,
}

impl ChainMeta {
    /// Starts a fresh chain for an externally-originated request.
    pub fn new_root(max_depth: u32, default_deadline: std::time::Duration) -> Self {
        let _ = max_depth; // depth cap enforced on hop, not at root
        Self {
            chain_id: ChainId::new(),
            visited: HashSet::new(),
            depth: 0,
            deadline: Utc::now()
                + ChronoDuration::from_std(default_deadline).unwrap_or(ChronoDuration::zero()),
        }
    }

    /// Produces the chain state to attach to an outbound call from
    /// `caller` to `callee`, checking reentrancy and depth along the way.
    pub fn enter_hop(
        &self,
        caller_type: &str,
        caller_id: &str,
        callee_type: &str,
        callee_id: &str,
        max_depth: u32,
    ) -> Result<Self, ChainError> {
        if Utc::now() >= self.deadline {
            return Err(ChainError::DeadlineExceeded {
                chain_id: self.chain_id,
            });
        }
        if self.depth >= max_depth {
            return Err(ChainError::DepthExceeded {
                chain_id: self.chain_id,
                depth: self.depth,
                max_depth,
            });
        }

        let is_self_call = caller_type == callee_type && caller_id == callee_id;
        let callee_key = (callee_type.to_string(), callee_id.to_string());
        if !is_self_call && self.visited.contains(&callee_key) {
            return Err(ChainError::ReentrancyDetected {
                chain_id: self.chain_id,
                actor_type: callee_type.to_string(),
                actor_id: callee_id.to_string(),
            });
        }

        let mut visited = self.visited.clone();
        visited.insert((caller_type.to_string(), caller_id.to_string()));
        Ok(Self {
            chain_id: self.chain_id,
            visited,
            depth: self.depth + 1,
            deadline: self.deadline,
        })
    }

    /// Checked entry at dispatch time on the callee side: fails if the
    /// callee itself is already in `visited` (the cross-chain "same actor"
    /// case §4.8 still blocks even though `enter_hop` allows direct
    /// self-invocation).
    pub fn check_entry(&self, actor_type: &str, actor_id: &str) -> Result<(), ChainError> {
        let key = (actor_type.to_string(), actor_id.to_string());
        if self.visited.contains(&key) {
            return Err(ChainError::ReentrancyDetected {
                chain_id: self.chain_id,
                actor_type: actor_type.to_string(),
                actor_id: actor_id.to_string(),
            });
        }
        Ok(())
    }
}

tokio::task_local! {
    /// The chain of the envelope currently being processed on this task,
    /// if any. Set by the dispatcher turn-loop around actor invocation,
    /// read by outbound calls so they inherit and extend it.
    pub static CURRENT_CHAIN: RefCell<Option<ChainMeta>>;
}

/// Runs `f` with `chain` installed as the ambient chain for the duration
/// of the returned future.
pub async fn scope<F, T>(chain: Option<ChainMeta>, f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    CURRENT_CHAIN.scope(RefCell::new(chain), f).await
}

/// Clones the ambient chain, if the current task has one installed.
pub fn current() -> Option<ChainMeta> {
    CURRENT_CHAIN
        .try_with(|cell| cell.borrow().clone())
        .unwrap_or(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn root_chain_has_zero_depth_and_empty_visited() {
        let c = ChainMeta::new_root(10, Duration::from_secs(30));
        assert_eq!(c.depth, 0);
        assert!(c.visited.is_empty());
    }

    #[test]
    fn reentrancy_detected_on_revisit() {
        let c = ChainMeta::new_root(10, Duration::from_secs(30));
        let hop1 = c.enter_hop("A", "1", "B", "2", 10).unwrap();
        // B calling back into A is reentrant.
        let err = hop1.enter_hop("B", "2", "A", "1", 10).unwrap_err();
        assert!(matches!(err, ChainError::ReentrancyDetected { .. }));
    }

    #[test]
    fn self_invocation_permitted() {
        let c = ChainMeta::new_root(10, Duration::from_secs(30));
        let hop = c.enter_hop("A", "1", "A", "1", 10);
        assert!(hop.is_ok());
    }

    #[test]
    fn depth_cap_enforced() {
        let mut c = ChainMeta::new_root(1, Duration::from_secs(30));
        c = c.enter_hop("A", "1", "B", "2", 1).unwrap();
        let err = c.enter_hop("B", "2", "C", "3", 1).unwrap_err();
        assert!(matches!(err, ChainError::DepthExceeded { .. }));
    }

    #[tokio::test]
    async fn scope_installs_ambient_chain() {
        let c = ChainMeta::new_root(10, Duration::from_secs(30));
        let id = c.chain_id;
        let observed = scope(Some(c), async { current().map(|c| c.chain_id) }).await;
        assert_eq!(observed, Some(id));
    }
}
