//! Cluster membership table and failure detection (§4.3).

pub mod error;
pub mod in_memory;
pub mod service;
pub mod traits;
pub mod types;

pub use error::MembershipError;
pub use in_memory::InMemoryMembershipTable;
pub use service::{MembershipConfig, MembershipService};
pub use traits::MembershipTable;
pub use types::{MembershipChange, SiloInfo, SiloStatus};
