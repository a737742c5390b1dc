mod window;

pub use window::{ReplicationManager, ReplicationWindow};
