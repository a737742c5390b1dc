mod bus;

pub use bus::{SessionEventBus, Subscription};
