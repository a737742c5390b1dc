use std::cell::Cell;
use std::rc::Rc;

use crate::session::agent::{AgentDatum, AgentType, NetworkInterfaceId};

/// Token returned by a subscription. Cancelling is safe at any point,
/// including from inside a handler while the bus is mid-dispatch: the slot is
/// only marked dead and compacted after the dispatch pass finishes.
#[derive(Debug, Clone)]
pub struct Subscription {
    active: Rc<Cell<bool>>,
}

impl Subscription {
    fn new() -> Self {
        Self {
            active: Rc::new(Cell::new(true)),
        }
    }

    pub fn cancel(&self) {
        self.active.set(false);
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

struct Slot<T> {
    subscription: Subscription,
    handler: Box<dyn FnMut(T)>,
}

/// Ordered observer list for one notification kind. Handlers run in
/// subscription order and receive the payload by value; they never get a live
/// reference into core state.
pub struct HandlerList<T> {
    slots: Vec<Slot<T>>,
}

impl<T: Clone> HandlerList<T> {
    fn new() -> Self {
        Self { slots: Vec::new() }
    }

    fn subscribe(&mut self, handler: impl FnMut(T) + 'static) -> Subscription {
        let subscription = Subscription::new();
        self.slots.push(Slot {
            subscription: subscription.clone(),
            handler: Box::new(handler),
        });
        subscription
    }

    fn dispatch(&mut self, value: T) {
        // Index loop over the current length: handlers subscribed during this
        // pass are not invoked until the next dispatch.
        let len = self.slots.len();
        for i in 0..len {
            if self.slots[i].subscription.is_active() {
                (self.slots[i].handler)(value.clone());
            }
        }
        self.slots.retain(|slot| slot.subscription.is_active());
    }

    fn len(&self) -> usize {
        self.slots.len()
    }
}

impl<T: Clone> Default for HandlerList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Fan-out for the four session notifications. No business logic lives here;
/// the lifecycle state machine decides when to fire.
#[derive(Default)]
pub struct SessionEventBus {
    session_init: HandlerList<NetworkInterfaceId>,
    session_shutdown: HandlerList<NetworkInterfaceId>,
    connection_acquired: HandlerList<AgentDatum>,
    endpoint_disconnected: HandlerList<AgentType>,
}

impl SessionEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_session_init_handler(
        &mut self,
        handler: impl FnMut(NetworkInterfaceId) + 'static,
    ) -> Subscription {
        self.session_init.subscribe(handler)
    }

    pub fn add_session_shutdown_handler(
        &mut self,
        handler: impl FnMut(NetworkInterfaceId) + 'static,
    ) -> Subscription {
        self.session_shutdown.subscribe(handler)
    }

    pub fn add_connection_acquired_handler(
        &mut self,
        handler: impl FnMut(AgentDatum) + 'static,
    ) -> Subscription {
        self.connection_acquired.subscribe(handler)
    }

    pub fn add_endpoint_disconnected_handler(
        &mut self,
        handler: impl FnMut(AgentType) + 'static,
    ) -> Subscription {
        self.endpoint_disconnected.subscribe(handler)
    }

    pub fn fire_session_init(&mut self, interface: NetworkInterfaceId) {
        self.session_init.dispatch(interface);
    }

    pub fn fire_session_shutdown(&mut self, interface: NetworkInterfaceId) {
        self.session_shutdown.dispatch(interface);
    }

    pub fn fire_connection_acquired(&mut self, datum: AgentDatum) {
        self.connection_acquired.dispatch(datum);
    }

    pub fn fire_endpoint_disconnected(&mut self, agent_type: AgentType) {
        self.endpoint_disconnected.dispatch(agent_type);
    }

    pub fn handler_count(&self) -> usize {
        self.session_init.len()
            + self.session_shutdown.len()
            + self.connection_acquired.len()
            + self.endpoint_disconnected.len()
    }
}
