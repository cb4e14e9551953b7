//! Service issuing slot fetches on the worker pool.
//!
//! Slots live here, on the coordination thread. Workers only read bytes and
//! post a [`FetchCompletion`]; [`FetchService::pump`] applies completions to
//! their slots, where the generation guard drops stale ones.

use crate::dispatch::{MainQueue, Poster};
use crate::image_loader::ImageSource;
use crate::state::{Entry, FetchCompletion, FetchSlot, FetchTicket, SlotId};
use log::debug;
use rayon::ThreadPool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub struct FetchService {
    pool: Arc<ThreadPool>,
    source: Arc<dyn ImageSource>,
    queue: MainQueue<FetchCompletion>,
    slots: HashMap<SlotId, FetchSlot>,
    next_slot: u64,
    in_flight: usize,
}

impl FetchService {
    /// Creates a fetch service using `pool` for fetch work.
    pub fn new(pool: Arc<ThreadPool>, source: Arc<dyn ImageSource>) -> Self {
        Self {
            pool,
            source,
            queue: MainQueue::new(),
            slots: HashMap::new(),
            next_slot: 0,
            in_flight: 0,
        }
    }

    /// Allocates a new, empty presentation slot.
    pub fn create_slot(&mut self) -> SlotId {
        self.next_slot += 1;
        let id = SlotId(self.next_slot);
        self.slots.insert(id, FetchSlot::new(id));
        id
    }

    /// Drops a slot. Its in-flight result will be discarded.
    pub fn release_slot(&mut self, id: SlotId) -> bool {
        self.slots.remove(&id).is_some()
    }

    pub fn slot(&self, id: SlotId) -> Option<&FetchSlot> {
        self.slots.get(&id)
    }

    /// Number of fetches issued whose result has not been pumped yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Binds `slot` to `entry` and issues exactly one fetch for it without blocking.
    ///
    /// Returns `false` for an unknown slot.
    pub fn bind(&mut self, slot: SlotId, entry: &Entry) -> bool {
        let Some(state) = self.slots.get_mut(&slot) else {
            return false;
        };
        let ticket = state.bind(entry);
        debug!("{}: fetching {} (generation {})", slot, ticket.url, ticket.generation);
        self.spawn_fetch(ticket);
        true
    }

    /// Clears a slot without issuing a fetch.
    pub fn unbind(&mut self, slot: SlotId) {
        if let Some(state) = self.slots.get_mut(&slot) {
            state.unbind();
        }
    }

    /// Applies every completion posted so far. Returns how many were written to a slot.
    pub fn pump(&mut self) -> usize {
        self.queue
            .drain()
            .into_iter()
            .map(|completion| self.deliver(completion))
            .filter(|written| *written)
            .count()
    }

    /// Waits up to `timeout` for one completion, then applies it and everything else queued.
    pub fn pump_blocking(&mut self, timeout: Duration) -> usize {
        let Some(first) = self.queue.recv_timeout(timeout) else {
            return 0;
        };
        let written = usize::from(self.deliver(first));
        written + self.pump()
    }

    fn deliver(&mut self, completion: FetchCompletion) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        match self.slots.get_mut(&completion.ticket.slot) {
            Some(slot) => slot.apply(completion),
            None => {
                debug!("{} released, dropping result", completion.ticket.slot);
                false
            }
        }
    }

    fn spawn_fetch(&mut self, ticket: FetchTicket) {
        self.in_flight += 1;
        let source = Arc::clone(&self.source);
        let poster: Poster<FetchCompletion> = self.queue.poster();
        self.pool.spawn(move || {
            let result = source.fetch(&ticket.url).map(Arc::new);
            poster.post(FetchCompletion { ticket, result });
        });
    }
}
