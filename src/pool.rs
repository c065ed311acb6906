//! # Connection Pool
//!
//! One fixed-size sub-pool of connections per configured endpoint. Checkout
//! picks a host at a uniformly random starting point and takes the first
//! free connection it finds; release puts the connection back into its slot
//! and wakes one waiter.
//!
//! ## Waiting
//!
//! When every connection is checked out, `get_connection` parks on a
//! condition variable instead of spinning, and gives up once the cumulative
//! wait exceeds the pool's `wait_timeout`. There is no fairness ordering
//! between waiters; contention is resolved by whoever rescans first after a
//! release.
//!
//! The pool is the only shared mutable state in the crate: a single mutex
//! serializes checkout and release, so the free/busy transition of a slot is
//! atomic and a connection is never handed to two borrowers at once.

use std::collections::HashMap;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use log::{debug, warn};
use rand::Rng;

use crate::connection::{Connection, ConnectionFactory};
use crate::error::{StoreError, StoreResult};

/// One pool slot. `connection` is `None` exactly while checked out.
struct Slot {
    id: u64,
    connection: Option<Connection>,
}

struct PoolInner {
    factories: Vec<ConnectionFactory>,
    connections_per_host: usize,
    pool: HashMap<String, Vec<Slot>>,
}

impl PoolInner {
    /// Eagerly build `connections_per_host` closed connections per factory,
    /// all initially free. Discards any previous pool map.
    fn initialize_pool(&mut self) {
        let mut pool = HashMap::new();
        for factory in &self.factories {
            let mut slots = Vec::with_capacity(self.connections_per_host);
            for _ in 0..self.connections_per_host {
                let connection = factory.create_connection();
                slots.push(Slot {
                    id: connection.id(),
                    connection: Some(connection),
                });
            }
            pool.insert(factory.host().to_string(), slots);
        }
        self.pool = pool;
    }

    /// Scan hosts starting from a random index and take the first free
    /// connection. Returns `None` when everything is checked out.
    fn take_free(&mut self) -> Option<Connection> {
        let hosts: Vec<String> = self.pool.keys().cloned().collect();
        if hosts.is_empty() {
            return None;
        }
        let start = rand::thread_rng().gen_range(0..hosts.len());
        for offset in 0..hosts.len() {
            let host = &hosts[(start + offset) % hosts.len()];
            if let Some(slots) = self.pool.get_mut(host) {
                for slot in slots.iter_mut() {
                    if slot.connection.is_some() {
                        return slot.connection.take();
                    }
                }
            }
        }
        None
    }

    /// Return a connection to its slot. Fails when the slot no longer
    /// exists, which happens after a factory rebuild.
    fn put_back(&mut self, connection: Connection) -> bool {
        let host = connection.host().to_string();
        let id = connection.id();
        if let Some(slots) = self.pool.get_mut(&host) {
            if let Some(slot) = slots.iter_mut().find(|slot| slot.id == id) {
                slot.connection = Some(connection);
                return true;
            }
        }
        false
    }
}

/// Fixed-size connection pool with bounded-wait checkout.
pub struct ConnectionPool {
    wait_timeout: Duration,
    inner: Mutex<PoolInner>,
    available: Condvar,
}

impl ConnectionPool {
    /// Build a pool with `connections_per_host` connections for each
    /// factory's endpoint.
    pub fn new(
        connections_per_host: usize,
        wait_timeout: Duration,
        factories: Vec<ConnectionFactory>,
    ) -> Self {
        debug!(
            "setting up new connection pool ({} connections per host, {} hosts)",
            connections_per_host,
            factories.len()
        );
        let mut inner = PoolInner {
            factories,
            connections_per_host,
            pool: HashMap::new(),
        };
        inner.initialize_pool();
        Self {
            wait_timeout,
            inner: Mutex::new(inner),
            available: Condvar::new(),
        }
    }

    /// Borrow a free connection, opening it if necessary.
    ///
    /// Fails immediately with a configuration error when no factories are
    /// configured, and with a timeout error when no connection frees up
    /// within the pool's wait budget.
    pub fn get_connection(&self) -> StoreResult<Connection> {
        let deadline = Instant::now() + self.wait_timeout;
        let mut inner = self.inner.lock().unwrap();
        if inner.factories.is_empty() {
            return Err(StoreError::configuration("no connection factories defined"));
        }

        loop {
            if let Some(mut connection) = inner.take_free() {
                // Dial outside the lock; a slow endpoint must not stall
                // other borrowers.
                drop(inner);
                return match connection.open() {
                    Ok(()) => {
                        debug!("connection established: {}", connection.host());
                        Ok(connection)
                    }
                    Err(e) => {
                        // The slot stays free for the next attempt.
                        let mut inner = self.inner.lock().unwrap();
                        inner.put_back(connection);
                        self.available.notify_one();
                        Err(e)
                    }
                };
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(StoreError::Timeout(self.wait_timeout));
            }
            let (guard, _timed_out) = self
                .available
                .wait_timeout(inner, deadline - now)
                .unwrap();
            inner = guard;
        }
    }

    /// Return a borrowed connection to the pool.
    ///
    /// Safe to call with `None`. An open connection is closed before its
    /// slot is freed. Connections issued before a factory rebuild no longer
    /// have a slot and are dropped.
    pub fn release_connection(&self, connection: Option<Connection>) {
        let Some(mut connection) = connection else {
            debug!("release called without a connection, nothing to do");
            return;
        };
        debug!("releasing connection back to the pool: {}", connection.host());
        if connection.is_open() {
            connection.close();
        }

        let mut inner = self.inner.lock().unwrap();
        if inner.put_back(connection) {
            self.available.notify_one();
        } else {
            warn!("released connection does not belong to the current pool, dropping it");
        }
    }

    /// Replace the configured endpoints and rebuild the whole pool.
    ///
    /// Connections issued before the rebuild keep working for their current
    /// borrower but lose their pool membership; releasing them is a no-op.
    pub fn set_factories(&self, factories: Vec<ConnectionFactory>) {
        let mut inner = self.inner.lock().unwrap();
        inner.factories = factories;
        inner.initialize_pool();
        // Everything is free again after a rebuild.
        self.available.notify_all();
    }

    /// Change the sub-pool size used by the next rebuild.
    pub fn set_connections_per_host(&self, connections_per_host: usize) {
        let mut inner = self.inner.lock().unwrap();
        inner.connections_per_host = connections_per_host;
    }

    /// Number of currently free connections, across all hosts.
    pub fn free_connections(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner
            .pool
            .values()
            .flat_map(|slots| slots.iter())
            .filter(|slot| slot.connection.is_some())
            .count()
    }
}
