//! Connection registry
//!
//! Owns one connection per node plus an advisory key-to-node affinity
//! cache. The default node is connected eagerly at startup; nodes
//! discovered through redirects are connected lazily and reused.

use crate::driver::{Driver, DriverError, NodeId};
use std::collections::HashMap;

pub struct ClientRegistry<D: Driver> {
    driver: D,
    default_node: NodeId,
    clusters: HashMap<NodeId, D::Conn>,
    key_locations: HashMap<String, NodeId>,
}

impl<D: Driver> ClientRegistry<D> {
    /// Connect to the default node and build the registry around it.
    pub async fn connect(driver: D, default_node: NodeId) -> Result<Self, DriverError> {
        let conn = driver.connect(&default_node).await?;
        let mut clusters = HashMap::new();
        clusters.insert(default_node.clone(), conn);
        Ok(Self {
            driver,
            default_node,
            clusters,
            key_locations: HashMap::new(),
        })
    }

    pub fn default_node(&self) -> &NodeId {
        &self.default_node
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Number of live connections.
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Pick the node a command should run on and make sure it is
    /// connected.
    ///
    /// An explicit `node` wins; it is connected on first use and, when a
    /// key is present, recorded as that key's location. Without an
    /// explicit node the key cache is consulted, falling back to the
    /// default node.
    pub async fn resolve(
        &mut self,
        key: Option<&str>,
        node: Option<&NodeId>,
    ) -> Result<NodeId, DriverError> {
        if let Some(node) = node {
            if !self.clusters.contains_key(node) {
                let conn = self.driver.connect(node).await?;
                self.clusters.insert(node.clone(), conn);
            }
            if let Some(key) = key {
                self.key_locations.insert(key.to_string(), node.clone());
            }
            return Ok(node.clone());
        }

        if let Some(key) = key {
            if let Some(cached) = self.key_locations.get(key) {
                if self.clusters.contains_key(cached) {
                    return Ok(cached.clone());
                }
            }
        }

        Ok(self.default_node.clone())
    }

    /// Borrow the connection for `node`, if one is open.
    pub fn connection(&mut self, node: &NodeId) -> Option<&mut D::Conn> {
        self.clusters.get_mut(node)
    }

    /// Borrow the driver and one node's connection together.
    pub fn driver_and_connection(&mut self, node: &NodeId) -> Option<(&D, &mut D::Conn)> {
        let driver = &self.driver;
        self.clusters.get_mut(node).map(|conn| (driver, conn))
    }

    /// Close every connection. Safe to call more than once.
    pub async fn shutdown_all(&mut self) {
        let drained: Vec<_> = self.clusters.drain().collect();
        for (_, conn) in drained {
            self.driver.close(conn).await;
        }
        self.key_locations.clear();
    }
}
