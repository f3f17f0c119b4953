//! One shared executor per distinct configuration.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use log::debug;

use super::client::HttpClient;
use crate::config::HttpClientConfiguration;

/// Hands out a shared [`HttpClient`] for each distinct configuration.
///
/// Owned by the application's composition root and passed to whoever needs
/// a client. Instances are created on first request and kept for the life of
/// the factory.
#[derive(Debug, Default)]
pub struct HttpClientFactory {
    instances: Mutex<HashMap<HttpClientConfiguration, Arc<HttpClient>>>,
}

impl HttpClientFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_instance(&self, conf: &HttpClientConfiguration) -> Arc<HttpClient> {
        // Executors are stateless, so a poisoned map is still usable.
        let mut instances = self.instances.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(instances.entry(conf.clone()).or_insert_with(|| {
            debug!("Creating HTTP client for {:?}", conf);
            Arc::new(HttpClient::new(conf.clone()))
        }))
    }

    /// Number of distinct configurations seen so far.
    pub fn len(&self) -> usize {
        self.instances
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
