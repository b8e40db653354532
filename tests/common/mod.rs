//! Integration test common infrastructure.
//!
//! In-memory stand-ins for the transport, directory and registry, plus a
//! helper wiring them into a [`Bouncer`].

pub mod fakes;

#[allow(unused_imports)]
pub use fakes::{Failure, FakeDirectory, FakeRegistry, FakeTransport, TransportCall};

use officer_bouncer::Bouncer;
use officer_bouncer::config::BouncerConfig;
use std::sync::Arc;

/// Chat used by most scenarios.
#[allow(dead_code)]
pub const CHAT: i64 = 100;

/// Fakes plus the bouncer wired to them.
#[allow(dead_code)]
pub struct Harness {
    pub transport: Arc<FakeTransport>,
    pub directory: Arc<FakeDirectory>,
    pub registry: Arc<FakeRegistry>,
    pub bouncer: Arc<Bouncer>,
}

impl Harness {
    /// Default timings: 5 s grace period, 60 s direct-join ban.
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self::with_config(BouncerConfig::default())
    }

    #[allow(dead_code)]
    pub fn with_config(config: BouncerConfig) -> Self {
        let transport = Arc::new(FakeTransport::default());
        let directory = Arc::new(FakeDirectory::default());
        let registry = Arc::new(FakeRegistry::default());
        let bouncer = Arc::new(Bouncer::new(
            transport.clone(),
            directory.clone(),
            registry.clone(),
            config,
        ));
        Self {
            transport,
            directory,
            registry,
            bouncer,
        }
    }
}
