use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::config::Config;
use crate::services::MasteryService;

/// Limits applied to list endpoints
#[derive(Debug, Clone, Copy)]
pub struct ListLimits {
    pub default: usize,
    pub max: usize,
}

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    mastery: Arc<MasteryService>,
    limits: ListLimits,
}

impl AppState {
    pub fn new(mastery: MasteryService, config: &Config) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            mastery: Arc::new(mastery),
            limits: ListLimits {
                default: config.due_limit_default,
                max: config.due_limit_max,
            },
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn mastery(&self) -> Arc<MasteryService> {
        Arc::clone(&self.mastery)
    }

    pub fn limits(&self) -> ListLimits {
        self.limits
    }
}
