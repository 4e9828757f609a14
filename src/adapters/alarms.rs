//! In-memory alarm registry.
//!
//! The production registry lives in another service; this implementation
//! backs the CLI and tests with a fixed set of alarms.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::AlarmRegistry;
use crate::core::{Error, Result};
use crate::domain::AlarmContext;

/// Alarm registry over a fixed in-memory map
#[derive(Default)]
pub struct StaticAlarmRegistry {
    alarms: RwLock<HashMap<(i64, i64), AlarmContext>>,
}

impl StaticAlarmRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an alarm for a user
    pub fn insert(&self, user_id: i64, alarm_id: i64, context: AlarmContext) {
        let mut alarms = self.alarms.write().expect("registry lock poisoned");
        alarms.insert((user_id, alarm_id), context);
    }
}

#[async_trait]
impl AlarmRegistry for StaticAlarmRegistry {
    async fn get_alarm(&self, user_id: i64, alarm_id: i64) -> Result<AlarmContext> {
        let alarms = self.alarms.read().expect("registry lock poisoned");
        alarms
            .get(&(user_id, alarm_id))
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("no alarm {} for user {}", alarm_id, user_id)))
    }
}
