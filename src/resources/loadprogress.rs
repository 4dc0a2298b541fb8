//! Load batch bookkeeping.
//!
//! [`LoadProgress`] is the explicit pending counter of the registry: how many
//! slots exist, how many loaded and how many failed. [`LoadBridge`] owns both
//! ends of the completion channel, like the audio bridge owns its channels.

use bevy_ecs::prelude::Resource;
use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::loader::{LoadCompletion, LoadSender};
use crate::resources::assetcatalog::SlotId;

/// What a failed slot means for the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// A failed slot keeps the batch open forever.
    #[default]
    Block,
    /// A failed slot is terminal and counts toward settling the batch.
    Settle,
}

impl FailurePolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "block" => Some(FailurePolicy::Block),
            "settle" => Some(FailurePolicy::Settle),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FailurePolicy::Block => "block",
            FailurePolicy::Settle => "settle",
        }
    }
}

/// A slot the loader could not satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub slot: SlotId,
    pub name: String,
    pub reason: String,
}

/// Snapshot handed to the completion callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub total: usize,
    pub loaded: usize,
    pub failures: Vec<LoadFailure>,
}

#[derive(Resource, Debug, Default, Clone)]
pub struct LoadProgress {
    pub total: usize,
    pub loaded: usize,
    pub failures: Vec<LoadFailure>,
    pub policy: FailurePolicy,
}

impl LoadProgress {
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// True once every slot is done according to the failure policy.
    pub fn all_loaded(&self) -> bool {
        match self.policy {
            FailurePolicy::Block => self.loaded == self.total,
            FailurePolicy::Settle => self.loaded + self.failed() == self.total,
        }
    }

    pub fn summary(&self) -> LoadSummary {
        LoadSummary {
            total: self.total,
            loaded: self.loaded,
            failures: self.failures.clone(),
        }
    }
}

/// Both ends of the load completion channel.
#[derive(Resource)]
pub struct LoadBridge {
    tx: Sender<LoadCompletion>,
    pub rx: Receiver<LoadCompletion>,
}

impl Default for LoadBridge {
    fn default() -> Self {
        let (tx, rx) = unbounded::<LoadCompletion>();
        Self { tx, rx }
    }
}

impl LoadBridge {
    pub fn sender(&self) -> LoadSender {
        LoadSender::new(self.tx.clone())
    }
}
