pub mod alerts;
pub mod cooldown;
pub mod notifier;
pub mod pipeline;
pub mod targets;
