pub mod cooldown;
pub mod schedule;
pub mod threshold;
