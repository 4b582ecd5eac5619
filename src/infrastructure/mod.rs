pub mod logging;
pub mod notifier;
