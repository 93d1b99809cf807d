/// On/off analysis and suggestions.
pub mod analysis;
pub mod engine;
/// Ordered device registry.
pub mod registry;
pub mod rules;
/// Periodic, cancellable tick loop.
pub mod scheduler;

pub use analysis::{AnalysisReport, Suggestion, analyze};
pub use engine::AutomationEngine;
pub use registry::DeviceRegistry;
pub use rules::AutomationRules;
pub use scheduler::{SharedEngine, Simulator};
