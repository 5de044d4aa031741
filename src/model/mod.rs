pub use verdant_core::{Simulation, SimulationContext, TickReport, UnregisterHandle};
pub mod catalog {
    pub use verdant_core::catalog::*;
}
pub mod config {
    pub use verdant_core::config::*;
}
pub mod context {
    pub use verdant_core::context::*;
}
pub mod genetics {
    pub use verdant_core::genetics::*;
}
pub mod growth {
    pub use verdant_core::growth::*;
}
pub mod lifecycle {
    pub use verdant_core::lifecycle::*;
}
pub mod milestones {
    pub use verdant_core::milestones::*;
}
pub mod scheduler {
    pub use verdant_core::scheduler::*;
}
pub mod simulation {
    pub use verdant_core::simulation::*;
}
pub mod stress {
    pub use verdant_core::stress::*;
}
pub mod visual {
    pub use verdant_core::visual::*;
}

pub mod climate;

pub mod data {
    pub use verdant_data::*;
}
