mod script;
mod tick;

pub use script::{InputAction, InputScript, ScriptedInput};
pub use tick::{FixedTimestep, SimulationLoop, SimulationState, TickSample};
