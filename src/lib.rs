pub mod circuit_builder;
pub mod components;
pub mod netlist;

mod circuit;
mod gate;

pub use circuit::{Circuit, CircuitError, Evaluation};
pub use gate::{Gate, GateKind, PinValues};

/// Caller-assigned gate identifier, unique within a circuit.
pub type GateId = String;
