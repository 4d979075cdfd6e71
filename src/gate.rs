use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Pin-name to value mapping handed to [`Gate::eval`]. Undriven pins are
/// simply absent and read as false.
pub type PinValues<'a> = HashMap<&'a str, bool>;

/// The kind of a gate. It fixes the gate's input pins and truth function
/// and never changes after construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateKind {
    Input,
    Output,
    And,
    Or,
    Nand,
    Nor,
    Xor,
    Not,
    Dff,
}

impl GateKind {
    /// Input pin names, derived solely from the kind.
    pub fn pins(self) -> &'static [&'static str] {
        match self {
            GateKind::Input => &[],
            GateKind::Output | GateKind::Not => &["a"],
            GateKind::And | GateKind::Or | GateKind::Nand | GateKind::Nor | GateKind::Xor => {
                &["a", "b"]
            }
            GateKind::Dff => &["d"],
        }
    }
}

/// A single gate: a kind plus one bit of stored state. The state is the
/// externally driven value of an `Input` and the latched value of a
/// `Dff`; for every other kind it stays false and is never read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Gate {
    kind: GateKind,
    state: bool,
}

impl Gate {
    pub fn new(kind: GateKind) -> Self {
        Self { kind, state: false }
    }

    pub fn kind(&self) -> GateKind {
        self.kind
    }

    pub fn state(&self) -> bool {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: bool) {
        self.state = state;
    }

    /// Combinational output for the given pin values. A `Dff` reports its
    /// latched state here; its `d` pin is only sampled on a clock edge.
    pub fn eval(&self, pins: &PinValues) -> bool {
        let a = pins.get("a").copied().unwrap_or(false);
        let b = pins.get("b").copied().unwrap_or(false);
        match self.kind {
            GateKind::Input => self.state,
            GateKind::Output => a,
            GateKind::And => a && b,
            GateKind::Or => a || b,
            GateKind::Nand => !(a && b),
            GateKind::Nor => !(a || b),
            GateKind::Xor => a ^ b,
            GateKind::Not => !a,
            GateKind::Dff => self.state,
        }
    }
}
