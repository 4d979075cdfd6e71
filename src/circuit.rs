use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::gate::{Gate, GateKind, PinValues};
use crate::GateId;

/// Errors surfaced by circuit mutation and evaluation.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// A gate with this id is already present.
    #[error("gate {0} already exists")]
    DuplicateGate(GateId),
    /// An operation referenced a gate id not present in the circuit.
    #[error("gate {0} not found")]
    UnknownGate(GateId),
    /// A connection targeted a pin the destination kind does not have.
    #[error("gate {id} ({kind:?}) has no pin {pin}")]
    InvalidPin {
        id: GateId,
        kind: GateKind,
        pin: String,
    },
    /// `set_input_value` was called on a non-input gate.
    #[error("gate {0} is not an input")]
    NotAnInput(GateId),
    /// The gate graph is not acyclic; carries one offending cycle.
    #[error("cycle detected: {}", .0.join(" -> "))]
    CycleDetected(Vec<GateId>),
}

pub type CircuitError = Error;

/// Result of one evaluation: every gate's output, plus the topological
/// order the values were computed in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub values: BTreeMap<GateId, bool>,
    pub order: Vec<GateId>,
}

/// A gate network: an id-keyed gate table plus, per destination gate, the
/// driver of each of its pins. Ordered maps keep iteration and the
/// reported topological order deterministic.
#[derive(Clone, Debug, Default)]
pub struct Circuit {
    gates: BTreeMap<GateId, Gate>,
    // dst -> pin -> src; at most one driver per pin.
    drivers: BTreeMap<GateId, BTreeMap<String, GateId>>,
}

impl Circuit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_gate(&mut self, id: impl Into<GateId>, kind: GateKind) -> Result<(), Error> {
        let id = id.into();
        if self.gates.contains_key(&id) {
            return Err(Error::DuplicateGate(id));
        }
        self.gates.insert(id, Gate::new(kind));
        Ok(())
    }

    /// Removes the gate and every edge referencing it. No-op if absent.
    pub fn remove_gate(&mut self, id: &str) {
        self.gates.remove(id);
        self.drivers.remove(id);
        for pins in self.drivers.values_mut() {
            pins.retain(|_, src| src.as_str() != id);
        }
        self.drivers.retain(|_, pins| !pins.is_empty());
    }

    /// Feeds `src`'s output into pin `pin` of `dst`. Reconnecting an
    /// already driven pin replaces the previous driver.
    pub fn connect(&mut self, src: &str, dst: &str, pin: &str) -> Result<(), Error> {
        if !self.gates.contains_key(src) {
            return Err(Error::UnknownGate(src.to_owned()));
        }
        let kind = self
            .gates
            .get(dst)
            .ok_or_else(|| Error::UnknownGate(dst.to_owned()))?
            .kind();
        if !kind.pins().contains(&pin) {
            return Err(Error::InvalidPin {
                id: dst.to_owned(),
                kind,
                pin: pin.to_owned(),
            });
        }
        self.drivers
            .entry(dst.to_owned())
            .or_default()
            .insert(pin.to_owned(), src.to_owned());
        Ok(())
    }

    /// Removes every edge from `src` into `dst`. No-op if none exist.
    pub fn disconnect(&mut self, src: &str, dst: &str) {
        if let Some(pins) = self.drivers.get_mut(dst) {
            pins.retain(|_, s| s.as_str() != src);
            if pins.is_empty() {
                self.drivers.remove(dst);
            }
        }
    }

    pub fn set_input_value(&mut self, id: &str, value: bool) -> Result<(), Error> {
        let gate = self
            .gates
            .get_mut(id)
            .ok_or_else(|| Error::UnknownGate(id.to_owned()))?;
        if gate.kind() != GateKind::Input {
            return Err(Error::NotAnInput(id.to_owned()));
        }
        gate.set_state(value);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.gates.clear();
        self.drivers.clear();
    }

    pub fn gate(&self, id: &str) -> Option<&Gate> {
        self.gates.get(id)
    }

    pub fn num_gates(&self) -> usize {
        self.gates.len()
    }

    /// Computes every gate's current output without touching any state.
    /// Flip-flops report their latched value; their `d` pins are not
    /// sampled. Fails on a cyclic graph.
    pub fn evaluate(&self) -> Result<Evaluation, Error> {
        trace!(gates = self.gates.len(), "evaluating circuit");
        let order = self.topo_order()?;
        let values = self.eval_pass(&order);
        Ok(Evaluation { values, order })
    }

    /// Evaluates with a clock edge. Every flip-flop samples its `d` pin
    /// from the pre-edge snapshot, then all of them commit together, so
    /// no gate observes another's updated state during capture. The
    /// returned values reflect the committed state.
    pub fn tick(&mut self) -> Result<Evaluation, Error> {
        let order = self.topo_order()?;
        let snapshot = self.eval_pass(&order);
        let staged: Vec<(GateId, bool)> = self
            .gates
            .iter()
            .filter(|(_, gate)| gate.kind() == GateKind::Dff)
            .map(|(id, _)| {
                let next = self
                    .drivers
                    .get(id)
                    .and_then(|pins| pins.get("d"))
                    .and_then(|src| snapshot.get(src).copied())
                    .unwrap_or(false);
                (id.clone(), next)
            })
            .collect();
        debug!(dffs = staged.len(), "clock edge: committing flip-flop state");
        for (id, next) in staged {
            if let Some(gate) = self.gates.get_mut(&id) {
                gate.set_state(next);
            }
        }
        let values = self.eval_pass(&order);
        Ok(Evaluation { values, order })
    }

    /// Kahn's algorithm over the driver edges. Ties between independent
    /// gates resolve lexicographically because the maps are ordered.
    fn topo_order(&self) -> Result<Vec<GateId>, Error> {
        let mut indegree: BTreeMap<&str, usize> =
            self.gates.keys().map(|id| (id.as_str(), 0)).collect();
        let mut children: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (dst, pins) in &self.drivers {
            for src in pins.values() {
                *indegree
                    .get_mut(dst.as_str())
                    .expect("edges only reference gates present in the circuit") += 1;
                children.entry(src.as_str()).or_default().push(dst.as_str());
            }
        }

        let mut ready: VecDeque<&str> = indegree
            .iter()
            .filter(|(_, indeg)| **indeg == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut order: Vec<GateId> = Vec::with_capacity(self.gates.len());
        while let Some(id) = ready.pop_front() {
            order.push(id.to_owned());
            if let Some(dsts) = children.get(id) {
                for &dst in dsts {
                    let indeg = indegree
                        .get_mut(dst)
                        .expect("edges only reference gates present in the circuit");
                    *indeg -= 1;
                    if *indeg == 0 {
                        ready.push_back(dst);
                    }
                }
            }
        }

        if order.len() < self.gates.len() {
            let cycle = self.find_cycle(&indegree);
            debug!(?cycle, "rejecting cyclic circuit");
            return Err(Error::CycleDetected(cycle));
        }
        Ok(order)
    }

    // Walks driver edges backwards among the gates Kahn could not order.
    // Each of those still has an unresolved driver that is itself
    // unordered, so the walk must revisit a gate and close a cycle.
    fn find_cycle(&self, indegree: &BTreeMap<&str, usize>) -> Vec<GateId> {
        let remaining: BTreeSet<&str> = indegree
            .iter()
            .filter(|(_, indeg)| **indeg > 0)
            .map(|(id, _)| *id)
            .collect();
        let mut seen: Vec<&str> = Vec::new();
        let mut cur = *remaining
            .iter()
            .next()
            .expect("an incomplete ordering leaves at least one gate");
        loop {
            if let Some(pos) = seen.iter().position(|id| *id == cur) {
                let mut cycle: Vec<GateId> = seen[pos..].iter().map(|id| (*id).to_owned()).collect();
                // `seen` follows edges backwards; flip to edge direction.
                cycle.reverse();
                return cycle;
            }
            seen.push(cur);
            cur = self
                .drivers
                .get(cur)
                .and_then(|pins| {
                    pins.values()
                        .map(|src| src.as_str())
                        .find(|src| remaining.contains(src))
                })
                .expect("an unordered gate always has an unordered driver");
        }
    }

    /// One value pass in topological order. Each gate sees the already
    /// computed outputs of its drivers, keyed by destination pin.
    fn eval_pass(&self, order: &[GateId]) -> BTreeMap<GateId, bool> {
        let mut values: BTreeMap<GateId, bool> = BTreeMap::new();
        for id in order {
            let gate = &self.gates[id];
            let mut pins = PinValues::new();
            if let Some(drv) = self.drivers.get(id) {
                for (pin, src) in drv {
                    pins.insert(pin.as_str(), values.get(src).copied().unwrap_or(false));
                }
            }
            values.insert(id.clone(), gate.eval(&pins));
        }
        values
    }
}
