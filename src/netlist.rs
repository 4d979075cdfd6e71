//! Description layer between the engine and a hosting application: a
//! serde shape for the raw gate/edge graph, and the evaluation
//! request/response the host exchanges with the engine. Snapshots are an
//! opaque pass-through of this description; the engine's internal state
//! never leaves the process.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::circuit::{Circuit, CircuitError, Evaluation};
use crate::gate::GateKind;
use crate::GateId;

fn default_pin() -> String {
    "a".to_owned()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateDesc {
    pub id: GateId,
    pub kind: GateKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDesc {
    pub src: GateId,
    pub dst: GateId,
    /// Destination pin; callers that omit it get pin `a`.
    #[serde(default = "default_pin")]
    pub pin: String,
}

/// Raw description of a circuit as the hosting layer sees it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Netlist {
    #[serde(default)]
    pub gates: Vec<GateDesc>,
    #[serde(default)]
    pub edges: Vec<EdgeDesc>,
}

impl Netlist {
    /// Populates a fresh [`Circuit`] through the normal mutation
    /// operations, so malformed references surface as engine errors.
    pub fn build(&self) -> Result<Circuit, CircuitError> {
        let mut circuit = Circuit::new();
        for gate in &self.gates {
            circuit.add_gate(gate.id.clone(), gate.kind)?;
        }
        for edge in &self.edges {
            circuit.connect(&edge.src, &edge.dst, &edge.pin)?;
        }
        Ok(circuit)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// One evaluation round: optional input overrides, plus whether a clock
/// edge occurs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalRequest {
    #[serde(default)]
    pub inputs: BTreeMap<GateId, bool>,
    #[serde(default)]
    pub clock: bool,
}

impl EvalRequest {
    /// Applies the input overrides and evaluates. An override naming an
    /// unknown gate or a non-input gate means "no such input to set" and
    /// is skipped rather than rejected.
    pub fn run(&self, circuit: &mut Circuit) -> Result<Evaluation, CircuitError> {
        for (id, value) in &self.inputs {
            match circuit.set_input_value(id, *value) {
                Ok(()) => {}
                Err(CircuitError::UnknownGate(_)) | Err(CircuitError::NotAnInput(_)) => {}
                Err(err) => return Err(err),
            }
        }
        if self.clock {
            circuit.tick()
        } else {
            circuit.evaluate()
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const AND_NETLIST: &str = r#"{
        "gates": [
            {"id": "in1", "kind": "INPUT"},
            {"id": "in2", "kind": "INPUT"},
            {"id": "gand", "kind": "AND"},
            {"id": "out", "kind": "OUTPUT"}
        ],
        "edges": [
            {"src": "in1", "dst": "gand", "pin": "a"},
            {"src": "in2", "dst": "gand", "pin": "b"},
            {"src": "gand", "dst": "out"}
        ]
    }"#;

    #[test]
    fn parse_defaults_missing_pin_to_a() {
        let netlist = Netlist::from_json(AND_NETLIST).unwrap();
        assert_eq!(netlist.edges[2].pin, "a");
    }

    #[test]
    fn unknown_kind_fails_at_parse_time() {
        let json = r#"{"gates": [{"id": "g", "kind": "FLUX"}], "edges": []}"#;
        assert!(Netlist::from_json(json).is_err());
    }

    #[test]
    fn build_surfaces_engine_errors() {
        let json = r#"{
            "gates": [{"id": "g", "kind": "NOT"}],
            "edges": [{"src": "ghost", "dst": "g"}]
        }"#;
        let netlist = Netlist::from_json(json).unwrap();
        assert!(matches!(
            netlist.build(),
            Err(CircuitError::UnknownGate(id)) if id == "ghost"
        ));
    }

    #[test]
    fn request_applies_overrides_and_ignores_bad_targets() {
        let mut circuit = Netlist::from_json(AND_NETLIST).unwrap().build().unwrap();
        let request = EvalRequest {
            inputs: BTreeMap::from([
                ("in1".to_owned(), true),
                ("in2".to_owned(), true),
                ("gand".to_owned(), true),
                ("nobody".to_owned(), true),
            ]),
            clock: false,
        };
        let eval = request.run(&mut circuit).unwrap();
        assert_eq!(eval.values["gand"], true);
        assert_eq!(eval.values["out"], true);
        assert_eq!(eval.order.len(), 4);
    }

    #[test]
    fn clock_flag_routes_to_a_tick() {
        let json = r#"{
            "gates": [
                {"id": "din", "kind": "INPUT"},
                {"id": "ff", "kind": "DFF"}
            ],
            "edges": [{"src": "din", "dst": "ff", "pin": "d"}]
        }"#;
        let mut circuit = Netlist::from_json(json).unwrap().build().unwrap();
        let inputs = BTreeMap::from([("din".to_owned(), true)]);

        let plain = EvalRequest {
            inputs: inputs.clone(),
            clock: false,
        };
        assert_eq!(plain.run(&mut circuit).unwrap().values["ff"], false);

        let edge = EvalRequest {
            inputs,
            clock: true,
        };
        assert_eq!(edge.run(&mut circuit).unwrap().values["ff"], true);
    }

    #[test]
    fn snapshot_round_trip_is_verbatim() {
        let netlist = Netlist::from_json(AND_NETLIST).unwrap();
        let reloaded = Netlist::from_json(&netlist.to_json().unwrap()).unwrap();
        assert_eq!(netlist, reloaded);
    }
}
