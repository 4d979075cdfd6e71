use crate::circuit::Circuit;
use crate::gate::GateKind;
use crate::GateId;

/// Builds circuits programmatically, generating gate ids on the fly
/// (`in0`, `and3`, ...). Each constructor wires its sources as it goes,
/// so a built circuit is always acyclic.
///
/// Source arguments must name gates already added through this builder;
/// the constructors panic otherwise.
#[derive(Debug, Default)]
pub struct CircuitBuilder {
    circuit: Circuit,
    next_id: u64,
}

macro_rules! gate_fn_gen {
    ( $gate_lowercase:ident, $gate_uppercase:ident ) => {
        pub fn $gate_lowercase(&mut self, a: &str, b: &str) -> GateId {
            self.binary(GateKind::$gate_uppercase, stringify!($gate_lowercase), a, b)
        }
    };
}

impl CircuitBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn create_gate(&mut self, prefix: &str, kind: GateKind) -> GateId {
        let id = format!("{prefix}{}", self.next_id);
        self.next_id += 1;
        self.circuit
            .add_gate(id.clone(), kind)
            .expect("generated ids never collide");
        id
    }

    fn binary(&mut self, kind: GateKind, prefix: &str, a: &str, b: &str) -> GateId {
        let id = self.create_gate(prefix, kind);
        self.circuit
            .connect(a, &id, "a")
            .expect("source gate exists in this builder");
        self.circuit
            .connect(b, &id, "b")
            .expect("source gate exists in this builder");
        id
    }

    gate_fn_gen!(or, Or);
    gate_fn_gen!(nor, Nor);
    gate_fn_gen!(and, And);
    gate_fn_gen!(nand, Nand);
    gate_fn_gen!(xor, Xor);

    pub fn input(&mut self, value: bool) -> GateId {
        let id = self.create_gate("in", GateKind::Input);
        self.circuit
            .set_input_value(&id, value)
            .expect("freshly created input gate");
        id
    }

    pub fn not(&mut self, a: &str) -> GateId {
        let id = self.create_gate("not", GateKind::Not);
        self.circuit
            .connect(a, &id, "a")
            .expect("source gate exists in this builder");
        id
    }

    pub fn dff(&mut self, d: &str) -> GateId {
        let id = self.create_gate("dff", GateKind::Dff);
        self.circuit
            .connect(d, &id, "d")
            .expect("source gate exists in this builder");
        id
    }

    pub fn output(&mut self, src: &str) -> GateId {
        let id = self.create_gate("out", GateKind::Output);
        self.circuit
            .connect(src, &id, "a")
            .expect("source gate exists in this builder");
        id
    }

    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    pub fn circuit_mut(&mut self) -> &mut Circuit {
        &mut self.circuit
    }

    pub fn finish(self) -> Circuit {
        self.circuit
    }
}
