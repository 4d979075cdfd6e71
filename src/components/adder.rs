use std::array;

use crate::circuit_builder::CircuitBuilder;
use crate::GateId;

use super::bus::Bus;

pub struct Adder {
    pub sum: GateId,
    pub cout: GateId,
}

/// One-bit full adder out of two-input gates.
pub fn full_adder(builder: &mut CircuitBuilder, a: &str, b: &str, cin: &str) -> Adder {
    let a_xor_b = builder.xor(a, b);
    let sum = builder.xor(&a_xor_b, cin);
    let a_and_b = builder.and(a, b);
    let a_and_cin = builder.and(a, cin);
    let b_and_cin = builder.and(b, cin);
    let partial = builder.or(&a_and_b, &a_and_cin);
    let cout = builder.or(&partial, &b_and_cin);
    Adder { sum, cout }
}

pub struct RippleCarryAdder<const BITS: usize> {
    pub input_a: Bus<BITS>,
    pub input_b: Bus<BITS>,
    pub cin: GateId,
    pub cout: GateId,
    pub sum: Bus<BITS>,
}

impl<const BITS: usize> RippleCarryAdder<BITS> {
    pub fn new(builder: &mut CircuitBuilder) -> Self {
        assert!(BITS > 0);

        let input_a = Bus::new(array::from_fn(|_| builder.input(false)));
        let input_b = Bus::new(array::from_fn(|_| builder.input(false)));
        let cin = builder.input(false);

        let mut carry = cin.clone();
        let sum = Bus::new(array::from_fn(|i| {
            let Adder { sum, cout } =
                full_adder(builder, &input_a.ids()[i], &input_b.ids()[i], &carry);
            carry = cout;
            sum
        }));

        Self {
            input_a,
            input_b,
            cin,
            cout: carry,
            sum,
        }
    }
}
