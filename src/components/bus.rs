use std::ops::{BitAnd, Shl};

use num_traits::Unsigned;

use crate::circuit::{Circuit, CircuitError, Evaluation};
use crate::GateId;

/// A bundle of gate ids treated as one little-endian unsigned value.
#[derive(Clone, Debug)]
pub struct Bus<const BITS: usize>([GateId; BITS]);

impl<const BITS: usize> Bus<BITS> {
    pub fn new(ids: [GateId; BITS]) -> Self {
        Bus(ids)
    }

    pub fn ids(&self) -> &[GateId; BITS] {
        &self.0
    }

    /// Decodes the bus value out of an evaluation result.
    pub fn read<T>(&self, eval: &Evaluation) -> T
    where
        T: Unsigned + Shl<usize, Output = T>,
    {
        let mut sum = T::zero();
        for (bit, id) in self.0.iter().enumerate() {
            if eval.values.get(id).copied().unwrap_or(false) {
                sum = sum + (T::one() << bit);
            }
        }
        sum
    }

    /// Drives the bus bit by bit; every id must name an input gate.
    pub fn set<T>(&self, circuit: &mut Circuit, val: T) -> Result<(), CircuitError>
    where
        T: Unsigned + Copy + BitAnd<T, Output = T> + Shl<usize, Output = T>,
    {
        for (bit, id) in self.0.iter().enumerate() {
            let bit_val = !(val & (T::one() << bit)).is_zero();
            circuit.set_input_value(id, bit_val)?;
        }
        Ok(())
    }
}
