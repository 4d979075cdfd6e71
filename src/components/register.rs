use std::array;
use std::ops::{BitAnd, Shl};

use num_traits::Unsigned;

use crate::circuit::{Circuit, CircuitError, Evaluation};
use crate::circuit_builder::CircuitBuilder;

use super::bus::Bus;

/// A BITS-wide register: one flip-flop per bit behind an input driver.
/// Writes land on the next clock edge, all bits together.
pub struct Register<const BITS: usize> {
    pub input: Bus<BITS>,
    pub q: Bus<BITS>,
}

impl<const BITS: usize> Register<BITS> {
    pub fn new(builder: &mut CircuitBuilder) -> Self {
        let input = Bus::new(array::from_fn(|_| builder.input(false)));
        let q = Bus::new(array::from_fn(|i| builder.dff(&input.ids()[i])));
        Self { input, q }
    }

    /// Drives the input bus and clocks the value in.
    pub fn load<T>(&self, circuit: &mut Circuit, val: T) -> Result<Evaluation, CircuitError>
    where
        T: Unsigned + Copy + BitAnd<T, Output = T> + Shl<usize, Output = T>,
    {
        self.input.set(circuit, val)?;
        circuit.tick()
    }

    pub fn read<T>(&self, circuit: &Circuit) -> Result<T, CircuitError>
    where
        T: Unsigned + Shl<usize, Output = T>,
    {
        let eval = circuit.evaluate()?;
        Ok(self.q.read(&eval))
    }
}

#[cfg(test)]
mod test {
    use super::Register;
    use crate::circuit_builder::CircuitBuilder;

    #[test]
    fn register_test() {
        let mut builder = CircuitBuilder::new();
        let reg = Register::<8>::new(&mut builder);
        let mut circuit = builder.finish();

        assert_eq!(reg.read::<u8>(&circuit).unwrap(), 0);

        reg.load(&mut circuit, 5u8).unwrap();
        assert_eq!(reg.read::<u8>(&circuit).unwrap(), 5);

        // A pending input does not reach q without an edge.
        reg.input.set(&mut circuit, 99u8).unwrap();
        assert_eq!(reg.read::<u8>(&circuit).unwrap(), 5);
        circuit.tick().unwrap();
        assert_eq!(reg.read::<u8>(&circuit).unwrap(), 99);
    }

    #[test]
    fn load_reports_the_committed_value() {
        let mut builder = CircuitBuilder::new();
        let reg = Register::<4>::new(&mut builder);
        let mut circuit = builder.finish();

        let eval = reg.load(&mut circuit, 0b1011u8).unwrap();
        assert_eq!(reg.q.read::<u8>(&eval), 0b1011);
    }
}
