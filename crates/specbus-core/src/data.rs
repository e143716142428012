//! Typed result containers produced by exchanges.

use serde::{Deserialize, Serialize};

/// Physical unit attached to a [`Data`] result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitDescriptor {
    /// Raw detector counts
    Counts,
    /// Wavelength in nanometers
    Nanometers,
    /// Time in microseconds
    Microseconds,
    /// Temperature in degrees Celsius
    Celsius,
    /// Uninterpreted bytes
    Bytes,
    /// Dimensionless value
    Unitless,
}

/// A typed vector that exclusively owns its values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataVector<T> {
    values: Vec<T>,
    units: Option<UnitDescriptor>,
}

impl<T> DataVector<T> {
    pub fn new(values: Vec<T>) -> Self {
        Self {
            values,
            units: None,
        }
    }

    pub fn with_units(mut self, units: UnitDescriptor) -> Self {
        self.units = Some(units);
        self
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }

    pub fn into_values(self) -> Vec<T> {
        self.values
    }

    pub fn units(&self) -> Option<UnitDescriptor> {
        self.units
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Result of a transfer. Every variant is one-dimensional.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    Byte(DataVector<u8>),
    UShort(DataVector<u16>),
    U32(DataVector<u32>),
    Float(DataVector<f32>),
    Double(DataVector<f64>),
}

impl Data {
    pub fn bytes(values: Vec<u8>) -> Self {
        Data::Byte(DataVector::new(values).with_units(UnitDescriptor::Bytes))
    }

    pub fn ushorts(values: Vec<u16>) -> Self {
        Data::UShort(DataVector::new(values))
    }

    pub fn u32s(values: Vec<u32>) -> Self {
        Data::U32(DataVector::new(values))
    }

    pub fn floats(values: Vec<f32>) -> Self {
        Data::Float(DataVector::new(values))
    }

    pub fn doubles(values: Vec<f64>) -> Self {
        Data::Double(DataVector::new(values))
    }

    /// Number of independent axes: 0 for a scalar, 1 for a vector.
    pub fn dimensionality(&self) -> usize {
        1
    }

    pub fn units(&self) -> Option<UnitDescriptor> {
        match self {
            Data::Byte(v) => v.units(),
            Data::UShort(v) => v.units(),
            Data::U32(v) => v.units(),
            Data::Float(v) => v.units(),
            Data::Double(v) => v.units(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Data::Byte(v) => v.len(),
            Data::UShort(v) => v.len(),
            Data::U32(v) => v.len(),
            Data::Float(v) => v.len(),
            Data::Double(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Data::Byte(_) => "byte",
            Data::UShort(_) => "ushort",
            Data::U32(_) => "u32",
            Data::Float(_) => "float",
            Data::Double(_) => "double",
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Data::Byte(v) => Some(v.values()),
            _ => None,
        }
    }

    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Data::Byte(v) => Some(v.into_values()),
            _ => None,
        }
    }

    /// Widen any variant to `f64`.
    pub fn to_doubles(&self) -> Vec<f64> {
        match self {
            Data::Byte(v) => v.values().iter().map(|&x| f64::from(x)).collect(),
            Data::UShort(v) => v.values().iter().map(|&x| f64::from(x)).collect(),
            Data::U32(v) => v.values().iter().map(|&x| f64::from(x)).collect(),
            Data::Float(v) => v.values().iter().map(|&x| f64::from(x)).collect(),
            Data::Double(v) => v.values().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_vector_units() {
        let data = Data::bytes(vec![1, 2, 3]);
        assert_eq!(data.dimensionality(), 1);
        assert_eq!(data.units(), Some(UnitDescriptor::Bytes));
        assert_eq!(data.as_bytes(), Some(&[1u8, 2, 3][..]));
        assert_eq!(data.kind(), "byte");
    }

    #[test]
    fn test_to_doubles_widens() {
        let data = Data::ushorts(vec![0, 65535]);
        assert_eq!(data.to_doubles(), vec![0.0, 65535.0]);
        assert!(data.as_bytes().is_none());
    }

    #[test]
    fn test_with_units() {
        let vector = DataVector::new(vec![500.0_f64, 501.0]).with_units(UnitDescriptor::Nanometers);
        let data = Data::Double(vector);
        assert_eq!(data.units(), Some(UnitDescriptor::Nanometers));
        assert_eq!(data.len(), 2);
    }
}
