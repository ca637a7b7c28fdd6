//! Runtime value representation
//!
//! Shared value vocabulary between the execution backends and the debugger:
//! - Arrays: reference-counted buffers (`Arc<Vec<f64>>`), cheap to clone,
//!   tagged with a dtype and a placement (device-resident or host snapshot)
//! - Strings: heap-allocated, reference-counted, immutable
//! - Tuples: the rendering of a multi-expression `p a, b` command
//!
//! The placement tag is what the transcripts make visible: eager execution
//! hands the debugger device-resident buffers (`DeviceArray(...)`), compiled
//! execution hands it host copies (`array(...)`).

use std::fmt;
use std::sync::Arc;

use crate::error::ExecError;

/// Element type of an [`Array`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    Float32,
    Int32,
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DType::Float32 => write!(f, "float32"),
            DType::Int32 => write!(f, "int32"),
        }
    }
}

/// Where an array's buffer lives.
///
/// `Device` buffers belong to the simulated accelerator runtime; `Host`
/// buffers are snapshots produced when a staged computation calls back into
/// the host (which is how every compiled-mode debugger session sees values).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Device,
    Host,
}

/// A rank-0 or rank-1 numeric array.
///
/// Storage is `f64` regardless of dtype; the dtype tag controls rendering
/// and promotion. Rank is at most 1; the backends only ever map over one
/// leading axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    data: Arc<Vec<f64>>,
    rank: usize,
    dtype: DType,
    placement: Placement,
}

impl Array {
    /// Rank-0 float32 host scalar.
    pub fn scalar_f32(v: f64) -> Self {
        Self {
            data: Arc::new(vec![v]),
            rank: 0,
            dtype: DType::Float32,
            placement: Placement::Host,
        }
    }

    /// Rank-0 int32 host scalar.
    pub fn scalar_i32(v: i64) -> Self {
        Self {
            data: Arc::new(vec![v as f64]),
            rank: 0,
            dtype: DType::Int32,
            placement: Placement::Host,
        }
    }

    /// Rank-1 host vector.
    pub fn vector(data: Vec<f64>, dtype: DType) -> Self {
        Self {
            data: Arc::new(data),
            rank: 1,
            dtype,
            placement: Placement::Host,
        }
    }

    /// `[0, 1, .., n-1]` as a rank-1 host vector.
    pub fn arange(n: usize, dtype: DType) -> Self {
        Self::vector((0..n).map(|i| i as f64).collect(), dtype)
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Number of elements (1 for scalars).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Same buffer, device placement. Refcount bump only.
    pub fn to_device(&self) -> Self {
        Self {
            placement: Placement::Device,
            ..self.clone()
        }
    }

    /// Host snapshot of this buffer. Refcount bump only.
    pub fn to_host(&self) -> Self {
        Self {
            placement: Placement::Host,
            ..self.clone()
        }
    }

    /// Split a rank-1 array into its rank-0 lanes, preserving placement.
    pub fn lanes(&self) -> Result<Vec<Array>, ExecError> {
        if self.rank == 0 {
            return Err(ExecError::NotBatchable);
        }
        Ok(self
            .data
            .iter()
            .map(|&v| Array {
                data: Arc::new(vec![v]),
                rank: 0,
                dtype: self.dtype,
                placement: self.placement,
            })
            .collect())
    }

    /// Stack rank-0 lane results back into a rank-1 array.
    pub fn stack(lanes: &[Array]) -> Self {
        let dtype = lanes.first().map(|a| a.dtype).unwrap_or(DType::Float32);
        let placement = lanes
            .first()
            .map(|a| a.placement)
            .unwrap_or(Placement::Host);
        Self {
            data: Arc::new(lanes.iter().map(|a| a.data[0]).collect()),
            rank: 1,
            dtype,
            placement,
        }
    }

    fn map(&self, f: impl Fn(f64) -> f64, dtype: DType) -> Self {
        Self {
            data: Arc::new(self.data.iter().map(|&v| f(v)).collect()),
            rank: self.rank,
            dtype,
            placement: self.placement,
        }
    }

    /// Elementwise sine. Always promotes to float32.
    pub fn sin(&self) -> Self {
        self.map(|v| (v as f32).sin() as f64, DType::Float32)
    }

    /// Elementwise exponential. Always promotes to float32.
    pub fn exp(&self) -> Self {
        self.map(|v| (v as f32).exp() as f64, DType::Float32)
    }

    fn zip_with(
        &self,
        other: &Array,
        dtype: DType,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<Self, ExecError> {
        if self.data.len() != other.data.len() {
            return Err(ExecError::ShapeMismatch {
                left: self.data.len(),
                right: other.data.len(),
            });
        }
        Ok(Self {
            data: Arc::new(
                self.data
                    .iter()
                    .zip(other.data.iter())
                    .map(|(&a, &b)| f(a, b))
                    .collect(),
            ),
            rank: self.rank.max(other.rank),
            dtype,
            placement: self.placement,
        })
    }

    /// Elementwise addition against another array of the same extent.
    pub fn add(&self, other: &Array) -> Result<Self, ExecError> {
        self.zip_with(other, promote(self.dtype, other.dtype), |a, b| a + b)
    }

    /// Elementwise subtraction.
    pub fn sub(&self, other: &Array) -> Result<Self, ExecError> {
        self.zip_with(other, promote(self.dtype, other.dtype), |a, b| a - b)
    }

    /// Elementwise multiplication.
    pub fn mul(&self, other: &Array) -> Result<Self, ExecError> {
        self.zip_with(other, promote(self.dtype, other.dtype), |a, b| a * b)
    }

    /// Elementwise division. Always yields float32, like true division.
    pub fn div(&self, other: &Array) -> Result<Self, ExecError> {
        self.zip_with(other, DType::Float32, |a, b| a / b)
    }

    /// Elementwise negation, dtype preserved.
    pub fn neg(&self) -> Self {
        let dtype = self.dtype;
        self.map(|v| -v, dtype)
    }
}

fn promote(a: DType, b: DType) -> DType {
    if a == DType::Float32 || b == DType::Float32 {
        DType::Float32
    } else {
        DType::Int32
    }
}

// Scalar broadcasts keep the operand placement; a float scalar promotes,
// an int scalar preserves the array dtype.

impl std::ops::Add<f64> for &Array {
    type Output = Array;
    fn add(self, rhs: f64) -> Array {
        self.map(|v| v + rhs, DType::Float32)
    }
}

impl std::ops::Add<i64> for &Array {
    type Output = Array;
    fn add(self, rhs: i64) -> Array {
        let dtype = self.dtype;
        self.map(|v| v + rhs as f64, dtype)
    }
}

impl std::ops::Mul<f64> for &Array {
    type Output = Array;
    fn mul(self, rhs: f64) -> Array {
        self.map(|v| v * rhs, DType::Float32)
    }
}

impl fmt::Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.placement {
            Placement::Device => "DeviceArray",
            Placement::Host => "array",
        };
        if self.rank == 0 {
            write!(
                f,
                "{prefix}({}, dtype={})",
                format_element(self.data[0], self.dtype),
                self.dtype
            )
        } else {
            let elems: Vec<String> = self
                .data
                .iter()
                .map(|&v| format_element(v, self.dtype))
                .collect();
            write!(f, "{prefix}([{}], dtype={})", elems.join(", "), self.dtype)
        }
    }
}

/// A value visible to a debugger session.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Array(Array),
    Str(Arc<str>),
    Tuple(Vec<Value>),
}

impl Value {
    pub fn str(s: impl AsRef<str>) -> Self {
        Value::Str(Arc::from(s.as_ref()))
    }

    /// `repr`-style rendering: quoted strings, dtype-tagged arrays,
    /// parenthesized tuples (with the one-element trailing comma).
    pub fn repr(&self) -> String {
        match self {
            Value::Array(a) => a.to_string(),
            Value::Str(s) => format!("'{s}'"),
            Value::Tuple(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.repr()).collect();
                if parts.len() == 1 {
                    format!("({},)", parts[0])
                } else {
                    format!("({})", parts.join(", "))
                }
            }
        }
    }

    /// Re-tag every array in this value as a host snapshot.
    pub fn to_host(&self) -> Self {
        match self {
            Value::Array(a) => Value::Array(a.to_host()),
            Value::Str(_) => self.clone(),
            Value::Tuple(items) => Value::Tuple(items.iter().map(Value::to_host).collect()),
        }
    }
}

impl From<Array> for Value {
    fn from(a: Array) -> Self {
        Value::Array(a)
    }
}

impl From<&Array> for Value {
    fn from(a: &Array) -> Self {
        Value::Array(a.clone())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.repr())
    }
}

/// NumPy-style element rendering: float32 with a zero fraction keeps a bare
/// trailing point (`2.`), otherwise the shortest f32 round-trip form.
fn format_element(v: f64, dtype: DType) -> String {
    match dtype {
        DType::Int32 => format!("{}", v as i64),
        DType::Float32 => {
            let f = v as f32;
            if f.is_finite() && f.fract() == 0.0 {
                format!("{}.", f as i64)
            } else {
                format!("{f}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_f32_repr() {
        assert_eq!(
            Array::scalar_f32(2.0).to_string(),
            "array(2., dtype=float32)"
        );
    }

    #[test]
    fn test_scalar_f32_device_repr() {
        assert_eq!(
            Array::scalar_f32(2.0).to_device().to_string(),
            "DeviceArray(2., dtype=float32)"
        );
    }

    #[test]
    fn test_scalar_i32_repr() {
        assert_eq!(Array::scalar_i32(3).to_string(), "array(3, dtype=int32)");
    }

    #[test]
    fn test_vector_repr() {
        let a = Array::vector(vec![1.0, 2.0], DType::Float32);
        assert_eq!(a.to_string(), "array([1., 2.], dtype=float32)");
        let b = Array::arange(3, DType::Int32);
        assert_eq!(b.to_string(), "array([0, 1, 2], dtype=int32)");
    }

    #[test]
    fn test_nonintegral_float_repr() {
        assert_eq!(
            Array::scalar_f32(2.5).to_string(),
            "array(2.5, dtype=float32)"
        );
    }

    #[test]
    fn test_sin_promotes_to_float32() {
        let a = Array::scalar_i32(0).sin();
        assert_eq!(a.dtype(), DType::Float32);
        assert_eq!(a.to_string(), "array(0., dtype=float32)");
    }

    #[test]
    fn test_add_scalar_promotes_to_float() {
        let a = Array::scalar_i32(2);
        assert_eq!((&a + 1.0).dtype(), DType::Float32);
        assert_eq!((&a + 1i64).dtype(), DType::Int32);
    }

    #[test]
    fn test_add_preserves_placement() {
        let a = Array::scalar_f32(2.0).to_device();
        assert_eq!((&a + 1.0).placement(), Placement::Device);
    }

    #[test]
    fn test_lanes_roundtrip() {
        let a = Array::arange(3, DType::Float32);
        let lanes = a.lanes().unwrap();
        assert_eq!(lanes.len(), 3);
        assert_eq!(lanes[1].as_slice(), &[1.0]);
        assert_eq!(Array::stack(&lanes), a);
    }

    #[test]
    fn test_lanes_rejects_scalar() {
        let err = Array::scalar_f32(1.0).lanes().unwrap_err();
        assert!(matches!(err, ExecError::NotBatchable));
    }

    #[test]
    fn test_add_shape_mismatch() {
        let a = Array::arange(2, DType::Float32);
        let b = Array::arange(3, DType::Float32);
        assert!(matches!(
            a.add(&b),
            Err(ExecError::ShapeMismatch { left: 2, right: 3 })
        ));
    }

    #[test]
    fn test_str_repr() {
        assert_eq!(Value::str("inner").repr(), "'inner'");
    }

    #[test]
    fn test_tuple_repr() {
        let t = Value::Tuple(vec![
            Value::from(Array::scalar_f32(2.0)),
            Value::from(Array::scalar_f32(3.0)),
        ]);
        assert_eq!(
            t.repr(),
            "(array(2., dtype=float32), array(3., dtype=float32))"
        );
    }

    #[test]
    fn test_one_tuple_repr() {
        let t = Value::Tuple(vec![Value::str("x")]);
        assert_eq!(t.repr(), "('x',)");
    }

    #[test]
    fn test_value_to_host_recurses() {
        let t = Value::Tuple(vec![Value::from(Array::scalar_f32(1.0).to_device())]);
        match t.to_host() {
            Value::Tuple(items) => match &items[0] {
                Value::Array(a) => assert_eq!(a.placement(), Placement::Host),
                v => panic!("unexpected {v:?}"),
            },
            v => panic!("unexpected {v:?}"),
        }
    }
}
