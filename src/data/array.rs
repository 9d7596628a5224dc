//! Typed numeric arrays with interleaved (AOS) or split (SOA) storage.
//!
//! A [`DataArray`] is a named buffer of `n_tuples * n_components` values of one
//! [`ScalarType`]. The storage is a closed set of layouts; the typed accessor in
//! [`crate::data::accessor`] understands the two packed ones.

use crate::mesh_error::MeshError;
use num_traits::{Float, ToPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Name of the per-point/per-cell ghost marker array.
pub const GHOST_ARRAY_NAME: &str = "ghost_type";

/// Scalar type tag for array elements.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    F32,
    F64,
    I32,
    I64,
    U8,
    U32,
    U64,
}

impl ScalarType {
    /// Every supported element type, in dispatch order.
    pub const ALL: [ScalarType; 7] = [
        ScalarType::F32,
        ScalarType::F64,
        ScalarType::I32,
        ScalarType::I64,
        ScalarType::U8,
        ScalarType::U32,
        ScalarType::U64,
    ];

    /// Returns a stable string label for the scalar type.
    pub fn as_str(self) -> &'static str {
        match self {
            ScalarType::F32 => "f32",
            ScalarType::F64 => "f64",
            ScalarType::I32 => "i32",
            ScalarType::I64 => "i64",
            ScalarType::U8 => "u8",
            ScalarType::U32 => "u32",
            ScalarType::U64 => "u64",
        }
    }

    /// Parse a scalar type from a string label.
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }

    /// Size of one element in bytes.
    pub fn size(self) -> usize {
        struct SizeOf;
        impl ElementVisitor for SizeOf {
            type Output = usize;
            fn visit<T: Element>(self) -> usize {
                std::mem::size_of::<T>()
            }
        }
        dispatch(self, SizeOf)
    }

    /// True for `F32` and `F64`.
    pub fn is_floating_point(self) -> bool {
        matches!(self, ScalarType::F32 | ScalarType::F64)
    }
}

/// One contiguous, typed buffer.
#[derive(Clone, Debug, PartialEq)]
pub enum TypedBuffer {
    F32(Vec<f32>),
    F64(Vec<f64>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    U8(Vec<u8>),
    U32(Vec<u32>),
    U64(Vec<u64>),
}

impl TypedBuffer {
    /// Scalar type tag for this buffer.
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            TypedBuffer::F32(_) => ScalarType::F32,
            TypedBuffer::F64(_) => ScalarType::F64,
            TypedBuffer::I32(_) => ScalarType::I32,
            TypedBuffer::I64(_) => ScalarType::I64,
            TypedBuffer::U8(_) => ScalarType::U8,
            TypedBuffer::U32(_) => ScalarType::U32,
            TypedBuffer::U64(_) => ScalarType::U64,
        }
    }

    /// Length of the underlying flat buffer.
    pub fn len(&self) -> usize {
        match self {
            TypedBuffer::F32(v) => v.len(),
            TypedBuffer::F64(v) => v.len(),
            TypedBuffer::I32(v) => v.len(),
            TypedBuffer::I64(v) => v.len(),
            TypedBuffer::U8(v) => v.len(),
            TypedBuffer::U32(v) => v.len(),
            TypedBuffer::U64(v) => v.len(),
        }
    }

    /// Return true if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Element types that can live in a [`TypedBuffer`].
pub trait Element: Copy + PartialOrd + ToPrimitive + Debug + Send + Sync + 'static {
    /// Scalar type tag for this concrete type.
    const SCALAR_TYPE: ScalarType;

    /// Wrap a vector into a tagged buffer.
    fn wrap(values: Vec<Self>) -> TypedBuffer;
    /// Borrow the values if the tag matches.
    fn unwrap(buf: &TypedBuffer) -> Option<&[Self]>;
    /// Mutably borrow the values if the tag matches.
    fn unwrap_mut(buf: &mut TypedBuffer) -> Option<&mut [Self]>;
}

macro_rules! impl_element {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                const SCALAR_TYPE: ScalarType = ScalarType::$variant;

                fn wrap(values: Vec<Self>) -> TypedBuffer {
                    TypedBuffer::$variant(values)
                }

                fn unwrap(buf: &TypedBuffer) -> Option<&[Self]> {
                    match buf {
                        TypedBuffer::$variant(v) => Some(v),
                        _ => None,
                    }
                }

                fn unwrap_mut(buf: &mut TypedBuffer) -> Option<&mut [Self]> {
                    match buf {
                        TypedBuffer::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_element!(
    f32 => F32,
    f64 => F64,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u32 => U32,
    u64 => U64,
);

/// Generic operation instantiated once per element type by [`dispatch`].
pub trait ElementVisitor {
    type Output;
    fn visit<T: Element>(self) -> Self::Output;
}

/// Generic operation over the floating-point subset, see [`dispatch_fp`].
pub trait FloatVisitor {
    type Output;
    fn visit<T: Element + Float>(self) -> Self::Output;
}

/// Run `visitor` with the Rust type matching `ty`.
pub fn dispatch<V: ElementVisitor>(ty: ScalarType, visitor: V) -> V::Output {
    match ty {
        ScalarType::F32 => visitor.visit::<f32>(),
        ScalarType::F64 => visitor.visit::<f64>(),
        ScalarType::I32 => visitor.visit::<i32>(),
        ScalarType::I64 => visitor.visit::<i64>(),
        ScalarType::U8 => visitor.visit::<u8>(),
        ScalarType::U32 => visitor.visit::<u32>(),
        ScalarType::U64 => visitor.visit::<u64>(),
    }
}

/// Run `visitor` when `ty` is a floating-point type; `None` otherwise.
pub fn dispatch_fp<V: FloatVisitor>(ty: ScalarType, visitor: V) -> Option<V::Output> {
    match ty {
        ScalarType::F32 => Some(visitor.visit::<f32>()),
        ScalarType::F64 => Some(visitor.visit::<f64>()),
        _ => None,
    }
}

/// Physical layout of an array's values.
#[derive(Clone, Debug, PartialEq)]
pub enum ArrayStorage {
    /// Components interleaved per tuple.
    Aos(TypedBuffer),
    /// One buffer per component.
    Soa(Vec<TypedBuffer>),
    /// Implicit array repeating a single value; has no packed buffer.
    Constant { scalar_type: ScalarType, value: f64 },
}

impl ArrayStorage {
    pub fn layout_name(&self) -> &'static str {
        match self {
            ArrayStorage::Aos(_) => "array-of-structures",
            ArrayStorage::Soa(_) => "structure-of-arrays",
            ArrayStorage::Constant { .. } => "constant",
        }
    }
}

/// A named numeric attribute array.
#[derive(Clone, Debug, PartialEq)]
pub struct DataArray {
    name: String,
    n_components: usize,
    n_tuples: usize,
    storage: ArrayStorage,
}

impl DataArray {
    /// Interleaved array; `values.len()` must be a multiple of `n_components`.
    pub fn aos<T: Element>(
        name: impl Into<String>,
        n_components: usize,
        values: Vec<T>,
    ) -> Result<Self, MeshError> {
        let name = name.into();
        let n_components = n_components.max(1);
        if values.len() % n_components != 0 {
            return Err(MeshError::ArrayLengthMismatch {
                expected: values.len().next_multiple_of(n_components),
                found: values.len(),
                name,
            });
        }
        Ok(Self {
            name,
            n_components,
            n_tuples: values.len() / n_components,
            storage: ArrayStorage::Aos(T::wrap(values)),
        })
    }

    /// Split array; one vector per component, all of equal length.
    pub fn soa<T: Element>(
        name: impl Into<String>,
        components: Vec<Vec<T>>,
    ) -> Result<Self, MeshError> {
        let name = name.into();
        let n_tuples = components.first().map_or(0, Vec::len);
        if let Some(bad) = components.iter().find(|c| c.len() != n_tuples) {
            return Err(MeshError::ArrayLengthMismatch {
                name,
                expected: n_tuples,
                found: bad.len(),
            });
        }
        Ok(Self {
            name,
            n_components: components.len().max(1),
            n_tuples,
            storage: ArrayStorage::Soa(components.into_iter().map(T::wrap).collect()),
        })
    }

    /// Implicit array holding `value` everywhere.
    pub fn constant(
        name: impl Into<String>,
        scalar_type: ScalarType,
        n_components: usize,
        n_tuples: usize,
        value: f64,
    ) -> Self {
        Self {
            name: name.into(),
            n_components: n_components.max(1),
            n_tuples,
            storage: ArrayStorage::Constant { scalar_type, value },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn n_components(&self) -> usize {
        self.n_components
    }

    pub fn n_tuples(&self) -> usize {
        self.n_tuples
    }

    pub fn storage(&self) -> &ArrayStorage {
        &self.storage
    }

    pub(crate) fn storage_mut(&mut self) -> &mut ArrayStorage {
        &mut self.storage
    }

    /// Element type of the stored values.
    pub fn scalar_type(&self) -> ScalarType {
        match &self.storage {
            ArrayStorage::Aos(buf) => buf.scalar_type(),
            ArrayStorage::Soa(bufs) => bufs
                .first()
                .map_or(ScalarType::F64, TypedBuffer::scalar_type),
            ArrayStorage::Constant { scalar_type, .. } => *scalar_type,
        }
    }

    /// True when this is the ghost marker array.
    pub fn is_ghost(&self) -> bool {
        self.name == GHOST_ARRAY_NAME
    }

    /// Value at (`tuple`, `component`) as `f64`, independent of layout.
    pub fn value(&self, tuple: usize, component: usize) -> Option<f64> {
        if tuple >= self.n_tuples || component >= self.n_components {
            return None;
        }
        struct At<'a> {
            storage: &'a ArrayStorage,
            tuple: usize,
            component: usize,
            n_components: usize,
        }
        impl ElementVisitor for At<'_> {
            type Output = Option<f64>;
            fn visit<T: Element>(self) -> Option<f64> {
                match self.storage {
                    ArrayStorage::Aos(buf) => T::unwrap(buf)?
                        .get(self.tuple * self.n_components + self.component)?
                        .to_f64(),
                    ArrayStorage::Soa(bufs) => {
                        T::unwrap(bufs.get(self.component)?)?.get(self.tuple)?.to_f64()
                    }
                    ArrayStorage::Constant { value, .. } => Some(*value),
                }
            }
        }
        dispatch(
            self.scalar_type(),
            At {
                storage: &self.storage,
                tuple,
                component,
                n_components: self.n_components,
            },
        )
    }

    /// Minimum and maximum over every component, or `None` when empty.
    pub fn range(&self) -> Option<[f64; 2]> {
        struct Range<'a>(&'a ArrayStorage);
        impl ElementVisitor for Range<'_> {
            type Output = Option<[f64; 2]>;
            fn visit<T: Element>(self) -> Option<[f64; 2]> {
                let bufs: Vec<&TypedBuffer> = match self.0 {
                    ArrayStorage::Aos(buf) => vec![buf],
                    ArrayStorage::Soa(bufs) => bufs.iter().collect(),
                    ArrayStorage::Constant { value, .. } => return Some([*value, *value]),
                };
                bufs.into_iter()
                    .filter_map(T::unwrap)
                    .flatten()
                    .filter_map(|v| v.to_f64())
                    .fold(None, |acc: Option<[f64; 2]>, v| match acc {
                        None => Some([v, v]),
                        Some([lo, hi]) => Some([lo.min(v), hi.max(v)]),
                    })
            }
        }
        if self.n_tuples == 0 {
            return None;
        }
        dispatch(self.scalar_type(), Range(&self.storage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_follow_element_width() {
        assert_eq!(ScalarType::F64.size(), 8);
        assert_eq!(ScalarType::F32.size(), 4);
        assert_eq!(ScalarType::U8.size(), 1);
        assert_eq!(ScalarType::parse("i64"), Some(ScalarType::I64));
        assert_eq!(ScalarType::parse("double"), None);
    }

    #[test]
    fn dispatch_fp_skips_integers() {
        struct Eps;
        impl FloatVisitor for Eps {
            type Output = f64;
            fn visit<T: Element + Float>(self) -> f64 {
                T::epsilon().to_f64().unwrap_or(0.0)
            }
        }
        assert_eq!(dispatch_fp(ScalarType::F32, Eps), Some(f32::EPSILON as f64));
        assert_eq!(dispatch_fp(ScalarType::F64, Eps), Some(f64::EPSILON));
        assert_eq!(dispatch_fp(ScalarType::I32, Eps), None);
    }

    #[test]
    fn value_is_layout_independent() {
        let aos = DataArray::aos("v", 2, vec![1.0f64, 10.0, 2.0, 20.0]).unwrap();
        let soa = DataArray::soa("v", vec![vec![1.0f64, 2.0], vec![10.0, 20.0]]).unwrap();
        for t in 0..2 {
            for c in 0..2 {
                assert_eq!(aos.value(t, c), soa.value(t, c));
            }
        }
        assert_eq!(aos.value(2, 0), None);
    }

    #[test]
    fn range_covers_all_components() {
        let a = DataArray::aos("v", 3, vec![1i32, -4, 7, 0, 2, 3]).unwrap();
        assert_eq!(a.range(), Some([-4.0, 7.0]));
        let c = DataArray::constant("c", ScalarType::F32, 1, 4, 2.5);
        assert_eq!(c.range(), Some([2.5, 2.5]));
        let e = DataArray::aos::<f32>("e", 1, vec![]).unwrap();
        assert_eq!(e.range(), None);
    }

    #[test]
    fn ragged_input_is_rejected() {
        assert!(matches!(
            DataArray::aos("v", 3, vec![1.0f32, 2.0]),
            Err(MeshError::ArrayLengthMismatch { .. })
        ));
        assert!(matches!(
            DataArray::soa("v", vec![vec![1.0f32, 2.0], vec![1.0]]),
            Err(MeshError::ArrayLengthMismatch { .. })
        ));
    }
}
