//! Typed access into packed array storage.
//!
//! Only the two packed layouts are addressable: array-of-structures returns the
//! whole interleaved buffer, structure-of-arrays returns the first component's
//! buffer. The SOA case is only meaningful for single-component arrays.

use crate::data::array::{ArrayStorage, DataArray, Element};
use crate::mesh_error::MeshError;

fn resolve<T: Element>(array: Option<&DataArray>) -> Result<&[T], MeshError> {
    let array = array.ok_or(MeshError::NullArray)?;
    let buf = match array.storage() {
        ArrayStorage::Aos(buf) => buf,
        ArrayStorage::Soa(bufs) => {
            if bufs.len() > 1 {
                log::warn!(
                    "array `{}` has {} SOA components; only the first is addressed",
                    array.name(),
                    bufs.len()
                );
            }
            bufs.first().ok_or(MeshError::UnsupportedLayout {
                name: array.name().to_string(),
                layout: "structure-of-arrays without components",
            })?
        }
        other => {
            return Err(MeshError::UnsupportedLayout {
                name: array.name().to_string(),
                layout: other.layout_name(),
            });
        }
    };
    T::unwrap(buf).ok_or_else(|| MeshError::ElementTypeMismatch {
        name: array.name().to_string(),
        expected: T::SCALAR_TYPE,
        found: buf.scalar_type(),
    })
}

/// Fallible form of [`get_pointer`].
pub fn try_get_pointer<T: Element>(array: Option<&DataArray>) -> Result<&[T], MeshError> {
    resolve(array)
}

/// Packed values of `array` starting at the first element.
///
/// Returns `None` and logs an error when the array is missing, is not one of
/// the packed layouts, or does not hold `T`.
pub fn get_pointer<T: Element>(array: Option<&DataArray>) -> Option<&[T]> {
    resolve(array)
        .map_err(|e| log::error!("get_pointer: {e}"))
        .ok()
}

/// Mutable counterpart of [`get_pointer`].
pub fn get_pointer_mut<T: Element>(array: Option<&mut DataArray>) -> Option<&mut [T]> {
    let Some(array) = array else {
        log::error!("get_pointer_mut: {}", MeshError::NullArray);
        return None;
    };
    let name = array.name().to_string();
    let layout = array.storage().layout_name();
    let buf = match array.storage_mut() {
        ArrayStorage::Aos(buf) => buf,
        ArrayStorage::Soa(bufs) if !bufs.is_empty() => &mut bufs[0],
        _ => {
            log::error!(
                "get_pointer_mut: {}",
                MeshError::UnsupportedLayout { name, layout }
            );
            return None;
        }
    };
    let found = buf.scalar_type();
    let out = T::unwrap_mut(buf);
    if out.is_none() {
        log::error!(
            "get_pointer_mut: {}",
            MeshError::ElementTypeMismatch {
                name,
                expected: T::SCALAR_TYPE,
                found,
            }
        );
    }
    out
}
