//! Attribute data: typed arrays, attribute containers, and auxiliary info.

pub mod accessor;
pub mod array;
pub mod attributes;
pub mod info;

pub use accessor::{get_pointer, get_pointer_mut, try_get_pointer};
pub use array::{DataArray, Element, ScalarType};
pub use attributes::{Association, FieldData};
pub use info::{HasInfo, InfoMap};
