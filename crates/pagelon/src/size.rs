// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Approximate in-store footprint of cached items.
//!
//! The cache budget is expressed in bytes, but stores are free to encode records any
//! way they like. Sizes are therefore estimated from the shape of a value rather than
//! measured: text costs two bytes per UTF-16 code unit, every other scalar costs eight
//! bytes, and a record costs the sum of its field names and field values.

use std::collections::{BTreeMap, HashMap};

use pagelon_tier::Page;

/// Estimated size of any non-text scalar.
pub const SCALAR_SIZE: u64 = 8;

/// Estimates the number of bytes a value occupies once stored.
///
/// Implement this for the item type of a cache. Records usually sum their fields with
/// [`field_size`]:
///
/// ```
/// use pagelon::{EstimateSize, field_size};
///
/// struct Person {
///     name: String,
///     age: u32,
/// }
///
/// impl EstimateSize for Person {
///     fn estimate_size(&self) -> u64 {
///         field_size("name", &self.name) + field_size("age", &self.age)
///     }
/// }
///
/// let person = Person { name: "Ada".to_string(), age: 36 };
/// assert_eq!(person.estimate_size(), 8 + 6 + 6 + 8);
/// ```
pub trait EstimateSize {
    /// Returns the estimated size in bytes.
    fn estimate_size(&self) -> u64;
}

/// Estimated size of a named field holding `value`.
pub fn field_size<V: EstimateSize + ?Sized>(name: &str, value: &V) -> u64 {
    text_size(name) + value.estimate_size()
}

fn text_size(text: &str) -> u64 {
    text.encode_utf16().count() as u64 * 2
}

fn position_size(position: usize) -> u64 {
    // A sequence element is named by its decimal position.
    (u64::from(position.checked_ilog10().unwrap_or(0)) + 1) * 2
}

macro_rules! scalar_size {
    ($($ty:ty),* $(,)?) => {
        $(
            impl EstimateSize for $ty {
                fn estimate_size(&self) -> u64 {
                    SCALAR_SIZE
                }
            }
        )*
    };
}

scalar_size!(bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64, ());

impl EstimateSize for str {
    fn estimate_size(&self) -> u64 {
        text_size(self)
    }
}

impl EstimateSize for String {
    fn estimate_size(&self) -> u64 {
        text_size(self)
    }
}

impl<T: EstimateSize + ?Sized> EstimateSize for &T {
    fn estimate_size(&self) -> u64 {
        (**self).estimate_size()
    }
}

impl<T: EstimateSize + ?Sized> EstimateSize for Box<T> {
    fn estimate_size(&self) -> u64 {
        (**self).estimate_size()
    }
}

impl<T: EstimateSize + ?Sized> EstimateSize for std::sync::Arc<T> {
    fn estimate_size(&self) -> u64 {
        (**self).estimate_size()
    }
}

impl<T: EstimateSize> EstimateSize for Option<T> {
    fn estimate_size(&self) -> u64 {
        self.as_ref().map_or(SCALAR_SIZE, EstimateSize::estimate_size)
    }
}

impl<T: EstimateSize> EstimateSize for [T] {
    fn estimate_size(&self) -> u64 {
        self.iter()
            .enumerate()
            .map(|(position, item)| position_size(position) + item.estimate_size())
            .sum()
    }
}

impl<T: EstimateSize> EstimateSize for Vec<T> {
    fn estimate_size(&self) -> u64 {
        self.as_slice().estimate_size()
    }
}

impl<K: AsRef<str>, V: EstimateSize, S> EstimateSize for HashMap<K, V, S> {
    fn estimate_size(&self) -> u64 {
        self.iter().map(|(name, value)| field_size(name.as_ref(), value)).sum()
    }
}

impl<K: AsRef<str>, V: EstimateSize> EstimateSize for BTreeMap<K, V> {
    fn estimate_size(&self) -> u64 {
        self.iter().map(|(name, value)| field_size(name.as_ref(), value)).sum()
    }
}

impl<T: EstimateSize> EstimateSize for Page<T> {
    fn estimate_size(&self) -> u64 {
        field_size("index", &self.index()) + field_size("count", &self.count()) + field_size("data", self.data())
    }
}
