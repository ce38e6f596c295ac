use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

/// One entry of a type's index table: the serialized field name and the
/// index its content is written to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexField {
    pub field: &'static str,
    pub index: &'static str,
}

impl IndexField {
    pub const fn new(field: &'static str, index: &'static str) -> Self {
        Self { field, index }
    }
}

/// A value type that declares which of its fields feed secondary indexes.
///
/// The table is consulted only when the value serializes to an object.
/// Types with nothing to index keep the default empty table; use
/// [`index_fields!`](crate::index_fields) to write the impl for a record.
pub trait Indexed {
    const INDEX_FIELDS: &'static [IndexField] = &[];
}

/// Implement [`Indexed`] for a record type from a `field => "index"` table.
///
/// Field names must match the serialized names (after any serde rename).
#[macro_export]
macro_rules! index_fields {
    ($ty:ty { $($field:ident => $index:expr),* $(,)? }) => {
        impl $crate::Indexed for $ty {
            const INDEX_FIELDS: &'static [$crate::IndexField] = &[
                $($crate::IndexField::new(stringify!($field), $index)),*
            ];
        }
    };
}

macro_rules! unindexed {
    ($($ty:ty),* $(,)?) => {
        $(impl Indexed for $ty {})*
    };
}

unindexed!(
    bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64,
    String, str, (), serde_json::Value,
);

impl<T: Indexed + ?Sized> Indexed for &T {
    const INDEX_FIELDS: &'static [IndexField] = T::INDEX_FIELDS;
}
impl<T> Indexed for Vec<T> {}
impl<T> Indexed for [T] {}
impl<T> Indexed for VecDeque<T> {}
impl<T> Indexed for Option<T> {}
impl<T> Indexed for BTreeSet<T> {}
impl<T, S> Indexed for HashSet<T, S> {}
impl<K, V> Indexed for BTreeMap<K, V> {}
impl<K, V, S> Indexed for HashMap<K, V, S> {}
