//! Structural equality for remote specs.
//!
//! The remote control plane may omit collections that were submitted empty,
//! so a spec read back from it is not necessarily `==` to the spec that
//! produced it. [`Equivalent`] compares values field by field and, under
//! [`Equality::EQUATE_EMPTY`], treats an absent collection as equal to an
//! empty one.

/// Options controlling an [`Equivalent`] comparison.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Equality {
    equate_empty: bool,
}

pub trait Equivalent {
    fn equivalent(&self, other: &Self, eq: Equality) -> bool;

    /// Returns true if the value is an empty collection.
    fn is_empty_collection(&self) -> bool {
        false
    }
}

// === impl Equality ===

impl Equality {
    /// Absent and empty collections differ.
    pub const EXACT: Self = Self {
        equate_empty: false,
    };

    /// Absent and empty collections are equal.
    pub const EQUATE_EMPTY: Self = Self { equate_empty: true };

    pub fn equates_empty(&self) -> bool {
        self.equate_empty
    }
}

// === impl Equivalent ===

impl<T: Equivalent> Equivalent for Option<T> {
    fn equivalent(&self, other: &Self, eq: Equality) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.equivalent(b, eq),
            (None, None) => true,
            (Some(v), None) | (None, Some(v)) => eq.equates_empty() && v.is_empty_collection(),
        }
    }
}

impl<T: Equivalent> Equivalent for Vec<T> {
    fn equivalent(&self, other: &Self, eq: Equality) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.equivalent(b, eq))
    }

    fn is_empty_collection(&self) -> bool {
        self.is_empty()
    }
}

/// Implements [`Equivalent`] with `==` for types that hold no collections.
macro_rules! equivalent_by_eq {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::equivalent::Equivalent for $ty {
            #[inline]
            fn equivalent(&self, other: &Self, _: $crate::equivalent::Equality) -> bool {
                self == other
            }
        }
    )+};
}

/// Implements [`Equivalent`] for a struct by comparing each of its fields.
///
/// Every field must be listed: the struct is destructured without a rest
/// pattern, so adding a field without updating the list fails to compile.
macro_rules! equivalent_fields {
    ($($ty:ident { $($field:ident),+ $(,)? })+) => {$(
        impl $crate::equivalent::Equivalent for $ty {
            fn equivalent(&self, other: &Self, eq: $crate::equivalent::Equality) -> bool {
                let $ty { $($field),+ } = self;
                $( $crate::equivalent::Equivalent::equivalent($field, &other.$field, eq) )&&+
            }
        }
    )+};
}

pub(crate) use {equivalent_by_eq, equivalent_fields};

equivalent_by_eq!(bool, u16, u32, u64, i64, String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_equals_empty_only_when_equating_empty() {
        let absent: Option<Vec<String>> = None;
        let empty = Some(Vec::<String>::new());

        assert!(absent.equivalent(&empty, Equality::EQUATE_EMPTY));
        assert!(empty.equivalent(&absent, Equality::EQUATE_EMPTY));
        assert!(!absent.equivalent(&empty, Equality::EXACT));
    }

    #[test]
    fn absent_never_equals_non_empty() {
        let absent: Option<Vec<String>> = None;
        let full = Some(vec!["server-error".to_string()]);

        assert!(!absent.equivalent(&full, Equality::EQUATE_EMPTY));
        assert!(!full.equivalent(&absent, Equality::EQUATE_EMPTY));
    }

    #[test]
    fn absent_scalars_are_not_collapsed() {
        let absent: Option<String> = None;
        let empty = Some(String::new());

        assert!(!absent.equivalent(&empty, Equality::EQUATE_EMPTY));
    }

    #[test]
    fn sequences_compare_in_order() {
        let a = vec![1u32, 2];
        let b = vec![2u32, 1];

        assert!(a.equivalent(&a.clone(), Equality::EXACT));
        assert!(!a.equivalent(&b, Equality::EQUATE_EMPTY));
        assert!(!a.equivalent(&vec![1], Equality::EQUATE_EMPTY));
    }
}
