/// Implements `From` in both directions between a newtype and its wrapped primitive.
#[macro_export]
macro_rules! impl_from_primitive {
    ($wrapper:ident, $primitive:ty) => {
        impl From<$primitive> for $wrapper {
            fn from(value: $primitive) -> Self {
                Self(value)
            }
        }

        impl From<$wrapper> for $primitive {
            fn from(wrapper: $wrapper) -> Self {
                wrapper.0
            }
        }
    };
}

/// Implements `Add`, `Sub`, and `Sum` for a newtype around `f64`.
///
/// No `Div`: callers divide the inner values after an explicit zero check.
#[macro_export]
macro_rules! impl_add_sub_sum_f64 {
    ($wrapper:ident) => {
        impl std::ops::Add for $wrapper {
            type Output = Self;

            fn add(self, other: Self) -> Self {
                Self(self.0 + other.0)
            }
        }

        impl std::ops::Sub for $wrapper {
            type Output = Self;

            fn sub(self, other: Self) -> Self {
                Self(self.0 - other.0)
            }
        }

        impl std::iter::Sum for $wrapper {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                iter.fold(Self(0.0), |acc, x| Self(acc.0 + x.0))
            }
        }

        impl<'a> std::iter::Sum<&'a $wrapper> for $wrapper {
            fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
                iter.fold(Self(0.0), |acc, x| Self(acc.0 + x.0))
            }
        }
    };
}
