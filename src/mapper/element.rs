use std::fmt::Debug;

/// Numeric cell type a table can be loaded into.
pub trait Element: Copy + Default + PartialEq + Debug + Send + Sync + 'static {
    /// Parse a whole token as a finite number; `None` if any of it is not
    /// numeric. Spellings of NaN and infinity are not numbers here.
    fn parse_token(token: &str) -> Option<Self>;

    /// Value stored for categorical code `code`.
    fn from_code(code: usize) -> Self;

    fn nan() -> Self;

    fn is_nan(self) -> bool;

    fn to_f64(self) -> f64;

    /// Equality that also treats two NaNs as the same mapped value.
    fn same_value(self, other: Self) -> bool {
        self == other || (self.is_nan() && other.is_nan())
    }
}

macro_rules! float_element {
    ($ty:ty) => {
        impl Element for $ty {
            fn parse_token(token: &str) -> Option<Self> {
                token.parse::<$ty>().ok().filter(|v| v.is_finite())
            }

            fn from_code(code: usize) -> Self {
                code as $ty
            }

            fn nan() -> Self {
                <$ty>::NAN
            }

            fn is_nan(self) -> bool {
                <$ty>::is_nan(self)
            }

            fn to_f64(self) -> f64 {
                self as f64
            }
        }
    };
}

float_element!(f32);
float_element!(f64);
