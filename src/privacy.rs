//! Privacy-sanitizing interpolation.
//!
//! Values interpolated with [`sanitized!`](crate::sanitized) go through
//! [`SafeForLogging`], which decides what part of a value may appear in a
//! log. Text is redacted unless explicitly wrapped in [`Public`]; numbers and
//! booleans are shown as-is.

use std::fmt;

/// Placeholder written in place of a redacted value
pub const REDACTED: &str = "<redacted>";

/// Log-safe rendering of a value
pub trait SafeForLogging {
    fn safe_for_logging(&self) -> String;
}

macro_rules! shown_as_is {
    ($($ty:ty),* $(,)?) => {
        $(
            impl SafeForLogging for $ty {
                #[inline]
                fn safe_for_logging(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

shown_as_is!(bool, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

macro_rules! redacted {
    ($($ty:ty),* $(,)?) => {
        $(
            impl SafeForLogging for $ty {
                #[inline]
                fn safe_for_logging(&self) -> String {
                    REDACTED.to_string()
                }
            }
        )*
    };
}

// Measurements and free text may identify a user
redacted!(f32, f64, char, String, str, std::path::Path, std::path::PathBuf);

impl<T: SafeForLogging + ?Sized> SafeForLogging for &T {
    #[inline]
    fn safe_for_logging(&self) -> String {
        (**self).safe_for_logging()
    }
}

impl<T: SafeForLogging> SafeForLogging for Option<T> {
    fn safe_for_logging(&self) -> String {
        match self {
            Some(value) => format!("Some({})", value.safe_for_logging()),
            None => "None".to_string(),
        }
    }
}

impl<T: SafeForLogging> SafeForLogging for [T] {
    fn safe_for_logging(&self) -> String {
        let items: Vec<String> = self.iter().map(SafeForLogging::safe_for_logging).collect();
        format!("[{}]", items.join(", "))
    }
}

impl<T: SafeForLogging> SafeForLogging for Vec<T> {
    fn safe_for_logging(&self) -> String {
        self.as_slice().safe_for_logging()
    }
}

/// Opt-in: the wrapped value is known not to be private
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Public<T>(pub T);

impl<T: fmt::Display> SafeForLogging for Public<T> {
    #[inline]
    fn safe_for_logging(&self) -> String {
        self.0.to_string()
    }
}

/// Text assembled only from log-safe pieces
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SanitizedString(String);

impl SanitizedString {
    /// Use through `sanitized!`, which routes every argument through
    /// `SafeForLogging`
    #[doc(hidden)]
    pub fn from_sanitized(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SanitizedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `format!` whose arguments are rendered with [`SafeForLogging`]
///
/// Only positional arguments are sanitized; inline `{name}` captures in the
/// format string bypass it.
///
/// ```
/// use taglog::{sanitized, privacy::Public};
///
/// let user = String::from("alice");
/// let text = sanitized!("user {} joined room {} ({} members)", user, Public("lobby"), 3);
/// assert_eq!(text.as_str(), "user <redacted> joined room lobby (3 members)");
/// ```
#[macro_export]
macro_rules! sanitized {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::privacy::SanitizedString::from_sanitized(::std::format!(
            $fmt
            $(, $crate::privacy::SafeForLogging::safe_for_logging(&$arg))*
        ))
    };
}
