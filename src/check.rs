//! Argument validation / 参数校验
//!
//! Runs before any I/O. The first failing check wins, in the order
//! token, path-like arguments, callback.

use serde_json::Value;

use crate::error::{Error, Result};

/// String-typed argument that a dynamic caller may get wrong / 字符串参数
///
/// Implemented for plain strings, optional strings and JSON values, so that
/// bridges feeding untyped input can still hit the validation messages.
pub trait StrArg {
    /// The argument as a string, or `None` if it is not one
    fn as_arg(&self) -> Option<&str>;
}

impl StrArg for str {
    fn as_arg(&self) -> Option<&str> {
        Some(self)
    }
}

impl StrArg for String {
    fn as_arg(&self) -> Option<&str> {
        Some(self.as_str())
    }
}

impl<T: AsRef<str>> StrArg for Option<T> {
    fn as_arg(&self) -> Option<&str> {
        self.as_ref().map(|s| s.as_ref())
    }
}

impl StrArg for Value {
    fn as_arg(&self) -> Option<&str> {
        self.as_str()
    }
}

impl<T: StrArg + ?Sized> StrArg for &T {
    fn as_arg(&self) -> Option<&str> {
        (**self).as_arg()
    }
}

pub fn check_token<T: StrArg + ?Sized>(token: &T) -> Result<&str> {
    token.as_arg().ok_or(Error::Validation("token should be a string!"))
}

pub fn check_path<T: StrArg + ?Sized>(path: &T) -> Result<&str> {
    path.as_arg().ok_or(Error::Validation("path should be a string!"))
}

pub fn check_from<T: StrArg + ?Sized>(from: &T) -> Result<&str> {
    from.as_arg().ok_or(Error::Validation("from should be a string!"))
}

pub fn check_to<T: StrArg + ?Sized>(to: &T) -> Result<&str> {
    to.as_arg().ok_or(Error::Validation("to should be a string!"))
}

/// Callback presence check for callback-style entry points / 回调校验
pub fn check_fn<F>(callback: Option<F>) -> Result<F> {
    callback.ok_or(Error::Validation("fn should be a function!"))
}
