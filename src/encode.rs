/*!
 * Result Encoding
 * Uniform errno-or-result objects returned to the host runtime
 */

use crate::core::types::Errno;
use crate::core::value::{Buffer, Object, Value};

/// Builder for result objects.
///
/// Every syscall-backed operation returns one of two shapes: a success object
/// with `errno: 0` and the operation's payload fields, or `{errno: code}`
/// with nothing else. Operational failures travel exclusively through the
/// errno field; they are never raised as errors and never logged here.
pub struct ResultBuilder {
    fields: Object,
}

/// Success payload under construction; `errno` is pre-set to 0.
#[must_use]
pub fn success() -> ResultBuilder {
    object().int32("errno", 0)
}

/// Bare result object without the errno convention, for decode-only
/// operations such as notification parsing.
#[must_use]
pub fn object() -> ResultBuilder {
    ResultBuilder {
        fields: Object::new(),
    }
}

/// Failed syscall: `{errno: code}`, payload omitted entirely.
#[must_use]
pub fn failure(errno: Errno) -> Value {
    object().int32("errno", errno).build()
}

/// Result for operations whose success carries no payload.
#[must_use]
pub fn errno_result(result: Result<(), Errno>) -> Value {
    match result {
        Ok(()) => success().build(),
        Err(errno) => failure(errno),
    }
}

impl ResultBuilder {
    pub fn int32(self, name: &str, value: i32) -> Self {
        self.field(name, Value::Int(i64::from(value)))
    }

    /// Unsigned 64-bit field, for counters that exceed the host's safe
    /// integer range.
    pub fn uint64(self, name: &str, value: u64) -> Self {
        self.field(name, Value::Uint64(value))
    }

    pub fn bytes(self, name: &str, value: Buffer) -> Self {
        self.field(name, Value::Bytes(value))
    }

    pub fn array(self, name: &str, items: Vec<Value>) -> Self {
        self.field(name, Value::Array(items))
    }

    pub fn field(mut self, name: &str, value: Value) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    #[must_use]
    pub fn build(self) -> Value {
        Value::Object(self.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn failure_carries_only_errno() {
        let result = failure(libc::EBADF);
        let obj = result.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert_eq!(result.get("errno"), Some(&Value::Int(i64::from(libc::EBADF))));
    }

    #[test]
    fn success_payload_sits_beside_errno_zero() {
        let result = success().int32("fd", 5).uint64("sctpi_tag", u64::MAX).build();
        assert_eq!(result.get("errno"), Some(&Value::Int(0)));
        assert_eq!(result.get("fd"), Some(&Value::Int(5)));
        assert_eq!(result.get("sctpi_tag"), Some(&Value::Uint64(u64::MAX)));
    }

    #[test]
    fn errno_result_maps_both_outcomes() {
        assert_eq!(errno_result(Ok(())).get("errno"), Some(&Value::Int(0)));
        assert_eq!(
            errno_result(Err(libc::EINVAL)).get("errno"),
            Some(&Value::Int(i64::from(libc::EINVAL)))
        );
    }

    #[test]
    fn bare_object_has_no_errno() {
        let result = object().int32("sn_type", 0x8001).build();
        assert_eq!(result.get("errno"), None);
    }
}
