/*!
 * Field Extraction
 * Type-checked decoding of named fields from host argument objects
 */

use crate::core::errors::{fatal, CallError};
use crate::core::value::{Buffer, Object, ReadinessCallback, Value};

/// View over one operation's argument object.
///
/// Extraction comes in two modes. The `get_*` accessors are fallible and
/// return [`CallError::MissingOrWrongType`] for a missing or mistyped field.
/// The `require_*` accessors terminate the process instead: they are used
/// wherever the host-side wrapper validates arguments before calling in, so
/// a failure indicates a defect in the binding rather than bad caller input.
pub struct Args<'a> {
    op: &'static str,
    obj: &'a Object,
}

impl<'a> Args<'a> {
    pub fn from_value(op: &'static str, value: &'a Value) -> Result<Self, CallError> {
        match value.as_object() {
            Some(obj) => Ok(Self { op, obj }),
            None => Err(CallError::MalformedArguments { op }),
        }
    }

    #[must_use]
    pub fn op(&self) -> &'static str {
        self.op
    }

    fn err(&self, field: &'static str, expected: &'static str) -> CallError {
        CallError::MissingOrWrongType {
            op: self.op,
            field,
            expected,
        }
    }

    fn field(
        &self,
        field: &'static str,
        expected: &'static str,
    ) -> Result<&'a Value, CallError> {
        self.obj.get(field).ok_or_else(|| self.err(field, expected))
    }

    pub fn get_i32(&self, field: &'static str) -> Result<i32, CallError> {
        match self.field(field, "a 32-bit signed integer")? {
            Value::Int(v) if i32::try_from(*v).is_ok() => Ok(*v as i32),
            _ => Err(self.err(field, "a 32-bit signed integer")),
        }
    }

    pub fn get_u32(&self, field: &'static str) -> Result<u32, CallError> {
        match self.field(field, "a 32-bit unsigned integer")? {
            Value::Int(v) if u32::try_from(*v).is_ok() => Ok(*v as u32),
            _ => Err(self.err(field, "a 32-bit unsigned integer")),
        }
    }

    pub fn get_bool(&self, field: &'static str) -> Result<bool, CallError> {
        match self.field(field, "a boolean")? {
            Value::Bool(v) => Ok(*v),
            _ => Err(self.err(field, "a boolean")),
        }
    }

    pub fn get_buffer(&self, field: &'static str) -> Result<Buffer, CallError> {
        match self.field(field, "a buffer")? {
            Value::Bytes(buf) => Ok(buf.clone()),
            _ => Err(self.err(field, "a buffer")),
        }
    }

    pub fn get_array(&self, field: &'static str) -> Result<&'a [Value], CallError> {
        match self.field(field, "an array")? {
            Value::Array(items) => Ok(items),
            _ => Err(self.err(field, "an array")),
        }
    }

    /// Nested object field, viewed under the same operation name.
    pub fn get_object(&self, field: &'static str) -> Result<Args<'a>, CallError> {
        match self.field(field, "an object")? {
            Value::Object(obj) => Ok(Args { op: self.op, obj }),
            _ => Err(self.err(field, "an object")),
        }
    }

    pub fn get_callback(&self, field: &'static str) -> Result<ReadinessCallback, CallError> {
        match self.field(field, "a function")? {
            Value::Callback(cb) => Ok(cb.clone()),
            _ => Err(self.err(field, "a function")),
        }
    }

    // Asserted extraction: the dispatcher's operations decode with these.

    pub fn require_i32(&self, field: &'static str) -> i32 {
        self.get_i32(field)
            .unwrap_or_else(|err| fatal(&err.to_string()))
    }

    pub fn require_u32(&self, field: &'static str) -> u32 {
        self.get_u32(field)
            .unwrap_or_else(|err| fatal(&err.to_string()))
    }

    pub fn require_bool(&self, field: &'static str) -> bool {
        self.get_bool(field)
            .unwrap_or_else(|err| fatal(&err.to_string()))
    }

    pub fn require_buffer(&self, field: &'static str) -> Buffer {
        self.get_buffer(field)
            .unwrap_or_else(|err| fatal(&err.to_string()))
    }

    pub fn require_object(&self, field: &'static str) -> Args<'a> {
        self.get_object(field)
            .unwrap_or_else(|err| fatal(&err.to_string()))
    }

    pub fn require_callback(&self, field: &'static str) -> ReadinessCallback {
        self.get_callback(field)
            .unwrap_or_else(|err| fatal(&err.to_string()))
    }

    /// Array field whose every element is a buffer.
    pub fn require_buffer_list(&self, field: &'static str) -> Vec<Buffer> {
        let items = self
            .get_array(field)
            .unwrap_or_else(|err| fatal(&err.to_string()));
        items
            .iter()
            .map(|item| match item {
                Value::Bytes(buf) => buf.clone(),
                _ => fatal(&self.err(field, "an array of buffers").to_string()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn object(fields: Vec<(&str, Value)>) -> Value {
        Value::Object(
            fields
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        )
    }

    #[test]
    fn rejects_non_object_arguments() {
        let err = Args::from_value("listen", &Value::Int(1)).err().unwrap();
        assert_eq!(err, CallError::MalformedArguments { op: "listen" });
    }

    #[test]
    fn fallible_extraction_reports_missing_field() {
        let value = object(vec![("fd", Value::Int(3))]);
        let args = Args::from_value("listen", &value).unwrap();
        assert_eq!(args.get_i32("fd"), Ok(3));
        assert_eq!(
            args.get_i32("backlog"),
            Err(CallError::MissingOrWrongType {
                op: "listen",
                field: "backlog",
                expected: "a 32-bit signed integer",
            })
        );
    }

    #[test]
    fn fallible_extraction_reports_wrong_kind() {
        let value = object(vec![("fd", Value::Bool(true))]);
        let args = Args::from_value("listen", &value).unwrap();
        assert!(args.get_i32("fd").is_err());
        assert!(args.get_buffer("fd").is_err());
        assert_eq!(args.get_bool("fd"), Ok(true));
    }

    #[test]
    fn range_checked_integers() {
        let value = object(vec![("big", Value::Int(i64::from(u32::MAX)))]);
        let args = Args::from_value("test_op", &value).unwrap();
        assert!(args.get_i32("big").is_err());
        assert_eq!(args.get_u32("big"), Ok(u32::MAX));
    }

    #[test]
    fn nested_object_keeps_operation_name() {
        let inner = object(vec![("sid", Value::Int(7))]);
        let value = object(vec![("sndinfo", inner)]);
        let args = Args::from_value("sctp_sendv", &value).unwrap();
        let sndinfo = args.get_object("sndinfo").unwrap();
        assert_eq!(sndinfo.op(), "sctp_sendv");
        assert_eq!(sndinfo.get_u32("sid"), Ok(7));
    }

    #[test]
    fn buffer_extraction_does_not_copy() {
        let buffer = Buffer::zeroed(4);
        let value = object(vec![("sockaddr", Value::Bytes(buffer.clone()))]);
        let args = Args::from_value("accept", &value).unwrap();
        args.require_buffer("sockaddr").borrow_mut()[0] = 0xab;
        assert_eq!(buffer.borrow()[0], 0xab);
    }

    #[test]
    fn callback_extraction_preserves_identity() {
        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);
        let callback: ReadinessCallback = Rc::new(move |_| flag.set(true));
        let value = object(vec![("callback", Value::Callback(callback))]);
        let args = Args::from_value("create_poller", &value).unwrap();
        let extracted = args.require_callback("callback");
        extracted(&crate::poll::ReadinessEvent {
            readable: true,
            writable: false,
            status: 0,
        });
        assert!(fired.get());
    }

    #[test]
    #[should_panic(expected = "contract violation")]
    fn asserted_extraction_is_fatal_on_missing_field() {
        let value = object(vec![]);
        let args = Args::from_value("close_fd", &value).unwrap();
        args.require_i32("fd");
    }

    #[test]
    #[should_panic(expected = "contract violation")]
    fn buffer_list_with_non_buffer_element_is_fatal() {
        let value = object(vec![(
            "sockaddrs",
            Value::Array(vec![Value::Bytes(Buffer::zeroed(16)), Value::Int(0)]),
        )]);
        let args = Args::from_value("sctp_bindx", &value).unwrap();
        args.require_buffer_list("sockaddrs");
    }
}
