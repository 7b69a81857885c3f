/*!
 * Host Value Boundary
 * Loosely-typed values exchanged with the managed host runtime
 */

use bytes::BytesMut;
use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::poll::{Poller, ReadinessEvent};

/// String-keyed field map, the object shape of every request and response.
pub type Object = HashMap<String, Value>;

/// Readiness callback held by a poll handle for its active lifetime.
pub type ReadinessCallback = Rc<dyn Fn(&ReadinessEvent)>;

/// Shared mutable byte buffer.
///
/// Contents are never copied across the boundary: extraction hands out
/// another reference to the same storage. The reference count keeps the
/// storage alive for as long as any syscall or result still needs it.
#[derive(Clone)]
pub struct Buffer(Rc<RefCell<BytesMut>>);

impl Buffer {
    #[must_use]
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self(Rc::new(RefCell::new(BytesMut::from(&data[..]))))
    }

    /// Allocate a buffer of `len` zero bytes, the shape the host hands in for
    /// out-parameters such as peer address records.
    #[must_use]
    pub fn zeroed(len: usize) -> Self {
        Self(Rc::new(RefCell::new(BytesMut::zeroed(len))))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn borrow(&self) -> Ref<'_, BytesMut> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, BytesMut> {
        self.0.borrow_mut()
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.borrow().to_vec()
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Buffer({} bytes)", self.len())
    }
}

/// A host-runtime value at the native boundary.
///
/// `Int` carries every host number (the host has one numeric kind); `Uint64`
/// exists for result fields that exceed the safe integer range, such as the
/// `sctpi_*` counters.
#[derive(Clone)]
pub enum Value {
    Int(i64),
    Uint64(u64),
    Bool(bool),
    Bytes(Buffer),
    Array(Vec<Value>),
    Object(Object),
    Callback(ReadinessCallback),
    Poller(Rc<Poller>),
}

impl Value {
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Object field lookup; `None` for non-objects and missing fields.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.as_object().and_then(|obj| obj.get(name))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "Int({v})"),
            Value::Uint64(v) => write!(f, "Uint64({v})"),
            Value::Bool(v) => write!(f, "Bool({v})"),
            Value::Bytes(b) => b.fmt(f),
            Value::Array(items) => f.debug_list().entries(items).finish(),
            Value::Object(obj) => f.debug_map().entries(obj.iter()).finish(),
            Value::Callback(_) => write!(f, "Callback"),
            Value::Poller(_) => write!(f, "Poller"),
        }
    }
}

impl PartialEq for Value {
    /// Structural equality; callbacks and pollers compare by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Uint64(a), Value::Uint64(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => {
                a.ptr_eq(b) || *a.borrow() == *b.borrow()
            }
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Callback(a), Value::Callback(b)) => Rc::ptr_eq(a, b),
            (Value::Poller(a), Value::Poller(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}
