//! Typed decoding of JSON-RPC params
//!
//! JSON-RPC lets a caller send params either positionally (`[...]`) or by
//! name (`{...}`), regardless of how the method declares its arguments. This
//! module reconciles the two wire shapes with the destination type:
//!
//! | destination | `[...]` | `{...}` | empty |
//! |---|---|---|---|
//! | record (named fields) | bind element i to field i; length must match | bind by key | ok only for zero-field records |
//! | list (`Vec<T>`) | element-wise | error | error |
//! | scalar / other (strings, numbers, maps, `[T; N]`, `Option<T>`, `Box<RawValue>`) | direct decode | direct decode | error |
//!
//! Destination shapes are described by the [`FromParams`] trait. Records get
//! it from `#[derive(FromParams)]`, which builds a [`RecordPlan`]: the
//! ordered list of field slots walked during binding. The plan is built once
//! per type and cached.
//!
//! # Examples
//!
//! ```rust
//! use jsonrpc_wire_core::{FromParams, ParamsDecoder};
//!
//! #[derive(Debug, Default, PartialEq, FromParams)]
//! struct Subtract {
//!     minuend: i64,
//!     subtrahend: i64,
//! }
//!
//! let decoder = ParamsDecoder::<Subtract>::new();
//! let by_position = decoder.decode("[42, 23]").unwrap();
//! let by_name = decoder.decode(r#"{"subtrahend": 23, "minuend": 42}"#).unwrap();
//! assert_eq!(by_position, by_name);
//!
//! assert!(decoder.decode("[42]").is_err());
//! ```

use crate::error::{Error, FieldError, Result};
use crate::types::{trim_json_ws, Params};
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::marker::PhantomData;

/// Category of a params destination type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Fixed, ordered set of named fields
    Record,
    /// Variable-length homogeneous sequence
    List,
    /// Anything else, decoded directly from the whole params text
    Scalar,
}

/// A type that params can be decoded into
///
/// `raw` is the params text with leading whitespace removed; it is empty
/// when the request carried no params.
pub trait FromParams: Sized {
    /// How the destination reconciles positional and named params
    const SHAPE: Shape;

    fn from_params(raw: &str) -> Result<Self>;
}

type Bind<T> = Box<dyn Fn(&mut T, &str) -> serde_json::Result<()> + Send + Sync>;

struct Slot<T> {
    name: &'static str,
    bind: Bind<T>,
}

/// Decode plan for a record-like destination
///
/// An ordered list of `(name, decode-and-set)` slots. Positional params bind
/// to slots by index; named params bind by slot name. Missing members and
/// members that are JSON `null` leave the field at its default value.
///
/// Usually generated by `#[derive(FromParams)]`; can be built by hand for
/// types that cannot use the derive:
///
/// ```rust
/// use jsonrpc_wire_core::params::RecordPlan;
///
/// #[derive(Default)]
/// struct Transfer {
///     to: String,
///     amount: u64,
/// }
///
/// let plan = RecordPlan::new()
///     .field("to", |t: &mut Transfer, v: String| t.to = v)
///     .field("amount", |t: &mut Transfer, v: u64| t.amount = v);
///
/// let transfer = plan.decode(r#"["alice", 10]"#).unwrap();
/// assert_eq!(transfer.to, "alice");
/// assert_eq!(transfer.amount, 10);
/// ```
pub struct RecordPlan<T> {
    slots: Vec<Slot<T>>,
}

impl<T: 'static> RecordPlan<T> {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Append a field slot; slots are bound in the order they are added
    pub fn field<F, S>(mut self, name: &'static str, setter: S) -> Self
    where
        F: DeserializeOwned + 'static,
        S: Fn(&mut T, F) + Send + Sync + 'static,
    {
        self.slots.push(Slot {
            name,
            bind: Box::new(move |record: &mut T, raw: &str| {
                let value = serde_json::from_str::<F>(raw)?;
                setter(record, value);
                Ok(())
            }),
        });
        self
    }
}

impl<T> RecordPlan<T> {
    /// Number of fields
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Field names in binding order
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slots.iter().map(|slot| slot.name)
    }
}

impl<T: Default> RecordPlan<T> {
    /// Decode raw params into a new record
    pub fn decode(&self, raw: &str) -> Result<T> {
        let raw = trim_json_ws(raw);
        match raw.as_bytes().first() {
            None if self.slots.is_empty() => Ok(T::default()),
            None => Err(Error::EmptyParams),
            Some(b'[') => self.bind_positional(raw),
            Some(b'{') => self.bind_named(raw),
            Some(_) => Err(Error::InvalidParams(
                "expected a JSON array or object".into(),
            )),
        }
    }

    fn bind_positional(&self, raw: &str) -> Result<T> {
        let items: Vec<&RawValue> =
            serde_json::from_str(raw).map_err(|e| Error::InvalidParams(e.to_string()))?;
        if items.len() != self.slots.len() {
            return Err(Error::ParamCount {
                expected: self.slots.len(),
                actual: items.len(),
            });
        }

        let mut record = T::default();
        let mut errors = Vec::new();
        for (index, (slot, item)) in self.slots.iter().zip(items).enumerate() {
            slot.bind_into(&mut record, index, item, &mut errors);
        }
        finish(record, errors)
    }

    fn bind_named(&self, raw: &str) -> Result<T> {
        let members: HashMap<String, &RawValue> =
            serde_json::from_str(raw).map_err(|e| Error::InvalidParams(e.to_string()))?;

        let mut record = T::default();
        let mut errors = Vec::new();
        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(item) = members.get(slot.name) {
                slot.bind_into(&mut record, index, item, &mut errors);
            }
        }
        finish(record, errors)
    }
}

impl<T> Slot<T> {
    fn bind_into(&self, record: &mut T, index: usize, item: &RawValue, errors: &mut Vec<FieldError>) {
        if item.get() == "null" {
            return;
        }
        if let Err(e) = (self.bind)(record, item.get()) {
            errors.push(FieldError {
                index,
                name: self.name,
                message: e.to_string(),
            });
        }
    }
}

fn finish<T>(record: T, errors: Vec<FieldError>) -> Result<T> {
    if errors.is_empty() {
        Ok(record)
    } else {
        Err(Error::FieldDecode(errors))
    }
}

impl<T: 'static> Default for RecordPlan<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for RecordPlan<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordPlan")
            .field("fields", &self.field_names().collect::<Vec<_>>())
            .finish()
    }
}

/// Decode a list-like destination
pub fn decode_list<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>> {
    let raw = trim_json_ws(raw);
    match raw.as_bytes().first() {
        None => Err(Error::EmptyParams),
        Some(b'{') => Err(Error::NamedParamsIntoList),
        Some(b'[') => serde_json::from_str(raw).map_err(|e| Error::InvalidParams(e.to_string())),
        Some(_) => Err(Error::InvalidParams("expected a JSON array".into())),
    }
}

/// Decode a scalar destination directly from the whole params text
pub fn decode_scalar<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let raw = trim_json_ws(raw);
    if raw.is_empty() {
        return Err(Error::EmptyParams);
    }
    serde_json::from_str(raw).map_err(|e| Error::InvalidParams(e.to_string()))
}

/// The canonical zero-field record: accepts empty params, `[]` or any object
impl FromParams for () {
    const SHAPE: Shape = Shape::Record;

    fn from_params(raw: &str) -> Result<Self> {
        RecordPlan::<()>::new().decode(raw)
    }
}

impl<T: DeserializeOwned> FromParams for Vec<T> {
    const SHAPE: Shape = Shape::List;

    fn from_params(raw: &str) -> Result<Self> {
        decode_list(raw)
    }
}

impl<T: FromParams> FromParams for Box<T> {
    const SHAPE: Shape = T::SHAPE;

    fn from_params(raw: &str) -> Result<Self> {
        T::from_params(raw).map(Box::new)
    }
}

macro_rules! scalar_params {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromParams for $ty {
                const SHAPE: Shape = Shape::Scalar;

                fn from_params(raw: &str) -> Result<Self> {
                    decode_scalar(raw)
                }
            }
        )*
    };
}

scalar_params!(
    String,
    bool,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    serde_json::Value,
    serde_json::Number,
);

impl<T: DeserializeOwned> FromParams for HashMap<String, T> {
    const SHAPE: Shape = Shape::Scalar;

    fn from_params(raw: &str) -> Result<Self> {
        decode_scalar(raw)
    }
}

impl<T: DeserializeOwned> FromParams for BTreeMap<String, T> {
    const SHAPE: Shape = Shape::Scalar;

    fn from_params(raw: &str) -> Result<Self> {
        decode_scalar(raw)
    }
}

/// Fixed-length positional params; the length must match exactly
impl<T, const N: usize> FromParams for [T; N]
where
    [T; N]: DeserializeOwned,
{
    const SHAPE: Shape = Shape::Scalar;

    fn from_params(raw: &str) -> Result<Self> {
        decode_scalar(raw)
    }
}

/// `null` params decode to `None`; absent params are still an error
impl<T: DeserializeOwned> FromParams for Option<T> {
    const SHAPE: Shape = Shape::Scalar;

    fn from_params(raw: &str) -> Result<Self> {
        decode_scalar(raw)
    }
}

/// The params text itself, left undecoded
impl FromParams for Box<RawValue> {
    const SHAPE: Shape = Shape::Scalar;

    fn from_params(raw: &str) -> Result<Self> {
        decode_scalar(raw)
    }
}

/// Stateless decoder from raw params to the destination shape `E`
///
/// Zero-sized and `Copy`; one value can be shared freely between threads.
pub struct ParamsDecoder<E> {
    shape: PhantomData<fn() -> E>,
}

impl<E: FromParams> ParamsDecoder<E> {
    pub const fn new() -> Self {
        Self { shape: PhantomData }
    }

    /// Shape category of `E`
    pub fn shape(&self) -> Shape {
        E::SHAPE
    }

    /// Decode raw params text; an empty string means absent params
    pub fn decode(&self, raw: &str) -> Result<E> {
        E::from_params(trim_json_ws(raw)).map_err(|err| {
            tracing::debug!(shape = ?E::SHAPE, error = %err, "Rejected params");
            err
        })
    }

    /// Decode the params of a request, if any
    pub fn decode_params(&self, params: Option<&Params>) -> Result<E> {
        self.decode(params.map_or("", Params::get))
    }
}

impl<E> Clone for ParamsDecoder<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for ParamsDecoder<E> {}

impl<E: FromParams> Default for ParamsDecoder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for ParamsDecoder<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamsDecoder")
            .field("destination", &std::any::type_name::<E>())
            .finish()
    }
}

/// A params decoding function for the destination shape `E`
///
/// ```rust
/// let decode = jsonrpc_wire_core::params_decoder::<Vec<String>>();
/// assert_eq!(decode(r#"["a", "b"]"#).unwrap(), vec!["a", "b"]);
/// assert!(decode(r#"{"a": "b"}"#).is_err());
/// ```
pub fn params_decoder<E: FromParams>() -> impl Fn(&str) -> Result<E> + Copy + Send + Sync {
    let decoder = ParamsDecoder::<E>::new();
    move |raw: &str| decoder.decode(raw)
}
