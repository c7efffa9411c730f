//! Compiled routines and the finished serializer and deserializer.
//!
//! A routine is a composed closure that captures everything it needs at
//! build time. Calling it never inspects a schema or a type description.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock, Weak};

use bytes::BytesMut;

use crate::error::{DecodeError, EncodeError};
use crate::reflect::{take, BoxedInfo, OptionInfo, Reflect};

/// Writes a type-erased value to the output buffer.
pub type Encoder = Arc<dyn Fn(&dyn Any, &mut BytesMut) -> Result<(), EncodeError> + Send + Sync>;

/// Reads one value from the input cursor.
pub type Decoder = Arc<dyn Fn(&mut &[u8]) -> Result<Box<dyn Any>, DecodeError> + Send + Sync>;

/// Wrap a closure as an [`Encoder`].
pub fn encoder<F>(f: F) -> Encoder
where
    F: Fn(&dyn Any, &mut BytesMut) -> Result<(), EncodeError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wrap a closure as a [`Decoder`].
pub fn decoder<F>(f: F) -> Decoder
where
    F: Fn(&mut &[u8]) -> Result<Box<dyn Any>, DecodeError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Operations the build context needs from either kind of routine.
pub trait Routine: Clone + Send + Sync + 'static {
    /// A routine that calls whatever is later stored in `slot`.
    fn forward(slot: Weak<OnceLock<Self>>) -> Self;

    /// Adapt a routine for `T` to a routine for `Box<T>`.
    fn boxed(inner: Self, info: BoxedInfo) -> Self;

    /// Adapt a routine for `T` to `Option<T>` where the schema has no null.
    fn unwrap_optional(inner: Self, info: OptionInfo) -> Self;
}

impl Routine for Encoder {
    fn forward(slot: Weak<OnceLock<Self>>) -> Self {
        encoder(move |value, buf| {
            let slot = slot.upgrade().ok_or_else(|| {
                EncodeError::InvalidValue("recursive routine is no longer available".to_string())
            })?;
            match slot.get() {
                Some(routine) => routine(value, buf),
                None => Err(EncodeError::InvalidValue(
                    "recursive routine was never completed".to_string(),
                )),
            }
        })
    }

    fn boxed(inner: Self, info: BoxedInfo) -> Self {
        encoder(move |value, buf| inner(info.get(value)?, buf))
    }

    fn unwrap_optional(inner: Self, info: OptionInfo) -> Self {
        encoder(move |value, buf| match info.get(value)? {
            Some(present) => inner(present, buf),
            None => Err(EncodeError::InvalidValue(format!(
                "None of {:?} cannot be written to a schema without null",
                info.inner
            ))),
        })
    }
}

impl Routine for Decoder {
    fn forward(slot: Weak<OnceLock<Self>>) -> Self {
        decoder(move |data| {
            let slot = slot.upgrade().ok_or_else(|| {
                DecodeError::InvalidData("recursive routine is no longer available".to_string())
            })?;
            match slot.get() {
                Some(routine) => routine(data),
                None => Err(DecodeError::InvalidData(
                    "recursive routine was never completed".to_string(),
                )),
            }
        })
    }

    fn boxed(inner: Self, info: BoxedInfo) -> Self {
        decoder(move |data| Ok(info.wrap(inner(data)?)?))
    }

    fn unwrap_optional(inner: Self, info: OptionInfo) -> Self {
        decoder(move |data| Ok(info.some(inner(data)?)?))
    }
}

// ============================================================================
// Serializer / Deserializer
// ============================================================================

/// Writes values of `T` in the binary encoding of one schema.
///
/// Cheap to clone and safe to share between threads.
pub struct Serializer<T> {
    encode: Encoder,
    /// Keeps forward-reference slots of recursive routines alive.
    slots: Arc<[Arc<OnceLock<Encoder>>]>,
    marker: PhantomData<fn(&T)>,
}

impl<T: Reflect> Serializer<T> {
    pub(crate) fn new(encode: Encoder, slots: Vec<Arc<OnceLock<Encoder>>>) -> Self {
        Self {
            encode,
            slots: slots.into(),
            marker: PhantomData,
        }
    }

    /// Append the encoding of `value` to `buf`.
    pub fn serialize(&self, value: &T, buf: &mut BytesMut) -> Result<(), EncodeError> {
        (self.encode)(value, buf)
    }

    /// Encode `value` into a new vector.
    pub fn serialize_to_vec(&self, value: &T) -> Result<Vec<u8>, EncodeError> {
        let mut buf = BytesMut::new();
        self.serialize(value, &mut buf)?;
        Ok(buf.to_vec())
    }
}

impl<T> Clone for Serializer<T> {
    fn clone(&self) -> Self {
        Self {
            encode: Arc::clone(&self.encode),
            slots: Arc::clone(&self.slots),
            marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Serializer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Serializer")
            .field("type", &std::any::type_name::<T>())
            .field("recursive_slots", &self.slots.len())
            .finish()
    }
}

/// Reads values of `T` from the binary encoding of one schema.
///
/// Cheap to clone and safe to share between threads.
pub struct Deserializer<T> {
    decode: Decoder,
    slots: Arc<[Arc<OnceLock<Decoder>>]>,
    marker: PhantomData<fn() -> T>,
}

impl<T: Reflect> Deserializer<T> {
    pub(crate) fn new(decode: Decoder, slots: Vec<Arc<OnceLock<Decoder>>>) -> Self {
        Self {
            decode,
            slots: slots.into(),
            marker: PhantomData,
        }
    }

    /// Read one value, advancing `data` past it.
    pub fn deserialize(&self, data: &mut &[u8]) -> Result<T, DecodeError> {
        let value = (self.decode)(data)?;
        Ok(take::<T>(value)?)
    }

    /// Read exactly one value from `bytes`; trailing bytes are an error.
    pub fn deserialize_slice(&self, bytes: &[u8]) -> Result<T, DecodeError> {
        let mut data = bytes;
        let value = self.deserialize(&mut data)?;
        if !data.is_empty() {
            return Err(DecodeError::InvalidData(format!(
                "{} trailing bytes after value",
                data.len()
            )));
        }
        Ok(value)
    }
}

impl<T> Clone for Deserializer<T> {
    fn clone(&self) -> Self {
        Self {
            decode: Arc::clone(&self.decode),
            slots: Arc::clone(&self.slots),
            marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Deserializer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deserializer")
            .field("type", &std::any::type_name::<T>())
            .field("recursive_slots", &self.slots.len())
            .finish()
    }
}
