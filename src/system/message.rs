//! Settings messages from the companion app
//!
//! A message is a small dictionary of typed tuples:
//!
//! ```text
//! count: u8
//! count times:
//!     key: u32 LE, type: u8, length: u16 LE, value: [u8; length]
//! ```

use super::settings::{PackedColor, SettingsUpdate};
use crate::ui::FillDirection;

/// Largest message accepted over BLE
pub const MAX_MESSAGE_LEN: usize = 64;

const TUPLE_HEADER_LEN: usize = 7;

/// Keys understood by the watchface.
pub mod keys {
    pub const BACKGROUND_COLOR: u32 = 0;
    pub const DOT_COLOR: u32 = 1;
    pub const FILL_DIRECTION: u32 = 2;
}

/// Type tags of a tuple.
pub mod tags {
    pub const BYTE_ARRAY: u8 = 0;
    pub const CSTRING: u8 = 1;
    pub const UINT: u8 = 2;
    pub const INT: u8 = 3;
}

#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Message has no tuple count
    Empty,
    /// Tuple header or value runs past the end of the message
    Truncated,
    /// Unknown type tag
    InvalidType(u8),
    /// Integer value not 1, 2 or 4 bytes long
    InvalidIntLength(u16),
    /// String value is not UTF-8
    InvalidString,
    /// Bytes left over after the last tuple
    TrailingBytes(usize),
}

/// Decoded value of a tuple.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Value<'a> {
    Bytes(&'a [u8]),
    Str(&'a str),
    Uint(u32),
    Int(i32),
}

impl Value<'_> {
    /// Integer value regardless of signedness
    pub fn as_u32(&self) -> Option<u32> {
        match *self {
            Value::Uint(value) => Some(value),
            Value::Int(value) => Some(value as u32),
            Value::Bytes(_) | Value::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match *self {
            Value::Str(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tuple<'a> {
    pub key: u32,
    pub value: Value<'a>,
}

/// Iterator over the tuples of a message.
pub struct Tuples<'a> {
    rest: &'a [u8],
    remaining: u8,
}

impl<'a> Tuples<'a> {
    pub fn new(message: &'a [u8]) -> Result<Self, DecodeError> {
        let (&count, rest) = message.split_first().ok_or(DecodeError::Empty)?;
        Ok(Self {
            rest,
            remaining: count,
        })
    }

    fn next_tuple(&mut self) -> Result<Tuple<'a>, DecodeError> {
        if self.rest.len() < TUPLE_HEADER_LEN {
            return Err(DecodeError::Truncated);
        }
        let (header, rest) = self.rest.split_at(TUPLE_HEADER_LEN);
        let key = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let tag = header[4];
        let length = u16::from_le_bytes([header[5], header[6]]);

        if rest.len() < length as usize {
            return Err(DecodeError::Truncated);
        }
        let (data, rest) = rest.split_at(length as usize);
        self.rest = rest;

        Ok(Tuple {
            key,
            value: decode_value(tag, data)?,
        })
    }
}

impl<'a> Iterator for Tuples<'a> {
    type Item = Result<Tuple<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return match self.rest.len() {
                0 => None,
                extra => {
                    self.rest = &[];
                    Some(Err(DecodeError::TrailingBytes(extra)))
                }
            };
        }
        self.remaining -= 1;

        let tuple = self.next_tuple();
        if tuple.is_err() {
            // Nothing after a bad tuple can be trusted
            self.remaining = 0;
            self.rest = &[];
        }
        Some(tuple)
    }
}

fn decode_value(tag: u8, data: &[u8]) -> Result<Value<'_>, DecodeError> {
    match tag {
        tags::BYTE_ARRAY => Ok(Value::Bytes(data)),
        tags::CSTRING => {
            let text = match data.iter().position(|&b| b == 0) {
                Some(end) => &data[..end],
                None => data,
            };
            core::str::from_utf8(text)
                .map(Value::Str)
                .map_err(|_| DecodeError::InvalidString)
        }
        tags::UINT => Ok(Value::Uint(decode_int(data)? as u32)),
        tags::INT => {
            let value = match *data {
                [b] => b as i8 as i32,
                [a, b] => i16::from_le_bytes([a, b]) as i32,
                [a, b, c, d] => i32::from_le_bytes([a, b, c, d]),
                _ => return Err(DecodeError::InvalidIntLength(data.len() as u16)),
            };
            Ok(Value::Int(value))
        }
        other => Err(DecodeError::InvalidType(other)),
    }
}

fn decode_int(data: &[u8]) -> Result<u32, DecodeError> {
    match *data {
        [b] => Ok(b as u32),
        [a, b] => Ok(u16::from_le_bytes([a, b]) as u32),
        [a, b, c, d] => Ok(u32::from_le_bytes([a, b, c, d])),
        _ => Err(DecodeError::InvalidIntLength(data.len() as u16)),
    }
}

/// Decode a settings message.
///
/// Unknown keys and known keys with a value of the wrong type are skipped.
/// A fill direction name that isn't recognized leaves the direction unset.
pub fn decode_settings(message: &[u8]) -> Result<SettingsUpdate, DecodeError> {
    let mut update = SettingsUpdate::default();

    for tuple in Tuples::new(message)? {
        let Tuple { key, value } = tuple?;
        match key {
            keys::BACKGROUND_COLOR => {
                if let Some(color) = value.as_u32() {
                    update.background_color = Some(PackedColor(color));
                }
            }
            keys::DOT_COLOR => {
                if let Some(color) = value.as_u32() {
                    update.dot_color = Some(PackedColor(color));
                }
            }
            keys::FILL_DIRECTION => {
                if let Some(name) = value.as_str() {
                    match FillDirection::from_name(name) {
                        Some(direction) => update.fill_direction = Some(direction),
                        None => {
                            #[cfg(feature = "defmt")]
                            defmt::warn!("Unknown fill direction {}", name);
                        }
                    }
                }
            }
            _key => {
                #[cfg(feature = "defmt")]
                defmt::debug!("Ignoring message key {}", _key);
            }
        }
    }

    Ok(update)
}

/// Build a message from tuples, the inverse of [`decode_settings`].
///
/// Returns the message length, or `None` if `buf` is too small.
pub fn encode(tuples: &[Tuple<'_>], buf: &mut [u8]) -> Option<usize> {
    let mut len = 1;
    *buf.first_mut()? = u8::try_from(tuples.len()).ok()?;

    for tuple in tuples {
        let int_bytes;
        let (tag, data): (u8, &[u8]) = match tuple.value {
            Value::Bytes(bytes) => (tags::BYTE_ARRAY, bytes),
            Value::Str(text) => (tags::CSTRING, text.as_bytes()),
            Value::Uint(value) => {
                int_bytes = value.to_le_bytes();
                (tags::UINT, &int_bytes)
            }
            Value::Int(value) => {
                int_bytes = value.to_le_bytes();
                (tags::INT, &int_bytes)
            }
        };
        let nul = usize::from(tag == tags::CSTRING);
        let value_len = u16::try_from(data.len() + nul).ok()?;

        let out = buf.get_mut(len..len + TUPLE_HEADER_LEN + value_len as usize)?;
        out[0..4].copy_from_slice(&tuple.key.to_le_bytes());
        out[4] = tag;
        out[5..7].copy_from_slice(&value_len.to_le_bytes());
        out[7..7 + data.len()].copy_from_slice(data);
        if nul == 1 {
            out[7 + data.len()] = 0;
        }
        len += TUPLE_HEADER_LEN + value_len as usize;
    }

    Some(len)
}
