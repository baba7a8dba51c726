//! Бинарный кодек конверта.
//!
//! Конверт записывается как последовательность полей
//! `key_len:u8 | key | tag:u8 | value`, где значение зависит от тега:
//!
//! - `TAG_I64`: 8 байт, big-endian;
//! - `TAG_BYTES`: длина `u32` big-endian, затем сами байты.
//!
//! Порядок полей не важен. Неизвестные ключи с известным тегом
//! пропускаются, неизвестный тег или обрыв данных считаются повреждением.

use byteorder::{BigEndian, ReadBytesExt};
use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;
use zenbridge_error::EnvelopeError;

use super::{
    tags::{KEY_SEQUENCE_NUMBER, KEY_SOURCE_GID, KEY_SOURCE_TIMESTAMP, TAG_BYTES, TAG_I64},
    Envelope, Gid, GID_SIZE,
};

/// Размер закодированного конверта из трёх обязательных полей.
pub const ENCODED_LEN: usize = (1 + KEY_SEQUENCE_NUMBER.len() + 1 + 8)
    + (1 + KEY_SOURCE_TIMESTAMP.len() + 1 + 8)
    + (1 + KEY_SOURCE_GID.len() + 1 + 4 + GID_SIZE);

/// Значение поля, ещё не привязанное к конкретному ключу.
enum Value<'a> {
    Int(i64),
    Bytes(&'a [u8]),
}

/// Кодирует конверт.
pub fn encode(envelope: &Envelope) -> Bytes {
    let mut buf = BytesMut::with_capacity(ENCODED_LEN);

    put_key(&mut buf, KEY_SEQUENCE_NUMBER);
    buf.put_u8(TAG_I64);
    buf.put_i64(envelope.sequence_number);

    put_key(&mut buf, KEY_SOURCE_TIMESTAMP);
    buf.put_u8(TAG_I64);
    buf.put_i64(envelope.source_timestamp);

    put_key(&mut buf, KEY_SOURCE_GID);
    buf.put_u8(TAG_BYTES);
    buf.put_u32(GID_SIZE as u32);
    buf.put_slice(envelope.source_gid.as_bytes());

    buf.freeze()
}

/// Декодирует конверт.
///
/// Если обязательное поле отсутствует, в ошибке указывается первое
/// из них в порядке `sequence_number`, `source_timestamp`, `source_gid`.
pub fn decode(mut input: &[u8]) -> Result<Envelope, EnvelopeError> {
    if input.is_empty() {
        return Err(EnvelopeError::EmptyInput);
    }

    let mut sequence_number = None;
    let mut source_timestamp = None;
    let mut source_gid = None;

    while !input.is_empty() {
        let key = read_key(&mut input)?;
        let value = read_value(&mut input, key)?;

        match key {
            KEY_SEQUENCE_NUMBER => {
                let v = expect_int(value, KEY_SEQUENCE_NUMBER)?;
                set_once(&mut sequence_number, v, KEY_SEQUENCE_NUMBER)?;
            }
            KEY_SOURCE_TIMESTAMP => {
                let v = expect_int(value, KEY_SOURCE_TIMESTAMP)?;
                set_once(&mut source_timestamp, v, KEY_SOURCE_TIMESTAMP)?;
            }
            KEY_SOURCE_GID => {
                let raw = expect_bytes(value, KEY_SOURCE_GID)?;
                set_once(&mut source_gid, Gid::from_slice(raw)?, KEY_SOURCE_GID)?;
            }
            other => trace!(key = other, "skipping unknown envelope field"),
        }
    }

    Ok(Envelope {
        sequence_number: sequence_number.ok_or(EnvelopeError::MissingField {
            field: KEY_SEQUENCE_NUMBER,
        })?,
        source_timestamp: source_timestamp.ok_or(EnvelopeError::MissingField {
            field: KEY_SOURCE_TIMESTAMP,
        })?,
        source_gid: source_gid.ok_or(EnvelopeError::MissingField {
            field: KEY_SOURCE_GID,
        })?,
    })
}

////////////////////////////////////////////////////////////////////////////////
// Вспомогательные функции
////////////////////////////////////////////////////////////////////////////////

fn put_key(
    buf: &mut BytesMut,
    key: &str,
) {
    buf.put_u8(key.len() as u8);
    buf.put_slice(key.as_bytes());
}

fn read_key<'a>(input: &mut &'a [u8]) -> Result<&'a str, EnvelopeError> {
    let len = input.read_u8().map_err(|e| malformed("key", e))? as usize;
    let raw = take(input, len, "key")?;
    std::str::from_utf8(raw).map_err(|e| malformed("key", e))
}

fn read_value<'a>(
    input: &mut &'a [u8],
    key: &str,
) -> Result<Value<'a>, EnvelopeError> {
    let tag = input.read_u8().map_err(|e| malformed(key, e))?;
    match tag {
        TAG_I64 => input
            .read_i64::<BigEndian>()
            .map(Value::Int)
            .map_err(|e| malformed(key, e)),
        TAG_BYTES => {
            let len = input
                .read_u32::<BigEndian>()
                .map_err(|e| malformed(key, e))? as usize;
            take(input, len, key).map(Value::Bytes)
        }
        other => Err(EnvelopeError::Malformed {
            field: key.to_string(),
            reason: format!("unknown value tag {other:#04x}"),
        }),
    }
}

fn take<'a>(
    input: &mut &'a [u8],
    len: usize,
    field: &str,
) -> Result<&'a [u8], EnvelopeError> {
    if input.len() < len {
        return Err(EnvelopeError::Malformed {
            field: field.to_string(),
            reason: format!("need {len} bytes, {} left", input.len()),
        });
    }
    let (head, tail) = input.split_at(len);
    *input = tail;
    Ok(head)
}

fn expect_int(
    value: Value<'_>,
    field: &'static str,
) -> Result<i64, EnvelopeError> {
    match value {
        Value::Int(v) => Ok(v),
        Value::Bytes(_) => Err(EnvelopeError::Malformed {
            field: field.to_string(),
            reason: "expected integer, got bytes".to_string(),
        }),
    }
}

fn expect_bytes<'a>(
    value: Value<'a>,
    field: &'static str,
) -> Result<&'a [u8], EnvelopeError> {
    match value {
        Value::Bytes(v) => Ok(v),
        Value::Int(_) => Err(EnvelopeError::Malformed {
            field: field.to_string(),
            reason: "expected bytes, got integer".to_string(),
        }),
    }
}

fn set_once<T>(
    slot: &mut Option<T>,
    value: T,
    field: &'static str,
) -> Result<(), EnvelopeError> {
    if slot.replace(value).is_some() {
        return Err(EnvelopeError::Malformed {
            field: field.to_string(),
            reason: "field appears more than once".to_string(),
        });
    }
    Ok(())
}

fn malformed(
    field: &str,
    err: impl std::fmt::Display,
) -> EnvelopeError {
    EnvelopeError::Malformed {
        field: field.to_string(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Envelope {
        Envelope::new(42, 1_700_000_000_000_000_000, Gid::new([9u8; GID_SIZE]))
    }

    fn field(
        buf: &mut Vec<u8>,
        key: &str,
        tag: u8,
        value: &[u8],
    ) {
        buf.push(key.len() as u8);
        buf.extend_from_slice(key.as_bytes());
        buf.push(tag);
        buf.extend_from_slice(value);
    }

    fn gid_value(len: usize) -> Vec<u8> {
        let mut v = (len as u32).to_be_bytes().to_vec();
        v.extend(std::iter::repeat(7u8).take(len));
        v
    }

    /// Тест проверяет, что закодированный конверт декодируется в исходный.
    #[test]
    fn test_encode_decode() {
        let env = sample();
        let bytes = encode(&env);
        assert_eq!(bytes.len(), ENCODED_LEN);
        assert_eq!(decode(&bytes).unwrap(), env);
    }

    /// Тест проверяет, что порядок полей не важен, а неизвестные поля
    /// пропускаются.
    #[test]
    fn test_reordered_with_unknown_field() {
        let mut buf = Vec::new();
        field(&mut buf, KEY_SOURCE_GID, TAG_BYTES, &gid_value(GID_SIZE));
        field(&mut buf, "vendor_hint", TAG_BYTES, &gid_value(3));
        field(&mut buf, KEY_SOURCE_TIMESTAMP, TAG_I64, &5i64.to_be_bytes());
        field(&mut buf, KEY_SEQUENCE_NUMBER, TAG_I64, &(-3i64).to_be_bytes());

        let env = decode(&buf).unwrap();
        assert_eq!(env.sequence_number, -3);
        assert_eq!(env.source_timestamp, 5);
        assert_eq!(env.source_gid, Gid::new([7u8; GID_SIZE]));
    }

    /// Тест проверяет, что пустой вход отклоняется отдельной ошибкой.
    #[test]
    fn test_empty_input() {
        assert_eq!(decode(&[]), Err(EnvelopeError::EmptyInput));
    }

    /// Тест проверяет, что отсутствие `source_gid` называет именно это поле.
    #[test]
    fn test_missing_gid() {
        let mut buf = Vec::new();
        field(&mut buf, KEY_SEQUENCE_NUMBER, TAG_I64, &1i64.to_be_bytes());
        field(&mut buf, KEY_SOURCE_TIMESTAMP, TAG_I64, &2i64.to_be_bytes());
        assert_eq!(
            decode(&buf),
            Err(EnvelopeError::MissingField {
                field: KEY_SOURCE_GID
            })
        );
    }

    /// Тест проверяет, что идентификатор неверной длины даёт LengthMismatch.
    #[test]
    fn test_gid_length_mismatch() {
        let mut buf = Vec::new();
        field(&mut buf, KEY_SEQUENCE_NUMBER, TAG_I64, &1i64.to_be_bytes());
        field(&mut buf, KEY_SOURCE_TIMESTAMP, TAG_I64, &2i64.to_be_bytes());
        field(&mut buf, KEY_SOURCE_GID, TAG_BYTES, &gid_value(12));
        assert_eq!(
            decode(&buf),
            Err(EnvelopeError::LengthMismatch {
                field: KEY_SOURCE_GID,
                expected: GID_SIZE,
                actual: 12,
            })
        );
    }

    /// Тест проверяет, что обрезанный конверт считается повреждённым.
    #[test]
    fn test_truncated() {
        let bytes = encode(&sample());
        let err = decode(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, EnvelopeError::Malformed { ref field, .. } if field == KEY_SOURCE_GID));
    }

    /// Тест проверяет, что повтор поля отклоняется.
    #[test]
    fn test_duplicate_field() {
        let mut buf = encode(&sample()).to_vec();
        field(&mut buf, KEY_SEQUENCE_NUMBER, TAG_I64, &1i64.to_be_bytes());
        let err = decode(&buf).unwrap_err();
        assert_eq!(err.field(), Some(KEY_SEQUENCE_NUMBER));
    }

    /// Тест проверяет, что неизвестный тег значения отклоняется.
    #[test]
    fn test_unknown_tag() {
        let mut buf = Vec::new();
        field(&mut buf, KEY_SEQUENCE_NUMBER, 0x7f, &[0u8; 8]);
        let err = decode(&buf).unwrap_err();
        assert!(matches!(err, EnvelopeError::Malformed { .. }));
    }
}
