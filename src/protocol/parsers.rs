extern crate nom;

use nom::{
    bytes::complete::take,
    error::{Error, ErrorKind},
    number::complete::{le_f32, le_i32},
    Err, IResult,
};

use super::types::{FieldKind, FieldSpec, FieldValue};

pub fn parse_int32(input: &[u8]) -> IResult<&[u8], i32> {
    le_i32(input)
}

pub fn parse_float32(input: &[u8]) -> IResult<&[u8], f32> {
    le_f32(input)
}

/// Reads an `i32` byte count followed by exactly that many bytes.
///
/// A negative count fails with `ErrorKind::Verify`, a count larger than the
/// remaining input with `ErrorKind::TooLarge`. Both are `Err::Failure` and
/// point at the length prefix.
pub fn parse_blob(input: &[u8]) -> IResult<&[u8], &[u8]> {
    let (rest, length) = le_i32(input)?;
    if length < 0 {
        return Err(Err::Failure(Error::new(input, ErrorKind::Verify)));
    }
    let length = length as usize;
    if length > rest.len() {
        return Err(Err::Failure(Error::new(input, ErrorKind::TooLarge)));
    }
    take(length)(rest)
}

pub fn parse_field(kind: FieldKind, input: &[u8]) -> IResult<&[u8], FieldValue> {
    match kind {
        FieldKind::Int32 => {
            let (input, value) = parse_int32(input)?;
            Ok((input, FieldValue::Int32(value)))
        }
        FieldKind::Float32 => {
            let (input, value) = parse_float32(input)?;
            Ok((input, FieldValue::Float32(value)))
        }
        FieldKind::Blob => {
            let (input, bytes) = parse_blob(input)?;
            Ok((input, FieldValue::Blob(bytes.to_vec())))
        }
    }
}

/// Parses a whole payload, one field per spec, in declared order.
pub fn parse_fields<'a>(
    specs: &[FieldSpec],
    mut input: &'a [u8],
) -> IResult<&'a [u8], Vec<FieldValue>> {
    let mut values = Vec::with_capacity(specs.len());
    for spec in specs {
        let (rest, value) = parse_field(spec.kind, input)?;
        values.push(value);
        input = rest;
    }

    Ok((input, values))
}
