//! Little endian I/O utilities
//!
//! Readers consume exactly the size of the requested type and bubble up
//! [`std::io::Error`]s (typically [`UnexpectedEof`](std::io::ErrorKind::UnexpectedEof)
//! on truncated input).
//!
//! Writers return the number of bytes produced, which makes it easy to keep track
//! of offsets while serializing structures with alignment requirements.
use std::io::{Read, Write};

/// Single byte `u8` reader
#[inline]
pub fn rdu8<R: Read>(r: &mut R) -> Result<u8, std::io::Error> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

#[inline]
/// Single byte `i8` reader
pub fn rdi8<R: Read>(f: &mut R) -> Result<i8, std::io::Error> {
    let mut buf = [0u8; 1];
    f.read_exact(&mut buf)?;
    Ok(buf[0] as i8)
}

/// Little endian `u16` reader
#[inline]
pub fn rdu16le<R: Read>(r: &mut R) -> Result<u16, std::io::Error> {
    let mut buf = [0u8; 2];
    r.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

#[inline]
/// Little endian `i16` reader
pub fn rdi16le<R: Read>(f: &mut R) -> Result<i16, std::io::Error> {
    let mut buf = [0u8; 2];
    f.read_exact(&mut buf)?;
    Ok(i16::from_le_bytes(buf))
}

/// Little endian `u32` reader
#[inline]
pub fn rdu32le<R: Read>(r: &mut R) -> Result<u32, std::io::Error> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

#[inline]
/// Little endian `i32` reader
pub fn rdi32le<R: Read>(f: &mut R) -> Result<i32, std::io::Error> {
    let mut buf = [0u8; 4];
    f.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

/// Little endian `u64` reader
#[inline]
pub fn rdu64le<R: Read>(r: &mut R) -> Result<u64, std::io::Error> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

#[inline]
/// Little endian `i64` reader
pub fn rdi64le<R: Read>(f: &mut R) -> Result<i64, std::io::Error> {
    let mut buf = [0u8; 8];
    f.read_exact(&mut buf)?;
    Ok(i64::from_le_bytes(buf))
}

#[inline]
/// Little endian `f32` reader
pub fn rdf32le<R: Read>(f: &mut R) -> Result<f32, std::io::Error> {
    let mut buf = [0u8; 4];
    f.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}

#[inline]
/// Little endian `f64` reader
pub fn rdf64le<R: Read>(f: &mut R) -> Result<f64, std::io::Error> {
    let mut buf = [0u8; 8];
    f.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

/// Single byte `u8` writer
#[inline]
pub fn wru8<W: Write>(w: &mut W, v: u8) -> Result<usize, std::io::Error> {
    w.write_all(&[v])?;
    Ok(1)
}

/// Little endian `u16` writer
#[inline]
pub fn wru16le<W: Write>(w: &mut W, v: u16) -> Result<usize, std::io::Error> {
    w.write_all(&v.to_le_bytes())?;
    Ok(2)
}

/// Little endian `i16` writer
#[inline]
pub fn wri16le<W: Write>(w: &mut W, v: i16) -> Result<usize, std::io::Error> {
    w.write_all(&v.to_le_bytes())?;
    Ok(2)
}

/// Little endian `u32` writer
#[inline]
pub fn wru32le<W: Write>(w: &mut W, v: u32) -> Result<usize, std::io::Error> {
    w.write_all(&v.to_le_bytes())?;
    Ok(4)
}

/// Little endian `i32` writer
#[inline]
pub fn wri32le<W: Write>(w: &mut W, v: i32) -> Result<usize, std::io::Error> {
    w.write_all(&v.to_le_bytes())?;
    Ok(4)
}

/// Little endian `u64` writer
#[inline]
pub fn wru64le<W: Write>(w: &mut W, v: u64) -> Result<usize, std::io::Error> {
    w.write_all(&v.to_le_bytes())?;
    Ok(8)
}

/// Little endian `i64` writer
#[inline]
pub fn wri64le<W: Write>(w: &mut W, v: i64) -> Result<usize, std::io::Error> {
    w.write_all(&v.to_le_bytes())?;
    Ok(8)
}

/// Little endian `f32` writer
#[inline]
pub fn wrf32le<W: Write>(w: &mut W, v: f32) -> Result<usize, std::io::Error> {
    w.write_all(&v.to_le_bytes())?;
    Ok(4)
}

/// Little endian `f64` writer
#[inline]
pub fn wrf64le<W: Write>(w: &mut W, v: f64) -> Result<usize, std::io::Error> {
    w.write_all(&v.to_le_bytes())?;
    Ok(8)
}

/// Returns the number of bytes needed to bring `len` to a multiple of 4
#[inline]
pub fn padlen4(len: usize) -> usize {
    (4 - (len & 3)) & 3
}

/// Writes the zero padding needed to bring `len` to a multiple of 4
///
/// Returns the number of padding bytes written
pub fn wrpad4<W: Write>(w: &mut W, len: usize) -> Result<usize, std::io::Error> {
    let pad = padlen4(len);
    w.write_all(&[0u8; 3][0..pad])?;
    Ok(pad)
}
