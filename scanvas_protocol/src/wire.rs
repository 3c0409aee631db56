// Copyright 2026 the Scanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Little-endian field access.

use alloc::vec::Vec;

use scanvas_core::color::Color;
use scanvas_core::geometry::Point;
use scanvas_core::scene::{PrimitiveFlags, PrimitiveId};

/// Sequential reader over a command buffer.
#[derive(Debug)]
pub(crate) struct Fields<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Fields<'a> {
    /// Reads from `data`, starting at `pos`.
    pub(crate) fn at(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub(crate) fn u8(&mut self) -> Option<u8> {
        let v = *self.data.get(self.pos)?;
        self.pos += 1;
        Some(v)
    }

    pub(crate) fn u16(&mut self) -> Option<u16> {
        if self.remaining() < 2 {
            return None;
        }
        let v = u16::from_le_bytes(self.data[self.pos..self.pos + 2].try_into().ok()?);
        self.pos += 2;
        Some(v)
    }

    pub(crate) fn i16(&mut self) -> Option<i32> {
        if self.remaining() < 2 {
            return None;
        }
        let v = i16::from_le_bytes(self.data[self.pos..self.pos + 2].try_into().ok()?);
        self.pos += 2;
        Some(i32::from(v))
    }

    pub(crate) fn id(&mut self) -> Option<PrimitiveId> {
        self.u16().map(PrimitiveId)
    }

    pub(crate) fn flags(&mut self) -> Option<PrimitiveFlags> {
        self.u16().map(PrimitiveFlags::from_wire)
    }

    pub(crate) fn color(&mut self) -> Option<Color> {
        self.u8().map(Color)
    }

    pub(crate) fn point(&mut self) -> Option<Point> {
        Some(Point::new(self.i16()?, self.i16()?))
    }

    pub(crate) fn points(&mut self, n: usize) -> Option<Vec<Point>> {
        (0..n).map(|_| self.point()).collect()
    }

    pub(crate) fn array<const N: usize>(&mut self) -> Option<[u8; N]> {
        if self.remaining() < N {
            return None;
        }
        let v = self.data[self.pos..self.pos + N].try_into().ok()?;
        self.pos += N;
        Some(v)
    }
}

/// Appends fields to an output buffer.
#[derive(Debug)]
pub(crate) struct Writer<'a> {
    out: &'a mut Vec<u8>,
}

impl<'a> Writer<'a> {
    pub(crate) fn new(out: &'a mut Vec<u8>) -> Self {
        Self { out }
    }

    pub(crate) fn u8(&mut self, v: u8) -> &mut Self {
        self.out.push(v);
        self
    }

    pub(crate) fn u16(&mut self, v: u16) -> &mut Self {
        self.out.extend_from_slice(&v.to_le_bytes());
        self
    }

    /// Writes a coordinate, saturating to the `i16` range.
    pub(crate) fn i16(&mut self, v: i32) -> &mut Self {
        let v = i16::try_from(v).unwrap_or(if v < 0 { i16::MIN } else { i16::MAX });
        self.out.extend_from_slice(&v.to_le_bytes());
        self
    }

    /// Writes a count, saturating to the `u16` range.
    pub(crate) fn count(&mut self, n: usize) -> &mut Self {
        self.u16(u16::try_from(n).unwrap_or(u16::MAX))
    }

    pub(crate) fn id(&mut self, id: PrimitiveId) -> &mut Self {
        self.u16(id.0)
    }

    pub(crate) fn flags(&mut self, flags: PrimitiveFlags) -> &mut Self {
        self.u16(flags.bits())
    }

    pub(crate) fn color(&mut self, color: Color) -> &mut Self {
        self.u8(color.0)
    }

    pub(crate) fn point(&mut self, p: Point) -> &mut Self {
        self.i16(p.x).i16(p.y)
    }

    pub(crate) fn points(&mut self, points: &[Point]) -> &mut Self {
        for &p in points {
            self.point(p);
        }
        self
    }

    pub(crate) fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.out.extend_from_slice(bytes);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian() {
        let data = [0xAA, 0x34, 0x12, 0xFE, 0xFF, 7];
        let mut f = Fields::at(&data, 1);
        assert_eq!(f.u16(), Some(0x1234));
        assert_eq!(f.i16(), Some(-2));
        assert_eq!(f.u8(), Some(7));
        assert_eq!(f.u8(), None);
    }

    #[test]
    fn coordinates_saturate() {
        let mut out = Vec::new();
        Writer::new(&mut out).i16(40_000).i16(-40_000);
        assert_eq!(out, [0xFF, 0x7F, 0x00, 0x80]);
    }
}
