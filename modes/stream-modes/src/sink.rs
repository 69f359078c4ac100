//! Scatter-gather output destinations.
//!
//! A [`Sink`] is a write cursor over either one contiguous buffer
//! ([`Contiguous`]) or an ordered list of segments ([`Segments`]). The mode
//! engines only talk to the trait, so the representation is chosen once
//! when the caller builds the sink.

use crate::Error;

/// Writable space handed out by [`Sink::reserve`].
///
/// The requested bytes are contiguous in `first` unless they straddle a
/// segment boundary, in which case they continue in `second`.
#[derive(Debug)]
pub struct Spans<'a> {
    /// Bytes at the current write offset.
    pub first: &'a mut [u8],
    /// Continuation at the start of the next non-empty segment.
    pub second: &'a mut [u8],
}

impl Spans<'_> {
    /// Total number of reserved bytes.
    pub fn len(&self) -> usize {
        self.first.len() + self.second.len()
    }

    /// Whether nothing could be reserved.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fill both spans from `src`, which must hold exactly `self.len()` bytes.
    pub fn copy_from_slice(&mut self, src: &[u8]) {
        let (a, b) = src.split_at(self.first.len());
        self.first.copy_from_slice(a);
        self.second.copy_from_slice(b);
    }
}

/// Output cursor over a destination buffer.
pub trait Sink {
    /// Bytes written so far.
    fn position(&self) -> usize;

    /// Free bytes left in the destination.
    fn remaining(&self) -> usize;

    /// Reserve up to `n` bytes at the write offset and advance past them.
    ///
    /// The result spans at most two segments; fewer than `n` bytes are
    /// returned only when the destination is exhausted or `n` reaches past
    /// the segment following the current one.
    fn reserve(&mut self, n: usize) -> Spans<'_>;

    /// Borrow exactly `n` contiguous bytes at the write offset.
    ///
    /// The cursor does not move; call [`advance`][Self::advance] once the
    /// span has been filled.
    fn contiguous(&mut self, n: usize) -> Option<&mut [u8]>;

    /// Move the write offset past `n` bytes without writing them.
    fn advance(&mut self, mut n: usize) {
        while n != 0 {
            let step = self.reserve(n).len();
            if step == 0 {
                break;
            }
            n -= step;
        }
    }

    /// Copy `data` to the write offset.
    fn put(&mut self, mut data: &[u8]) -> Result<(), Error> {
        if data.len() > self.remaining() {
            return Err(Error::OutputTooSmall);
        }
        while !data.is_empty() {
            let mut spans = self.reserve(data.len());
            let n = spans.len();
            if n == 0 {
                return Err(Error::OutputTooSmall);
            }
            spans.copy_from_slice(&data[..n]);
            data = &data[n..];
        }
        Ok(())
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn position(&self) -> usize {
        (**self).position()
    }

    fn remaining(&self) -> usize {
        (**self).remaining()
    }

    fn reserve(&mut self, n: usize) -> Spans<'_> {
        (**self).reserve(n)
    }

    fn contiguous(&mut self, n: usize) -> Option<&mut [u8]> {
        (**self).contiguous(n)
    }

    fn advance(&mut self, n: usize) {
        (**self).advance(n)
    }
}

/// Single contiguous destination buffer.
#[derive(Debug)]
pub struct Contiguous<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Contiguous<'a> {
    /// Write cursor at the start of `buf`.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes written so far.
    pub fn written(&self) -> &[u8] {
        &self.buf[..self.pos]
    }
}

impl Sink for Contiguous<'_> {
    fn position(&self) -> usize {
        self.pos
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn reserve(&mut self, n: usize) -> Spans<'_> {
        let n = n.min(self.remaining());
        let start = self.pos;
        self.pos += n;
        Spans {
            first: &mut self.buf[start..start + n],
            second: Default::default(),
        }
    }

    fn contiguous(&mut self, n: usize) -> Option<&mut [u8]> {
        if n > self.remaining() {
            return None;
        }
        let start = self.pos;
        Some(&mut self.buf[start..start + n])
    }

    fn advance(&mut self, n: usize) {
        self.pos += n.min(self.remaining());
    }
}

/// Ordered list of destination segments.
///
/// Empty segments are skipped. No segment is ever written past its own
/// length.
#[derive(Debug)]
pub struct Segments<'a, 'b> {
    segs: &'a mut [&'b mut [u8]],
    index: usize,
    offset: usize,
    written: usize,
    capacity: usize,
}

impl<'a, 'b> Segments<'a, 'b> {
    /// Write cursor at the start of the first segment.
    pub fn new(segs: &'a mut [&'b mut [u8]]) -> Self {
        let capacity = segs.iter().map(|s| s.len()).sum();
        Self {
            segs,
            index: 0,
            offset: 0,
            written: 0,
            capacity,
        }
    }

    /// Index of the segment holding the write offset.
    pub fn segment(&self) -> usize {
        self.index
    }

    fn skip_full(&mut self) {
        while self.index < self.segs.len() && self.offset == self.segs[self.index].len() {
            self.index += 1;
            self.offset = 0;
        }
    }

    fn next_nonempty(&self, from: usize) -> Option<usize> {
        (from..self.segs.len()).find(|&i| !self.segs[i].is_empty())
    }
}

impl Sink for Segments<'_, '_> {
    fn position(&self) -> usize {
        self.written
    }

    fn remaining(&self) -> usize {
        self.capacity - self.written
    }

    fn reserve(&mut self, n: usize) -> Spans<'_> {
        self.skip_full();
        if n == 0 || self.index == self.segs.len() {
            return Spans {
                first: Default::default(),
                second: Default::default(),
            };
        }

        let index = self.index;
        let start = self.offset;
        let avail = self.segs[index].len() - start;
        if n <= avail {
            self.offset += n;
            self.written += n;
            return Spans {
                first: &mut self.segs[index][start..start + n],
                second: Default::default(),
            };
        }

        match self.next_nonempty(index + 1) {
            Some(next) => {
                let second_len = (n - avail).min(self.segs[next].len());
                self.index = next;
                self.offset = second_len;
                self.written += avail + second_len;
                let (head, tail) = self.segs.split_at_mut(next);
                Spans {
                    first: &mut head[index][start..],
                    second: &mut tail[0][..second_len],
                }
            }
            None => {
                self.offset += avail;
                self.written += avail;
                Spans {
                    first: &mut self.segs[index][start..],
                    second: Default::default(),
                }
            }
        }
    }

    fn contiguous(&mut self, n: usize) -> Option<&mut [u8]> {
        self.skip_full();
        if self.index == self.segs.len() {
            return if n == 0 { Some(Default::default()) } else { None };
        }
        let index = self.index;
        let start = self.offset;
        if self.segs[index].len() - start < n {
            return None;
        }
        Some(&mut self.segs[index][start..start + n])
    }
}
