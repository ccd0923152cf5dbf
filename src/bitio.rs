//! Bit-level framing over byte streams.
//!
//! Both directions pack bits most-significant first. The writer hands each
//! byte to the sink as soon as its eighth bit lands; the reader pulls a new
//! byte from the source only once every bit of the previous one is spent.
//! Each run owns its own writer or reader, so nothing is shared between runs.

use std::io::{self, Read, Write};

/// MSB-first bit writer over a byte sink.
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    inner: W,
    current: u8,
    filled: u8,
    bytes_written: u64,
}

impl<W: Write> BitWriter<W> {
    /// Create a writer with an empty pending byte.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            current: 0,
            filled: 0,
            bytes_written: 0,
        }
    }

    /// Append one bit, emitting the pending byte once it is complete.
    pub fn write_bit(&mut self, bit: bool) -> io::Result<()> {
        if bit {
            self.current |= 0x80 >> self.filled;
        }
        self.filled += 1;

        if self.filled == 8 {
            self.inner.write_all(&[self.current])?;
            self.bytes_written += 1;
            self.current = 0;
            self.filled = 0;
        }
        Ok(())
    }

    /// Append eight bits of `byte`, most significant first.
    pub fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        for shift in (0..8).rev() {
            self.write_bit((byte >> shift) & 1 == 1)?;
        }
        Ok(())
    }

    /// Append a sequence of bits in order.
    pub fn write_bits<I>(&mut self, bits: I) -> io::Result<()>
    where
        I: IntoIterator<Item = bool>,
    {
        for bit in bits {
            self.write_bit(bit)?;
        }
        Ok(())
    }

    /// Number of bits still missing from the pending byte (0 when aligned).
    pub fn padding_needed(&self) -> u8 {
        (8 - self.filled) % 8
    }

    /// Fill the pending byte with zero bits up to the next byte boundary.
    pub fn flush_padding(&mut self) -> io::Result<()> {
        while self.filled != 0 {
            self.write_bit(false)?;
        }
        Ok(())
    }

    /// Whole bytes handed to the sink so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Bits written so far, including the ones still pending.
    pub fn bits_written(&self) -> u64 {
        self.bytes_written * 8 + u64::from(self.filled)
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    /// Borrow the underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Recover the sink. Pending bits that were never padded are dropped.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// MSB-first bit reader over a byte source.
#[derive(Debug)]
pub struct BitReader<R: Read> {
    inner: R,
    current: u8,
    remaining: u8,
    bytes_read: u64,
}

impl<R: Read> BitReader<R> {
    /// Create a reader; nothing is pulled from `inner` until the first bit is requested.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            current: 0,
            remaining: 0,
            bytes_read: 0,
        }
    }

    /// Read one bit, or `None` once the source is exhausted.
    pub fn read_bit(&mut self) -> io::Result<Option<bool>> {
        if self.remaining == 0 {
            match self.next_byte()? {
                Some(byte) => {
                    self.current = byte;
                    self.remaining = 8;
                    self.bytes_read += 1;
                }
                None => return Ok(None),
            }
        }

        self.remaining -= 1;
        Ok(Some((self.current >> self.remaining) & 1 == 1))
    }

    /// Read eight bits as one byte.
    ///
    /// Returns `None` if the source runs dry before the eighth bit; the bits
    /// consumed up to that point are lost.
    pub fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = 0u8;
        for _ in 0..8 {
            match self.read_bit()? {
                Some(bit) => byte = (byte << 1) | u8::from(bit),
                None => return Ok(None),
            }
        }
        Ok(Some(byte))
    }

    /// Bytes pulled from the source so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Recover the source.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            match self.inner.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}
