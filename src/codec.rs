//! Encode and decode drivers.
//!
//! The stream is a bare sequence of units, `code` or `code literal`, where
//! `code` is the current path to a leaf and a literal byte follows only when
//! that leaf is NYT. There is no header and no end marker: decoding stops the
//! moment the source runs dry, even in the middle of a code.

use std::io::{self, Read, Write};

use tracing::debug;

use crate::bitio::{BitReader, BitWriter};
use crate::error::Result;
use crate::tree::{Symbol, Tree};

/// How the encoder fills the last partial byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Padding {
    /// Leading bits of the current NYT code, then zeros.
    ///
    /// A decoder can only run out of input inside the NYT descent or inside
    /// the literal that would follow it, so it never decodes a phantom symbol.
    #[default]
    NytPrefix,
    /// Plain zero bits.
    ///
    /// Byte-identical to the classic encoder, but zeros can complete a real
    /// code and make the decoder emit one extra symbol.
    Zero,
}

/// Encoder settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Fill of the final byte.
    pub padding: Padding,
}

impl EncoderConfig {
    /// Default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the padding strategy.
    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }
}

/// Byte counts of a finished run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// Plain bytes: consumed by the encoder, produced by the decoder.
    pub uncoded_size: u64,
    /// Coded bytes: produced by the encoder, consumed by the decoder.
    pub coded_size: u64,
}

impl Summary {
    /// Write the two counts as a plain-text log.
    pub fn write_log<W: Write>(&self, mut w: W) -> io::Result<()> {
        writeln!(w, "uncodedSize = {}", self.uncoded_size)?;
        writeln!(w, "codedSize = {}", self.coded_size)
    }
}

/// One-pass adaptive Huffman encoder.
#[derive(Debug)]
pub struct Encoder<W: Write> {
    tree: Tree,
    writer: BitWriter<W>,
    config: EncoderConfig,
    uncoded_size: u64,
}

impl<W: Write> Encoder<W> {
    /// Create an encoder with default settings.
    pub fn new(sink: W) -> Self {
        Self::with_config(sink, EncoderConfig::default())
    }

    /// Create an encoder with explicit settings.
    pub fn with_config(sink: W, config: EncoderConfig) -> Self {
        Self {
            tree: Tree::new(),
            writer: BitWriter::new(sink),
            config,
            uncoded_size: 0,
        }
    }

    /// Encode one byte and update the tree.
    pub fn encode_byte(&mut self, byte: u8) -> Result<()> {
        self.uncoded_size += 1;
        match self.tree.find_by_symbol(byte) {
            Some(leaf) => {
                self.writer.write_bits(self.tree.path_of(leaf))?;
                self.tree.rebalance(leaf);
            }
            None => {
                self.writer.write_bits(self.tree.path_of(self.tree.nyt()))?;
                self.writer.write_byte(byte)?;
                self.tree.insert_new_symbol(byte)?;
            }
        }
        Ok(())
    }

    /// Encode every byte of `data`.
    pub fn encode_all(&mut self, data: &[u8]) -> Result<()> {
        for &byte in data {
            self.encode_byte(byte)?;
        }
        Ok(())
    }

    /// Current tree.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Pad to a byte boundary, flush the sink and return it with the run summary.
    pub fn finish(mut self) -> Result<(W, Summary)> {
        let gap = usize::from(self.writer.padding_needed());
        if gap > 0 && self.config.padding == Padding::NytPrefix {
            let nyt = self.tree.path_of(self.tree.nyt());
            self.writer.write_bits(nyt.into_iter().take(gap))?;
        }
        self.writer.flush_padding()?;
        self.writer.flush()?;

        let summary = Summary {
            uncoded_size: self.uncoded_size,
            coded_size: self.writer.bytes_written(),
        };
        debug!(
            uncoded = summary.uncoded_size,
            coded = summary.coded_size,
            nodes = self.tree.node_count(),
            "encoding finished"
        );
        Ok((self.writer.into_inner(), summary))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Literal,
    Code,
}

/// One-pass adaptive Huffman decoder.
///
/// Also an iterator over decoded bytes.
#[derive(Debug)]
pub struct Decoder<R: Read> {
    tree: Tree,
    reader: BitReader<R>,
    mode: Mode,
    uncoded_size: u64,
}

impl<R: Read> Decoder<R> {
    /// Create a decoder. The first unit of any stream is a bare literal.
    pub fn new(source: R) -> Self {
        Self {
            tree: Tree::new(),
            reader: BitReader::new(source),
            mode: Mode::Literal,
            uncoded_size: 0,
        }
    }

    /// Decode the next byte, or `None` once the source is exhausted.
    ///
    /// # Errors
    /// I/O failures of the source, or `DuplicateLiteral` on a corrupt stream.
    pub fn decode_byte(&mut self) -> Result<Option<u8>> {
        loop {
            match self.mode {
                Mode::Literal => {
                    let Some(byte) = self.reader.read_byte()? else {
                        return Ok(None);
                    };
                    self.tree.insert_new_symbol(byte)?;
                    self.mode = Mode::Code;
                    self.uncoded_size += 1;
                    return Ok(Some(byte));
                }
                Mode::Code => {
                    let mut node = self.tree.root();
                    while let Some(children) = self.tree.node(node).children() {
                        let Some(bit) = self.reader.read_bit()? else {
                            return Ok(None);
                        };
                        node = children[usize::from(bit)];
                    }

                    match self.tree.node(node).symbol() {
                        Symbol::Nyt => self.mode = Mode::Literal,
                        Symbol::Byte(byte) => {
                            self.tree.rebalance(node);
                            self.uncoded_size += 1;
                            return Ok(Some(byte));
                        }
                        Symbol::Internal => unreachable!("descent ends at a leaf"),
                    }
                }
            }
        }
    }

    /// Current tree.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Counts so far.
    pub fn summary(&self) -> Summary {
        Summary {
            uncoded_size: self.uncoded_size,
            coded_size: self.reader.bytes_read(),
        }
    }

    /// Recover the source.
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }
}

impl<R: Read> Iterator for Decoder<R> {
    type Item = Result<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        self.decode_byte().transpose()
    }
}

/// Encode all of `source` into `sink` with default settings.
///
/// Bytes are read one at a time; wrap unbuffered sources in a `BufReader`.
pub fn encode<R: Read, W: Write>(source: R, sink: W) -> Result<Summary> {
    encode_with_config(source, sink, EncoderConfig::default())
}

/// Encode all of `source` into `sink`.
pub fn encode_with_config<R: Read, W: Write>(
    source: R,
    sink: W,
    config: EncoderConfig,
) -> Result<Summary> {
    let mut encoder = Encoder::with_config(sink, config);
    for byte in source.bytes() {
        encoder.encode_byte(byte?)?;
    }
    let (_, summary) = encoder.finish()?;
    Ok(summary)
}

/// Decode all of `source` into `sink`.
pub fn decode<R: Read, W: Write>(source: R, mut sink: W) -> Result<Summary> {
    let mut decoder = Decoder::new(source);
    while let Some(byte) = decoder.decode_byte()? {
        sink.write_all(&[byte])?;
    }
    sink.flush()?;

    let summary = decoder.summary();
    debug!(
        uncoded = summary.uncoded_size,
        coded = summary.coded_size,
        nodes = decoder.tree().node_count(),
        "decoding finished"
    );
    Ok(summary)
}

/// Encode a buffer in memory.
pub fn encode_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = Encoder::new(Vec::with_capacity(data.len()));
    encoder.encode_all(data)?;
    let (out, _) = encoder.finish()?;
    Ok(out)
}

/// Decode a buffer in memory.
pub fn decode_bytes(data: &[u8]) -> Result<Vec<u8>> {
    Decoder::new(data).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::tree::MAX_NODES;

    fn encode_zero_padded(data: &[u8]) -> Vec<u8> {
        let config = EncoderConfig::new().with_padding(Padding::Zero);
        let mut encoder = Encoder::with_config(Vec::new(), config);
        encoder.encode_all(data).unwrap();
        encoder.finish().unwrap().0
    }

    #[test]
    fn test_empty_input() {
        let mut out = Vec::new();
        let summary = encode(&b""[..], &mut out).unwrap();
        assert!(out.is_empty());
        assert_eq!(summary, Summary::default());

        assert_eq!(decode_bytes(&[]).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_single_symbol_is_bare_literal() {
        assert_eq!(encode_bytes(b"A").unwrap(), vec![0x41]);
        assert_eq!(decode_bytes(&[0x41]).unwrap(), b"A".to_vec());
    }

    #[test]
    fn test_repeats_cost_one_bit() {
        let mut encoder = Encoder::new(Vec::new());
        encoder.encode_byte(0x41).unwrap();
        assert_eq!(encoder.writer.bits_written(), 8);
        encoder.encode_byte(0x41).unwrap();
        assert_eq!(encoder.writer.bits_written(), 9);
        encoder.encode_byte(0x41).unwrap();
        assert_eq!(encoder.writer.bits_written(), 10);

        let (out, summary) = encoder.finish().unwrap();
        // 01000001 1 1 + padding
        assert_eq!(out, vec![0x41, 0xC0]);
        assert_eq!(summary.uncoded_size, 3);
        assert_eq!(summary.coded_size, 2);
        assert_eq!(decode_bytes(&out).unwrap(), b"AAA".to_vec());
    }

    #[test]
    fn test_zero_padding_matches_classic_output() {
        assert_eq!(encode_zero_padded(b"aab"), vec![0x61, 0x98, 0x80]);
        assert_eq!(
            encode_zero_padded(b"abracadabra"),
            vec![0x61, 0x31, 0x0E, 0x48, 0xC6, 0xC6, 0x46, 0xC0]
        );
    }

    #[test]
    fn test_zero_padding_can_complete_a_code() {
        let zero = encode_zero_padded(b"abacc");
        assert_eq!(zero, vec![0x61, 0x31, 0x46, 0x32]);
        // The single padding bit reaches the leaf of `a`.
        assert_eq!(decode_bytes(&zero).unwrap(), b"abacca".to_vec());

        let nyt = encode_bytes(b"abacc").unwrap();
        assert_eq!(nyt, vec![0x61, 0x31, 0x46, 0x33]);
        assert_eq!(decode_bytes(&nyt).unwrap(), b"abacc".to_vec());
    }

    #[test]
    fn test_nyt_padding_roundtrips_text() {
        let input = b"abracadabra";
        let out = encode_bytes(input).unwrap();
        assert_eq!(out, vec![0x61, 0x31, 0x0E, 0x48, 0xC6, 0xC6, 0x46, 0xC8]);
        assert_eq!(decode_bytes(&out).unwrap(), input.to_vec());
    }

    #[test]
    fn test_full_alphabet() {
        let input: Vec<u8> = (0..=255u8).collect();
        let mut encoder = Encoder::new(Vec::new());
        encoder.encode_all(&input).unwrap();
        assert_eq!(encoder.tree().node_count(), MAX_NODES);
        let (out, _) = encoder.finish().unwrap();

        let mut decoder = Decoder::new(&out[..]);
        let decoded: Vec<u8> = decoder.by_ref().collect::<Result<_>>().unwrap();
        assert_eq!(decoded, input);
        assert_eq!(decoder.tree().node_count(), MAX_NODES);
    }

    #[test]
    fn test_decoder_summary_counts_bytes() {
        let input = b"mississippi river";
        let mut coded = Vec::new();
        let enc = encode(&input[..], &mut coded).unwrap();
        assert_eq!(enc.uncoded_size, input.len() as u64);
        assert_eq!(enc.coded_size, coded.len() as u64);

        let mut plain = Vec::new();
        let dec = decode(&coded[..], &mut plain).unwrap();
        assert_eq!(plain, input.to_vec());
        assert_eq!(dec.uncoded_size, input.len() as u64);
        assert_eq!(dec.coded_size, coded.len() as u64);
    }

    #[test]
    fn test_duplicate_literal_is_rejected() {
        // literal 'a', NYT code "0", literal 'a' again
        let stream = [0x61, 0x30, 0x80];
        let mut decoder = Decoder::new(&stream[..]);
        assert_eq!(decoder.decode_byte().unwrap(), Some(b'a'));
        assert!(matches!(
            decoder.decode_byte(),
            Err(Error::DuplicateLiteral(b'a'))
        ));
    }

    #[test]
    fn test_truncated_stream_stops_cleanly() {
        let out = encode_bytes(b"hello, adaptive world").unwrap();
        for cut in 0..out.len() {
            let decoded = decode_bytes(&out[..cut]).unwrap();
            assert!(b"hello, adaptive world".starts_with(&decoded));
        }
    }

    #[test]
    fn test_summary_log_format() {
        let summary = Summary {
            uncoded_size: 12,
            coded_size: 7,
        };
        let mut log = Vec::new();
        summary.write_log(&mut log).unwrap();
        assert_eq!(log, b"uncodedSize = 12\ncodedSize = 7\n".to_vec());
    }
}
