//! Vorbis setup-header codebooks.
//!
//! A codebook declares its codeword lengths and, optionally, a vector
//! lookup table used for vector quantization. Only the header structure
//! is decoded here; Huffman trees are the concern of a sample decoder.

use remux_core::{ilog, BitReader};

use crate::error::{Result, VorbisError};

/// 24-bit sync pattern at the start of every codebook.
pub const CODEBOOK_SYNC: u32 = 0x56_43_42;

/// Value-lookup table attached to a codebook.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupTable {
    /// Minimum value, unpacked from the 32-bit Vorbis float format.
    pub minimum_value: f64,
    /// Delta value, unpacked from the 32-bit Vorbis float format.
    pub delta_value: f64,
    /// Bits per multiplicand.
    pub value_bits: u8,
    /// Whether lookup values accumulate across dimensions.
    pub sequence_p: bool,
    /// Quantized multiplicand values.
    pub multiplicands: Vec<u32>,
}

/// How a codebook maps entries to vector values.
#[derive(Debug, Clone, PartialEq)]
pub enum CodebookLookup {
    /// No vector lookup; the codebook is scalar.
    None,
    /// Implicitly populated lookup table (lattice VQ).
    Implicit(LookupTable),
    /// Explicitly populated lookup table (tessellated VQ).
    Explicit(LookupTable),
}

/// One decoded codebook.
#[derive(Debug, Clone, PartialEq)]
pub struct Codebook {
    /// Number of dimensions per vector.
    pub dimensions: u16,
    /// Number of codebook entries.
    pub entries: u32,
    /// Codeword length per entry in bits; 0 marks an unused sparse
    /// entry.
    pub codeword_lengths: Vec<u8>,
    /// Vector lookup configuration.
    pub lookup: CodebookLookup,
}

impl Codebook {
    /// Decode one codebook at the reader's current position.
    pub fn parse(reader: &mut BitReader<'_>) -> Result<Self> {
        let sync = reader.read_bits(24)?;
        if sync != CODEBOOK_SYNC {
            return Err(VorbisError::BadCodebookSync(sync));
        }

        let dimensions = reader.read_u16()?;
        let entries = reader.read_bits(24)?;
        let ordered = reader.read_bool()?;

        let mut codeword_lengths = vec![0u8; entries as usize];

        if ordered {
            let mut current_entry = 0u32;
            let mut current_length = reader.read_bits(5)? as u8 + 1;

            while current_entry < entries {
                let number = reader.read_bits(ilog(entries - current_entry))?;
                if current_entry + number > entries {
                    return Err(VorbisError::CodewordOverflow { entries });
                }
                for length in
                    &mut codeword_lengths[current_entry as usize..(current_entry + number) as usize]
                {
                    *length = current_length;
                }
                current_entry += number;
                current_length += 1;
            }
        } else {
            let sparse = reader.read_bool()?;
            for length in &mut codeword_lengths {
                if sparse && !reader.read_bool()? {
                    continue; // unused entry
                }
                *length = reader.read_bits(5)? as u8 + 1;
            }
        }

        let lookup_type = reader.read_bits(4)? as u8;
        let lookup = match lookup_type {
            0 => CodebookLookup::None,
            1 | 2 => {
                let minimum_value = float32_unpack(reader.read_u32()?);
                let delta_value = float32_unpack(reader.read_u32()?);
                let value_bits = reader.read_bits(4)? as u8 + 1;
                let sequence_p = reader.read_bool()?;

                // entries * dimensions can exceed u32; oversized
                // tables fail on the first short read.
                let lookup_values: u64 = if lookup_type == 1 {
                    u64::from(lookup1_values(entries, dimensions))
                } else {
                    u64::from(entries) * u64::from(dimensions)
                };

                let mut multiplicands = Vec::new();
                for _ in 0..lookup_values {
                    multiplicands.push(reader.read_bits(value_bits)?);
                }

                let table = LookupTable {
                    minimum_value,
                    delta_value,
                    value_bits,
                    sequence_p,
                    multiplicands,
                };
                if lookup_type == 1 {
                    CodebookLookup::Implicit(table)
                } else {
                    CodebookLookup::Explicit(table)
                }
            }
            other => return Err(VorbisError::BadLookupType(other)),
        };

        Ok(Self {
            dimensions,
            entries,
            codeword_lengths,
            lookup,
        })
    }
}

/// Unpack the 32-bit Vorbis float format: 1 sign bit, 10-bit exponent
/// biased by 788, 21-bit integer mantissa.
pub fn float32_unpack(x: u32) -> f64 {
    let mantissa = (x & 0x1F_FFFF) as f64;
    let exponent = ((x & 0x7FE0_0000) >> 21) as i32;
    let signed = if x & 0x8000_0000 != 0 {
        -mantissa
    } else {
        mantissa
    };
    signed * 2f64.powi(exponent - 788)
}

/// Largest integer `v` such that `v.pow(dimensions) <= entries`, the
/// size of an implicitly populated lookup table.
pub fn lookup1_values(entries: u32, dimensions: u16) -> u32 {
    let mut low = 1u32;
    let mut high = entries;

    while low < high {
        let mid = (low + high + 1) / 2;
        if pow_at_most(mid, dimensions, entries) {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    low
}

fn pow_at_most(base: u32, exponent: u16, limit: u32) -> bool {
    let mut acc: u64 = 1;
    for _ in 0..exponent {
        acc = acc.saturating_mul(u64::from(base));
        if acc > u64::from(limit) {
            return false;
        }
    }
    true
}
