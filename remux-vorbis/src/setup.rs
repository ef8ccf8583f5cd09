//! Vorbis setup header decoding.
//!
//! The setup header is one continuous bitstream: codebooks, time-domain
//! placeholders, floors, residues, mappings, and modes are decoded in
//! order with a single shared cursor, and every cross-reference is
//! validated against the counts parsed before it.

use remux_core::{ilog, BitReader};

use crate::codebook::Codebook;
use crate::error::{Result, VorbisError};
use crate::floor::Floor;
use crate::residue::Residue;
use crate::{check_header_prefix, SETUP_TYPE};

/// One channel coupling step of a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CouplingStep {
    /// Magnitude channel number.
    pub magnitude: u32,
    /// Angle channel number.
    pub angle: u32,
}

/// A decoded mapping configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    /// Number of submaps (1..=16).
    pub submaps: u8,
    /// Channel coupling steps.
    pub coupling_steps: Vec<CouplingStep>,
    /// Channel multiplex assignments; empty when there is one submap.
    pub multiplex: Vec<u8>,
    /// Floor number per submap.
    pub submap_floors: Vec<u8>,
    /// Residue number per submap.
    pub submap_residues: Vec<u8>,
}

/// A decoded mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode {
    /// Whether this mode uses the long block size.
    pub block_flag: bool,
    /// Mapping number this mode selects.
    pub mapping: u8,
}

/// The complete decoded setup header.
#[derive(Debug, Clone, PartialEq)]
pub struct SetupHeader {
    /// Entropy codebooks.
    pub codebooks: Vec<Codebook>,
    /// Floor configurations.
    pub floors: Vec<Floor>,
    /// Residue configurations.
    pub residues: Vec<Residue>,
    /// Mapping configurations.
    pub mappings: Vec<Mapping>,
    /// Mode configurations.
    pub modes: Vec<Mode>,
}

impl SetupHeader {
    /// Decode a setup header packet.
    ///
    /// `audio_channels` comes from the identification header and bounds
    /// the coupling and multiplex fields.
    pub fn parse(packet: &[u8], audio_channels: u8) -> Result<Self> {
        check_header_prefix(packet, SETUP_TYPE, "setup")?;
        let mut reader = BitReader::at_byte(packet, 7);

        let codebook_count = reader.read_u8()? as usize + 1;
        let mut codebooks = Vec::with_capacity(codebook_count);
        for _ in 0..codebook_count {
            codebooks.push(Codebook::parse(&mut reader)?);
        }

        // Time-domain transforms are placeholders in Vorbis I: the
        // count is real but every type must be zero.
        let time_count = reader.read_bits(6)? as usize + 1;
        for _ in 0..time_count {
            let time_type = reader.read_u16()?;
            if time_type != 0 {
                return Err(VorbisError::BadTimeType(time_type));
            }
        }

        let floor_count = reader.read_bits(6)? as usize + 1;
        let mut floors = Vec::with_capacity(floor_count);
        for _ in 0..floor_count {
            let floor_type = reader.read_u16()?;
            let floor = match floor_type {
                0 => Floor::Type0(crate::floor::Floor0::parse(&mut reader, codebook_count)?),
                1 => Floor::Type1(crate::floor::Floor1::parse(&mut reader, codebook_count)?),
                other => return Err(VorbisError::BadFloorType(other)),
            };
            floors.push(floor);
        }

        let residue_count = reader.read_bits(6)? as usize + 1;
        let mut residues = Vec::with_capacity(residue_count);
        for _ in 0..residue_count {
            residues.push(Residue::parse(&mut reader, codebook_count)?);
        }

        let mapping_count = reader.read_bits(6)? as usize + 1;
        let mut mappings = Vec::with_capacity(mapping_count);
        for _ in 0..mapping_count {
            mappings.push(parse_mapping(
                &mut reader,
                audio_channels,
                floor_count,
                residue_count,
            )?);
        }

        let mode_count = reader.read_bits(6)? as usize + 1;
        let mut modes = Vec::with_capacity(mode_count);
        for _ in 0..mode_count {
            modes.push(parse_mode(&mut reader, mapping_count)?);
        }

        if !reader.read_bool()? {
            return Err(VorbisError::MissingFraming("setup"));
        }

        Ok(Self {
            codebooks,
            floors,
            residues,
            mappings,
            modes,
        })
    }
}

fn parse_mapping(
    reader: &mut BitReader<'_>,
    audio_channels: u8,
    floor_count: usize,
    residue_count: usize,
) -> Result<Mapping> {
    let mapping_type = reader.read_u16()?;
    if mapping_type != 0 {
        return Err(VorbisError::BadMappingType(mapping_type));
    }

    let submaps = if reader.read_bool()? {
        reader.read_bits(4)? as u8 + 1
    } else {
        1
    };

    let mut coupling_steps = Vec::new();
    if reader.read_bool()? {
        let steps = reader.read_u8()? as usize + 1;
        let channel_bits = ilog(u32::from(audio_channels).saturating_sub(1));
        for _ in 0..steps {
            let magnitude = reader.read_bits(channel_bits)?;
            let angle = reader.read_bits(channel_bits)?;
            if magnitude == angle
                || magnitude >= u32::from(audio_channels)
                || angle >= u32::from(audio_channels)
            {
                return Err(VorbisError::BadCouplingChannels { magnitude, angle });
            }
            coupling_steps.push(CouplingStep { magnitude, angle });
        }
    }

    if reader.read_bits(2)? != 0 {
        return Err(VorbisError::BadMappingReserved);
    }

    let mut multiplex = Vec::new();
    if submaps > 1 {
        for _ in 0..audio_channels {
            let mux = reader.read_bits(4)? as u8;
            if mux >= submaps {
                return Err(VorbisError::IndexOutOfRange {
                    table: "mapping multiplex submap",
                    index: mux as usize,
                    limit: submaps as usize,
                });
            }
            multiplex.push(mux);
        }
    }

    let mut submap_floors = Vec::with_capacity(submaps as usize);
    let mut submap_residues = Vec::with_capacity(submaps as usize);
    for _ in 0..submaps {
        // Unused time configuration placeholder.
        reader.read_u8()?;

        let floor = reader.read_u8()?;
        if floor as usize >= floor_count {
            return Err(VorbisError::IndexOutOfRange {
                table: "mapping floor",
                index: floor as usize,
                limit: floor_count,
            });
        }
        submap_floors.push(floor);

        let residue = reader.read_u8()?;
        if residue as usize >= residue_count {
            return Err(VorbisError::IndexOutOfRange {
                table: "mapping residue",
                index: residue as usize,
                limit: residue_count,
            });
        }
        submap_residues.push(residue);
    }

    Ok(Mapping {
        submaps,
        coupling_steps,
        multiplex,
        submap_floors,
        submap_residues,
    })
}

fn parse_mode(reader: &mut BitReader<'_>, mapping_count: usize) -> Result<Mode> {
    let block_flag = reader.read_bool()?;

    let window_type = reader.read_u16()?;
    if window_type != 0 {
        return Err(VorbisError::BadModeField {
            field: "window type",
            value: window_type,
        });
    }
    let transform_type = reader.read_u16()?;
    if transform_type != 0 {
        return Err(VorbisError::BadModeField {
            field: "transform type",
            value: transform_type,
        });
    }

    let mapping = reader.read_u8()?;
    if mapping as usize >= mapping_count {
        return Err(VorbisError::IndexOutOfRange {
            table: "mode mapping",
            index: mapping as usize,
            limit: mapping_count,
        });
    }

    Ok(Mode {
        block_flag,
        mapping,
    })
}
