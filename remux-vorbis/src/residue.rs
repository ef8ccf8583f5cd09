//! Vorbis residue configurations (residual spectrum coding).

use remux_core::BitReader;

use crate::error::{Result, VorbisError};

/// A decoded residue configuration (types 0, 1, and 2 share a layout).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Residue {
    /// Residue type (0, 1, or 2).
    pub residue_type: u16,
    /// First coded element offset.
    pub begin: u32,
    /// One past the last coded element offset.
    pub end: u32,
    /// Elements per partition.
    pub partition_size: u32,
    /// Number of classifications.
    pub classifications: u8,
    /// Codebook used to decode partition classifications.
    pub classbook: u8,
    /// Cascade bitmap per classification.
    pub cascade: Vec<u8>,
    /// Codebook per classification and pass; `None` marks an unused
    /// pass.
    pub books: Vec<[Option<u8>; 8]>,
}

impl Residue {
    /// Decode one residue at the reader's current position.
    pub fn parse(reader: &mut BitReader<'_>, codebook_count: usize) -> Result<Self> {
        let residue_type = reader.read_u16()?;
        if residue_type > 2 {
            return Err(VorbisError::BadResidueType(residue_type));
        }

        let begin = reader.read_bits(24)?;
        let end = reader.read_bits(24)?;
        let partition_size = reader.read_bits(24)? + 1;
        let classifications = reader.read_bits(6)? as u8 + 1;
        let classbook = reader.read_u8()?;
        if classbook as usize >= codebook_count {
            return Err(VorbisError::IndexOutOfRange {
                table: "residue classbook",
                index: classbook as usize,
                limit: codebook_count,
            });
        }

        let mut cascade = Vec::with_capacity(classifications as usize);
        for _ in 0..classifications {
            let low_bits = reader.read_bits(3)? as u8;
            let high_bits = if reader.read_bool()? {
                reader.read_bits(5)? as u8
            } else {
                0
            };
            cascade.push((high_bits << 3) | low_bits);
        }

        let mut books = Vec::with_capacity(classifications as usize);
        for &bitmap in &cascade {
            let mut row = [None; 8];
            for (pass, slot) in row.iter_mut().enumerate() {
                if bitmap & (1 << pass) != 0 {
                    let book = reader.read_u8()?;
                    if book as usize >= codebook_count {
                        return Err(VorbisError::IndexOutOfRange {
                            table: "residue book",
                            index: book as usize,
                            limit: codebook_count,
                        });
                    }
                    *slot = Some(book);
                }
            }
            books.push(row);
        }

        Ok(Self {
            residue_type,
            begin,
            end,
            partition_size,
            classifications,
            classbook,
            cascade,
            books,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remux_core::BitWriter;

    fn write_residue_header(writer: &mut BitWriter, residue_type: u32, classbook: u32) {
        writer.write_bits(residue_type, 16);
        writer.write_bits(0, 24); // begin
        writer.write_bits(1024, 24); // end
        writer.write_bits(31, 24); // partition size 32
        writer.write_bits(0, 6); // 1 classification
        writer.write_bits(classbook, 8);
    }

    #[test]
    fn test_residue_parse() {
        let mut writer = BitWriter::new();
        write_residue_header(&mut writer, 2, 0);
        // Cascade: low bits 0b101, no high bits.
        writer.write_bits(0b101, 3);
        writer.write_bit(false);
        // Books for passes 0 and 2.
        writer.write_bits(1, 8);
        writer.write_bits(2, 8);

        let data = writer.into_data();
        let mut reader = BitReader::new(&data);
        let residue = Residue::parse(&mut reader, 3).unwrap();

        assert_eq!(residue.residue_type, 2);
        assert_eq!(residue.end, 1024);
        assert_eq!(residue.partition_size, 32);
        assert_eq!(residue.cascade, vec![0b101]);
        assert_eq!(residue.books[0][0], Some(1));
        assert_eq!(residue.books[0][1], None);
        assert_eq!(residue.books[0][2], Some(2));
    }

    #[test]
    fn test_residue_high_bits_cascade() {
        let mut writer = BitWriter::new();
        write_residue_header(&mut writer, 0, 0);
        writer.write_bits(0b010, 3);
        writer.write_bit(true);
        writer.write_bits(0b00001, 5); // high bits 1 -> cascade 0b1010
        writer.write_bits(0, 8); // pass 1 book
        writer.write_bits(0, 8); // pass 3 book

        let data = writer.into_data();
        let mut reader = BitReader::new(&data);
        let residue = Residue::parse(&mut reader, 1).unwrap();
        assert_eq!(residue.cascade, vec![0b1010]);
        assert_eq!(residue.books[0][1], Some(0));
        assert_eq!(residue.books[0][3], Some(0));
    }

    #[test]
    fn test_residue_bad_type() {
        let mut writer = BitWriter::new();
        writer.write_bits(3, 16);
        let data = writer.into_data();
        let mut reader = BitReader::new(&data);
        assert!(matches!(
            Residue::parse(&mut reader, 1),
            Err(VorbisError::BadResidueType(3))
        ));
    }

    #[test]
    fn test_residue_classbook_out_of_range() {
        let mut writer = BitWriter::new();
        write_residue_header(&mut writer, 1, 7);
        let data = writer.into_data();
        let mut reader = BitReader::new(&data);
        assert!(matches!(
            Residue::parse(&mut reader, 4),
            Err(VorbisError::IndexOutOfRange {
                table: "residue classbook",
                index: 7,
                limit: 4
            })
        ));
    }
}
