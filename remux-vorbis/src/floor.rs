//! Vorbis floor configurations (spectral envelope).

use std::collections::HashSet;

use remux_core::BitReader;

use crate::error::{Result, VorbisError};

/// A decoded floor configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Floor {
    /// LSP-based floor (type 0).
    Type0(Floor0),
    /// Piecewise-linear floor (type 1).
    Type1(Floor1),
}

/// Floor type 0 configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Floor0 {
    /// LPC order.
    pub order: u8,
    /// Synthesis rate.
    pub rate: u16,
    /// Bark map size.
    pub bark_map_size: u16,
    /// Amplitude field width in bits.
    pub amplitude_bits: u8,
    /// Amplitude offset.
    pub amplitude_offset: u8,
    /// Codebook numbers used by this floor.
    pub book_list: Vec<u8>,
}

impl Floor0 {
    /// Decode a type 0 floor at the reader's current position.
    pub fn parse(reader: &mut BitReader<'_>, codebook_count: usize) -> Result<Self> {
        let order = reader.read_u8()?;
        let rate = reader.read_u16()?;
        let bark_map_size = reader.read_u16()?;
        let amplitude_bits = reader.read_bits(6)? as u8;
        let amplitude_offset = reader.read_u8()?;
        let number_of_books = reader.read_bits(4)? as usize + 1;

        let mut book_list = Vec::with_capacity(number_of_books);
        for _ in 0..number_of_books {
            let book = reader.read_u8()?;
            if book as usize >= codebook_count {
                return Err(VorbisError::IndexOutOfRange {
                    table: "floor0 book",
                    index: book as usize,
                    limit: codebook_count,
                });
            }
            book_list.push(book);
        }

        Ok(Self {
            order,
            rate,
            bark_map_size,
            amplitude_bits,
            amplitude_offset,
            book_list,
        })
    }
}

/// Floor type 1 configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Floor1 {
    /// Class number per partition.
    pub partition_class_list: Vec<u8>,
    /// Dimensions per class.
    pub class_dimensions: Vec<u8>,
    /// Subclass bits per class.
    pub class_subclasses: Vec<u8>,
    /// Master codebook per class; `None` for classes without
    /// subclasses.
    pub class_masterbooks: Vec<Option<u8>>,
    /// Subclass codebooks per class; `None` marks an unused slot.
    pub subclass_books: Vec<Vec<Option<u8>>>,
    /// Amplitude multiplier (1..=4).
    pub multiplier: u8,
    /// Bits per X-list element.
    pub rangebits: u8,
    /// Sorted-unique X coordinates of the floor curve.
    pub x_list: Vec<u32>,
}

impl Floor1 {
    /// Decode a type 1 floor at the reader's current position.
    pub fn parse(reader: &mut BitReader<'_>, codebook_count: usize) -> Result<Self> {
        let partitions = reader.read_bits(5)? as usize;

        let mut partition_class_list = Vec::with_capacity(partitions);
        for _ in 0..partitions {
            partition_class_list.push(reader.read_bits(4)? as u8);
        }

        let classes = partition_class_list
            .iter()
            .max()
            .map(|&m| m as usize + 1)
            .unwrap_or(0);

        let mut class_dimensions = Vec::with_capacity(classes);
        let mut class_subclasses = Vec::with_capacity(classes);
        let mut class_masterbooks = Vec::with_capacity(classes);
        let mut subclass_books = Vec::with_capacity(classes);

        for _ in 0..classes {
            let dimensions = reader.read_bits(3)? as u8 + 1;
            let subclasses = reader.read_bits(2)? as u8;

            let masterbook = if subclasses > 0 {
                let book = reader.read_u8()?;
                if book as usize >= codebook_count {
                    return Err(VorbisError::IndexOutOfRange {
                        table: "floor1 masterbook",
                        index: book as usize,
                        limit: codebook_count,
                    });
                }
                Some(book)
            } else {
                None
            };

            let mut books = Vec::with_capacity(1 << subclasses);
            for _ in 0..(1usize << subclasses) {
                // Stored biased by one; zero marks an unused slot.
                let raw = reader.read_u8()?;
                let book = raw.checked_sub(1);
                if let Some(book) = book {
                    if book as usize >= codebook_count {
                        return Err(VorbisError::IndexOutOfRange {
                            table: "floor1 subclass book",
                            index: book as usize,
                            limit: codebook_count,
                        });
                    }
                }
                books.push(book);
            }

            class_dimensions.push(dimensions);
            class_subclasses.push(subclasses);
            class_masterbooks.push(masterbook);
            subclass_books.push(books);
        }

        let multiplier = reader.read_bits(2)? as u8 + 1;
        let rangebits = reader.read_bits(4)? as u8;

        let mut x_list = vec![0u32, 1u32 << rangebits];
        for &class in &partition_class_list {
            for _ in 0..class_dimensions[class as usize] {
                x_list.push(reader.read_bits(rangebits)?);
            }
        }

        let unique: HashSet<u32> = x_list.iter().copied().collect();
        if unique.len() != x_list.len() {
            return Err(VorbisError::NonUniqueFloorXList);
        }
        if x_list.len() > 65 {
            return Err(VorbisError::FloorXListTooLong(x_list.len()));
        }

        Ok(Self {
            partition_class_list,
            class_dimensions,
            class_subclasses,
            class_masterbooks,
            subclass_books,
            multiplier,
            rangebits,
            x_list,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remux_core::BitWriter;

    #[test]
    fn test_floor0_parse() {
        let mut writer = BitWriter::new();
        writer.write_bits(8, 8); // order
        writer.write_bits(44_100 & 0xFFFF, 16); // rate
        writer.write_bits(256, 16); // bark map size
        writer.write_bits(6, 6); // amplitude bits
        writer.write_bits(10, 8); // amplitude offset
        writer.write_bits(1, 4); // 2 books
        writer.write_bits(0, 8);
        writer.write_bits(1, 8);

        let data = writer.into_data();
        let mut reader = BitReader::new(&data);
        let floor = Floor0::parse(&mut reader, 2).unwrap();
        assert_eq!(floor.order, 8);
        assert_eq!(floor.book_list, vec![0, 1]);
    }

    #[test]
    fn test_floor0_book_out_of_range() {
        let mut writer = BitWriter::new();
        writer.write_bits(8, 8);
        writer.write_bits(0, 16);
        writer.write_bits(0, 16);
        writer.write_bits(0, 6);
        writer.write_bits(0, 8);
        writer.write_bits(0, 4); // 1 book
        writer.write_bits(5, 8); // book 5 of 2

        let data = writer.into_data();
        let mut reader = BitReader::new(&data);
        let err = Floor0::parse(&mut reader, 2).unwrap_err();
        assert!(matches!(
            err,
            VorbisError::IndexOutOfRange {
                table: "floor0 book",
                index: 5,
                limit: 2
            }
        ));
    }

    fn write_simple_floor1(writer: &mut BitWriter, xs: &[u32]) {
        writer.write_bits(1, 5); // 1 partition
        writer.write_bits(0, 4); // class 0
        writer.write_bits(xs.len() as u32 - 1, 3); // class dimensions
        writer.write_bits(0, 2); // no subclasses
        writer.write_bits(0, 8); // one subclass book slot, unused
        writer.write_bits(0, 2); // multiplier 1
        writer.write_bits(4, 4); // rangebits 4
        for &x in xs {
            writer.write_bits(x, 4);
        }
    }

    #[test]
    fn test_floor1_parse() {
        let mut writer = BitWriter::new();
        write_simple_floor1(&mut writer, &[3, 7, 12]);
        let data = writer.into_data();
        let mut reader = BitReader::new(&data);

        let floor = Floor1::parse(&mut reader, 1).unwrap();
        assert_eq!(floor.partition_class_list, vec![0]);
        assert_eq!(floor.class_dimensions, vec![3]);
        assert_eq!(floor.class_masterbooks, vec![None]);
        assert_eq!(floor.subclass_books, vec![vec![None]]);
        assert_eq!(floor.x_list, vec![0, 16, 3, 7, 12]);
    }

    #[test]
    fn test_floor1_duplicate_x_rejected() {
        let mut writer = BitWriter::new();
        write_simple_floor1(&mut writer, &[3, 3, 12]);
        let data = writer.into_data();
        let mut reader = BitReader::new(&data);
        assert!(matches!(
            Floor1::parse(&mut reader, 1),
            Err(VorbisError::NonUniqueFloorXList)
        ));
    }

    #[test]
    fn test_floor1_zero_partitions() {
        let mut writer = BitWriter::new();
        writer.write_bits(0, 5); // no partitions, no classes
        writer.write_bits(0, 2); // multiplier 1
        writer.write_bits(6, 4); // rangebits
        let data = writer.into_data();
        let mut reader = BitReader::new(&data);

        let floor = Floor1::parse(&mut reader, 1).unwrap();
        assert!(floor.partition_class_list.is_empty());
        assert_eq!(floor.x_list, vec![0, 64]);
    }
}
