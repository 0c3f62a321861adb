//! Growable word memory.
//!
//! Memory is logically infinite and zero-initialised. Physically it is a
//! `Vec<Word>` that is extended with zero cells whenever an access lands at or
//! past its current length. Extension is persisted, so reads can grow memory.
//! A cap can be configured; without one, growth is bounded only by `usize`.

use num_traits::{Signed, ToPrimitive};

use crate::error::{Fault, Result};
use crate::{Program, Word};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Memory {
    cells: Vec<Word>,
    limit: Option<usize>,
}

impl Memory {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            cells: Vec::new(),
            limit,
        }
    }

    pub fn from_program(program: &Program, limit: Option<usize>) -> Self {
        Self {
            cells: program.words().to_vec(),
            limit: limit.map(|cap| cap.max(program.len())),
        }
    }

    /// Replace contents with `program`, keeping the allocation.
    pub fn load(&mut self, program: &Program) {
        self.cells.clear();
        self.cells.extend_from_slice(program.words());
        self.limit = self.limit.map(|cap| cap.max(program.len()));
    }

    pub fn read(&mut self, addr: &Word) -> Result<Word> {
        let index = self.address(addr)?;
        self.read_at(index)
    }

    pub fn write(&mut self, addr: &Word, value: Word) -> Result<()> {
        let index = self.address(addr)?;
        self.write_at(index, value)
    }

    /// Read the cell at an already-resolved index.
    pub fn read_at(&mut self, index: usize) -> Result<Word> {
        self.ensure(index)?;
        Ok(self.cells[index].clone())
    }

    pub fn write_at(&mut self, index: usize, value: Word) -> Result<()> {
        self.ensure(index)?;
        self.cells[index] = value;
        Ok(())
    }

    /// Convert a word to a cell index without touching memory.
    ///
    /// Negative words are `InvalidAddress`. Words past the cap, or past what
    /// `usize` can index, are `AddressOutOfRange`.
    pub fn address(&self, addr: &Word) -> Result<usize> {
        if addr.is_negative() {
            return Err(Fault::InvalidAddress {
                address: addr.clone(),
            });
        }
        let limit = self.limit.unwrap_or(usize::MAX);
        match addr.to_usize() {
            Some(index) if index < limit => Ok(index),
            _ => Err(Fault::AddressOutOfRange {
                address: addr.clone(),
                limit,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn as_slice(&self) -> &[Word] {
        &self.cells
    }

    /// Zero-extend so that `index` is in bounds.
    fn ensure(&mut self, index: usize) -> Result<()> {
        if let Some(limit) = self.limit.filter(|&cap| index >= cap) {
            return Err(Fault::AddressOutOfRange {
                address: Word::from(index),
                limit,
            });
        }
        if index >= self.cells.len() {
            self.cells.resize(index + 1, Word::default());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(value: i64) -> Word {
        Word::from(value)
    }

    #[test]
    fn read_past_end_zero_fills() {
        let mut mem = Memory::default();
        assert!(mem.is_empty());
        assert_eq!(mem.read(&word(7)), Ok(word(0)));
        assert_eq!(mem.len(), 8);
        assert!(mem.as_slice().iter().all(|cell| *cell == word(0)));

        // Second read of the same address does not grow further.
        assert_eq!(mem.read(&word(7)), Ok(word(0)));
        assert_eq!(mem.len(), 8);
    }

    #[test]
    fn write_past_end_keeps_existing_cells() {
        let program = Program::from([5i64, 6, 7]);
        let mut mem = Memory::from_program(&program, None);
        mem.write(&word(5), word(42)).unwrap();
        let expected: Vec<Word> = [5, 6, 7, 0, 0, 42].into_iter().map(word).collect();
        assert_eq!(mem.as_slice(), expected.as_slice());
        assert_eq!(mem.read(&word(1)), Ok(word(6)));
    }

    #[test]
    fn unbounded_by_default() {
        let mut mem = Memory::default();
        assert_eq!(mem.limit(), None);
        // Resolving an address does not allocate.
        assert_eq!(mem.address(&word(1 << 40)), Ok(1 << 40));
        assert!(mem.is_empty());

        mem.write(&word(70_000), word(3)).unwrap();
        assert_eq!(mem.len(), 70_001);
        assert_eq!(mem.read_at(70_000), Ok(word(3)));
    }

    #[test]
    fn negative_address_faults() {
        let mut mem = Memory::default();
        assert_eq!(
            mem.read(&word(-1)),
            Err(Fault::InvalidAddress { address: word(-1) })
        );
        assert_eq!(
            mem.write(&word(-3), word(1)),
            Err(Fault::InvalidAddress { address: word(-3) })
        );
        assert!(mem.is_empty());
    }

    #[test]
    fn configured_cap_rejects_huge_addresses() {
        let mut mem = Memory::new(Some(16));
        assert_eq!(mem.read(&word(15)), Ok(word(0)));
        assert_eq!(
            mem.write(&word(16), word(1)),
            Err(Fault::AddressOutOfRange {
                address: word(16),
                limit: 16
            })
        );
        assert_eq!(mem.len(), 16);
    }

    #[test]
    fn address_beyond_usize_is_out_of_range() {
        let mem = Memory::default();
        let huge: Word = Word::from(u64::MAX) * 4u32;
        assert_eq!(
            mem.address(&huge),
            Err(Fault::AddressOutOfRange {
                address: huge.clone(),
                limit: usize::MAX
            })
        );
    }

    #[test]
    fn load_resets_contents() {
        let program = Program::from([1i64, 2]);
        let mut mem = Memory::from_program(&program, None);
        mem.write(&word(10), word(9)).unwrap();
        mem.load(&program);
        assert_eq!(mem.as_slice(), program.words());
    }
}
