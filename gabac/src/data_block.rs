//! Byte-backed symbol buffers with a configurable word size.

use std::fmt::{Debug, Formatter};

/// A sequence of unsigned symbols stored as packed little-endian words of
/// 1, 2, 4 or 8 bytes.
///
/// All pipeline stages exchange data as `DataBlock`s; the word size decides
/// how many bytes each symbol occupies in memory and on disk.
///
/// # Examples
/// ```
/// use gabac::data_block::DataBlock;
///
/// let mut block = DataBlock::new(2);
/// block.push(1000);
/// block.push(65535);
/// assert_eq!(block.len(), 2);
/// assert_eq!(block.get(1), 65535);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct DataBlock {
    data: Vec<u8>,
    word_size: usize,
}

impl DataBlock {
    /// Creates an empty block with the given word size.
    ///
    /// # Panics
    /// Panics if `word_size` is not 1, 2, 4 or 8.
    #[must_use]
    pub fn new(word_size: usize) -> Self {
        assert!(
            matches!(word_size, 1 | 2 | 4 | 8),
            "word size must be 1, 2, 4 or 8"
        );

        Self {
            data: Vec::new(),
            word_size,
        }
    }

    /// Creates a zero-filled block with `len` symbols of the given word size.
    #[must_use]
    pub fn with_len(len: usize, word_size: usize) -> Self {
        let mut block = Self::new(word_size);
        block.data = vec![0; len * word_size];
        block
    }

    /// Creates a block holding a copy of `symbols`. Values are truncated to
    /// the word size.
    #[must_use]
    pub fn from_symbols(symbols: &[u64], word_size: usize) -> Self {
        let mut block = Self::new(word_size);
        block.reserve(symbols.len());
        for &symbol in symbols {
            block.push(symbol);
        }
        block
    }

    /// Wraps raw little-endian bytes as a block.
    ///
    /// # Panics
    /// Panics if the byte length is not a multiple of the word size.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>, word_size: usize) -> Self {
        let mut block = Self::new(word_size);
        assert!(
            bytes.len() % word_size == 0,
            "byte length must be a multiple of the word size"
        );
        block.data = bytes;
        block
    }

    /// Returns the number of bytes each symbol occupies.
    #[must_use]
    pub fn word_size(&self) -> usize {
        self.word_size
    }

    /// Returns the number of symbols in this block.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len() / self.word_size
    }

    /// Returns `true` if this block holds no symbols.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the symbol at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> u64 {
        let start = index * self.word_size;
        let word = &self.data[start..start + self.word_size];
        let mut bytes = [0_u8; 8];
        bytes[..self.word_size].copy_from_slice(word);
        u64::from_le_bytes(bytes)
    }

    /// Overwrites the symbol at `index`, truncating `value` to the word size.
    pub fn set(&mut self, index: usize, value: u64) {
        let start = index * self.word_size;
        self.data[start..start + self.word_size]
            .copy_from_slice(&value.to_le_bytes()[..self.word_size]);
    }

    /// Appends a symbol, truncating `value` to the word size.
    pub fn push(&mut self, value: u64) {
        self.data
            .extend_from_slice(&value.to_le_bytes()[..self.word_size]);
    }

    /// Reserves space for at least `additional` more symbols.
    pub fn reserve(&mut self, additional: usize) {
        self.data.reserve(additional * self.word_size);
    }

    /// Removes all symbols, keeping the word size.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Iterates over the symbols as `u64` values.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        (0..self.len()).map(|i| self.get(i))
    }

    /// Returns the packed little-endian bytes of this block.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the block, returning its packed little-endian bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Largest value representable with this block's word size.
    #[must_use]
    pub fn max_word_value(&self) -> u64 {
        if self.word_size == 8 {
            u64::MAX
        } else {
            (1 << (self.word_size * 8)) - 1
        }
    }
}

impl Debug for DataBlock {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataBlock")
            .field("word_size", &self.word_size)
            .field("symbols", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}
