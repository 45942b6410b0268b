//! Frequency-ranked subsymbol lookup tables.
//!
//! Subsymbols are remapped to their rank in a per-context frequency table
//! before binarization, so that frequent values get the short codewords.
//! The tables are built from the data being encoded and serialized ahead
//! of the payload; the decoder reads them back before decoding symbols.

use crate::data_block::DataBlock;
use crate::error::{GabacError, GabacResult};
use crate::reader::Reader;
use crate::state_vars::StateVars;
use crate::writer::Writer;

#[derive(Debug, Clone, Copy, Default)]
struct LutEntry {
    value: u64,
    freq: u64,
}

#[derive(Debug, Clone)]
struct LutRow {
    entries: Vec<LutEntry>,
    num_max_elems: u64,
}

/// The lookup tables of one substream. One row per (subsymbol position,
/// history) pair; the history is the previous one or two subsymbol values
/// at the same position, matching the context selection order.
#[derive(Debug)]
pub(crate) struct LutTransform {
    rows: Vec<LutRow>,
    coding_order: u8,
    coding_subsym_size: u32,
    num_alpha: usize,
}

impl LutTransform {
    pub(crate) fn new(vars: &StateVars) -> Self {
        let num_alpha = vars.num_alpha_subsym as usize;
        let num_rows =
            vars.num_subsyms as usize * num_alpha.pow(u32::from(vars.coding_order));
        Self {
            rows: vec![
                LutRow {
                    entries: vec![LutEntry::default(); num_alpha],
                    num_max_elems: 0,
                };
                num_rows
            ],
            coding_order: vars.coding_order,
            coding_subsym_size: vars.coding_subsym_size,
            num_alpha,
        }
    }

    fn row_index(&self, subsym_idx: u32, prv: &[u64; 2]) -> usize {
        let mut index = subsym_idx as usize;
        if self.coding_order == 2 {
            index = index * self.num_alpha + prv[1] as usize;
        }
        index * self.num_alpha + prv[0] as usize
    }

    /// Builds the tables from the symbols about to be encoded. The history
    /// is updated exactly like in the coding loop so that both passes see
    /// the same rows.
    pub(crate) fn build(&mut self, symbols: &DataBlock, vars: &StateVars) {
        let mask = vars.subsym_mask();
        let mut history = vec![[0_u64; 2]; vars.num_subsyms as usize];

        for symbol in symbols.iter() {
            let mut remaining = vars.output_symbol_size;
            for (s, prv) in history.iter_mut().enumerate() {
                remaining -= vars.coding_subsym_size;
                let subsym = (symbol >> remaining) & mask;

                let row_idx = self.row_index(s as u32, prv);
                let entry = &mut self.rows[row_idx].entries[subsym as usize];
                entry.value = subsym;
                entry.freq += 1;

                if vars.coding_order == 2 {
                    prv[1] = prv[0];
                }
                prv[0] = subsym;
            }
        }

        for row in &mut self.rows {
            // frequent values first; equal frequencies keep value order so
            // both sides sort identically
            row.entries.sort_by(|a, b| {
                b.freq.cmp(&a.freq).then_with(|| a.value.cmp(&b.value))
            });
            let used = row.entries.iter().filter(|entry| entry.freq > 0).count();
            row.num_max_elems = (used as u64).saturating_sub(1);
        }
    }

    /// Serializes all rows ahead of the symbol payload.
    pub(crate) fn encode(&self, writer: &mut Writer) {
        for row in &self.rows {
            writer.write_lut_symbol(row.num_max_elems, self.coding_subsym_size);
            for entry in row.entries.iter().take(row.num_max_elems as usize + 1) {
                writer.write_lut_symbol(entry.value, self.coding_subsym_size);
            }
        }
    }

    /// Reads the rows serialized by [`Self::encode`].
    pub(crate) fn decode(reader: &mut Reader, vars: &StateVars) -> GabacResult<Self> {
        let mut luts = Self::new(vars);
        for row in &mut luts.rows {
            let num_max_elems = reader.read_lut_symbol(vars.coding_subsym_size);
            if num_max_elems >= luts.num_alpha as u64 {
                return Err(GabacError::CorruptedPayload(format!(
                    "lookup table row with {} entries exceeds the alphabet",
                    num_max_elems + 1
                )));
            }
            row.num_max_elems = num_max_elems;
            for entry in row.entries.iter_mut().take(num_max_elems as usize + 1) {
                entry.value = reader.read_lut_symbol(vars.coding_subsym_size);
                entry.freq = 1;
            }
        }
        Ok(luts)
    }

    /// Largest valid rank in the row for the given position and history,
    /// used to tighten the truncated unary `cMax`.
    pub(crate) fn num_max_elems(&self, subsym_idx: u32, prv: &[u64; 2]) -> u64 {
        self.rows[self.row_index(subsym_idx, prv)].num_max_elems
    }

    /// Maps a subsymbol value to its rank.
    pub(crate) fn transform(
        &self,
        subsym_idx: u32,
        prv: &[u64; 2],
        value: u64,
    ) -> GabacResult<u64> {
        let row = &self.rows[self.row_index(subsym_idx, prv)];
        row.entries
            .iter()
            .take(row.num_max_elems as usize + 1)
            .position(|entry| entry.freq > 0 && entry.value == value)
            .map(|rank| rank as u64)
            .ok_or_else(|| {
                GabacError::CorruptedPayload(format!(
                    "subsymbol value {} missing from its lookup table row",
                    value
                ))
            })
    }

    /// Maps a rank back to the subsymbol value.
    pub(crate) fn inverse(
        &self,
        subsym_idx: u32,
        prv: &[u64; 2],
        rank: u64,
    ) -> GabacResult<u64> {
        let row = &self.rows[self.row_index(subsym_idx, prv)];
        if rank > row.num_max_elems {
            return Err(GabacError::CorruptedPayload(format!(
                "lookup table rank {} out of range",
                rank
            )));
        }
        Ok(row.entries[rank as usize].value)
    }
}
