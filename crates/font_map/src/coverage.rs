//! Compact rune coverage
//!
//! A coverage is a sorted list of 256-rune pages. A rune `r` lives in the
//! page `r >> 8`; inside the page, bit `r & 0x1f` of word `(r & 0xff) >> 5`
//! records its membership. Absent pages have no coverage.

use crate::{FontError, Result};

const WORDS_PER_PAGE: usize = 8;
const FULL_PAGE: [u32; WORDS_PER_PAGE] = [u32::MAX; WORDS_PER_PAGE];

/// Encoded size of a page: u16 reference + 8 big-endian u32
const PAGE_SIZE: usize = 2 + 4 * WORDS_PER_PAGE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RunePage {
    page: u16,
    bits: [u32; WORDS_PER_PAGE],
}

impl RunePage {
    fn empty(page: u16) -> Self {
        Self {
            page,
            bits: [0; WORDS_PER_PAGE],
        }
    }

    /// Sets the bits from `start` to `end` (inclusive, `start <= end`).
    fn fill(&mut self, start: u8, end: u8) {
        if start == 0 && end == 0xff {
            self.bits = FULL_PAGE;
            return;
        }
        let first_word = (start >> 5) as usize;
        let last_word = (end >> 5) as usize;
        let first_bit = u32::from(start & 0x1f);
        let last_bit = u32::from(end & 0x1f);

        if first_word == last_word {
            self.bits[first_word] |= bit_span(first_bit, last_bit);
            return;
        }
        self.bits[first_word] |= bit_span(first_bit, 31);
        for word in &mut self.bits[first_word + 1..last_word] {
            *word = u32::MAX;
        }
        self.bits[last_word] |= bit_span(0, last_bit);
    }
}

/// Mask with bits `from..=to` set
fn bit_span(from: u32, to: u32) -> u32 {
    let upper = if to == 31 { u32::MAX } else { (1u32 << (to + 1)) - 1 };
    upper & !((1u32 << from) - 1)
}

/// The set of code points supported by a font
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuneCoverage {
    pages: Vec<RunePage>,
}

impl RuneCoverage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a coverage from sorted, inclusive code point ranges.
    pub fn from_ranges(ranges: &[(u32, u32)]) -> Self {
        let mut coverage = Self::new();
        for &(start, end) in ranges {
            coverage.insert_range(start, end);
        }
        coverage
    }

    fn find_page(&self, page: u16) -> std::result::Result<usize, usize> {
        self.pages.binary_search_by_key(&page, |p| p.page)
    }

    fn page_mut(&mut self, page: u16) -> &mut RunePage {
        // appending in order is the common case when reading a cmap
        let pos = match self.pages.last() {
            Some(last) if last.page == page => self.pages.len() - 1,
            Some(last) if last.page < page => {
                self.pages.push(RunePage::empty(page));
                self.pages.len() - 1
            }
            None => {
                self.pages.push(RunePage::empty(page));
                0
            }
            Some(_) => match self.find_page(page) {
                Ok(pos) => pos,
                Err(pos) => {
                    self.pages.insert(pos, RunePage::empty(page));
                    pos
                }
            },
        };
        &mut self.pages[pos]
    }

    pub fn insert(&mut self, r: char) {
        let r = u32::from(r);
        let page = self.page_mut((r >> 8) as u16);
        page.bits[((r & 0xff) >> 5) as usize] |= 1 << (r & 0x1f);
    }

    /// Removes `r`. Emptied pages are kept.
    pub fn remove(&mut self, r: char) {
        let r = u32::from(r);
        if let Ok(pos) = self.find_page((r >> 8) as u16) {
            self.pages[pos].bits[((r & 0xff) >> 5) as usize] &= !(1 << (r & 0x1f));
        }
    }

    pub fn contains(&self, r: char) -> bool {
        self.contains_u32(u32::from(r))
    }

    pub(crate) fn contains_u32(&self, r: u32) -> bool {
        match self.find_page((r >> 8) as u16) {
            Ok(pos) => self.pages[pos].bits[((r & 0xff) >> 5) as usize] & (1 << (r & 0x1f)) != 0,
            Err(_) => false,
        }
    }

    /// Number of covered runes
    pub fn len(&self) -> usize {
        self.pages
            .iter()
            .flat_map(|p| p.bits.iter())
            .map(|w| w.count_ones() as usize)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.iter().all(|p| p.bits.iter().all(|w| *w == 0))
    }

    /// Adds every rune from `start` to `end` inclusive. Does nothing when
    /// `start > end`.
    pub fn insert_range(&mut self, start: u32, end: u32) {
        if start > end {
            return;
        }
        let first_page = (start >> 8) as u16;
        let last_page = (end >> 8) as u16;
        let start_byte = (start & 0xff) as u8;
        let end_byte = (end & 0xff) as u8;

        if first_page == last_page {
            self.page_mut(first_page).fill(start_byte, end_byte);
            return;
        }

        self.page_mut(first_page).fill(start_byte, 0xff);
        for page in first_page + 1..last_page {
            self.page_mut(page).bits = FULL_PAGE;
        }
        self.page_mut(last_page).fill(0, end_byte);
    }

    /// Iterates the covered runes as sorted, maximal inclusive ranges.
    pub fn ranges(&self) -> Vec<(u32, u32)> {
        let mut out: Vec<(u32, u32)> = Vec::new();
        for page in &self.pages {
            let base = u32::from(page.page) << 8;
            for (w, word) in page.bits.iter().enumerate() {
                if *word == 0 {
                    continue;
                }
                for bit in 0..32 {
                    if word & (1 << bit) == 0 {
                        continue;
                    }
                    let r = base + ((w as u32) << 5) + bit;
                    match out.last_mut() {
                        Some(last) if last.1 + 1 == r => last.1 = r,
                        _ => out.push((r, r)),
                    }
                }
            }
        }
        out
    }

    /// Appends the binary form: u16 page count, then per page a u16
    /// reference followed by 8 big-endian u32 words.
    pub fn encode_into(&self, dst: &mut Vec<u8>) {
        let count = self.pages.len().min(usize::from(u16::MAX));
        dst.reserve(2 + PAGE_SIZE * count);
        dst.extend_from_slice(&(count as u16).to_be_bytes());
        for page in &self.pages[..count] {
            dst.extend_from_slice(&page.page.to_be_bytes());
            for word in page.bits {
                dst.extend_from_slice(&word.to_be_bytes());
            }
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_into(&mut out);
        out
    }

    /// Reads the format written by [`RuneCoverage::encode_into`], returning
    /// the coverage and the number of bytes consumed.
    pub fn decode(data: &[u8]) -> Result<(Self, usize)> {
        if data.len() < 2 {
            return Err(FontError::decode("rune coverage (EOF)"));
        }
        let count = usize::from(u16::from_be_bytes([data[0], data[1]]));
        let size = 2 + PAGE_SIZE * count;
        if data.len() < size {
            return Err(FontError::decode("rune coverage size (EOF)"));
        }
        let mut pages = Vec::with_capacity(count);
        for chunk in data[2..size].chunks_exact(PAGE_SIZE) {
            let mut bits = [0u32; WORDS_PER_PAGE];
            for (word, raw) in bits.iter_mut().zip(chunk[2..].chunks_exact(4)) {
                *word = u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]);
            }
            pages.push(RunePage {
                page: u16::from_be_bytes([chunk[0], chunk[1]]),
                bits,
            });
        }
        if pages.windows(2).any(|w| w[0].page >= w[1].page) {
            return Err(FontError::decode("rune coverage pages out of order"));
        }
        Ok((Self { pages }, size))
    }
}

impl FromIterator<char> for RuneCoverage {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        let mut coverage = Self::new();
        for r in iter {
            coverage.insert(r);
        }
        coverage
    }
}
