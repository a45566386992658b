//! Minimal OpenType fonts built in memory
//!
//! The fonts carry only what the index reads: a `name` table with the
//! family and subfamily, an `OS/2` table with weight, width and style, and a
//! format 12 `cmap`, plus the tables every font parser requires.

#![allow(dead_code)]

pub struct TestFont {
    family: String,
    subfamily: String,
    weight: u16,
    width: u16,
    italic: bool,
    oblique: bool,
    ranges: Vec<(u32, u32)>,
}

impl TestFont {
    pub fn new(family: &str) -> Self {
        Self {
            family: family.to_string(),
            subfamily: "Regular".to_string(),
            weight: 400,
            width: 5,
            italic: false,
            oblique: false,
            ranges: Vec::new(),
        }
    }

    /// Map the runes of `text`, one range per rune
    pub fn chars(mut self, text: &str) -> Self {
        self.ranges.extend(text.chars().map(|c| (c as u32, c as u32)));
        self
    }

    pub fn range(mut self, start: char, end: char) -> Self {
        self.ranges.push((start as u32, end as u32));
        self
    }

    pub fn weight(mut self, weight: u16) -> Self {
        self.weight = weight;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self.subfamily = "Italic".to_string();
        self
    }

    pub fn oblique(mut self) -> Self {
        self.oblique = true;
        self.subfamily = "Oblique".to_string();
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let tables: [(&[u8; 4], Vec<u8>); 6] = [
            (b"OS/2", self.os2()),
            (b"cmap", self.cmap()),
            (b"head", head()),
            (b"hhea", hhea()),
            (b"maxp", maxp()),
            (b"name", self.name()),
        ];

        let mut out = Vec::new();
        put_u32(&mut out, 0x0001_0000);
        put_u16(&mut out, tables.len() as u16);
        put_u16(&mut out, 64); // search range
        put_u16(&mut out, 2); // entry selector
        put_u16(&mut out, 32); // range shift

        let mut offset = 12 + 16 * tables.len();
        let mut body = Vec::new();
        for (tag, data) in &tables {
            out.extend_from_slice(*tag);
            put_u32(&mut out, 0); // checksum
            put_u32(&mut out, offset as u32);
            put_u32(&mut out, data.len() as u32);
            body.extend_from_slice(data);
            while body.len() % 4 != 0 {
                body.push(0);
            }
            offset = 12 + 16 * tables.len() + body.len();
        }
        out.extend_from_slice(&body);
        out
    }

    fn os2(&self) -> Vec<u8> {
        let mut t = vec![0u8; 96];
        t[0..2].copy_from_slice(&4u16.to_be_bytes());
        t[4..6].copy_from_slice(&self.weight.to_be_bytes());
        t[6..8].copy_from_slice(&self.width.to_be_bytes());
        let selection: u16 = if self.italic {
            0x0001
        } else if self.oblique {
            0x0200
        } else {
            0x0040
        };
        t[62..64].copy_from_slice(&selection.to_be_bytes());
        t
    }

    fn cmap(&self) -> Vec<u8> {
        let mut t = Vec::new();
        put_u16(&mut t, 0); // version
        put_u16(&mut t, 1); // number of subtables
        put_u16(&mut t, 3); // windows
        put_u16(&mut t, 10); // full unicode
        put_u32(&mut t, 12);

        put_u16(&mut t, 12); // format
        put_u16(&mut t, 0);
        put_u32(&mut t, 16 + 12 * self.ranges.len() as u32);
        put_u32(&mut t, 0); // language
        put_u32(&mut t, self.ranges.len() as u32);
        let mut glyph = 1;
        for &(start, end) in &self.ranges {
            put_u32(&mut t, start);
            put_u32(&mut t, end);
            put_u32(&mut t, glyph);
            glyph += end - start + 1;
        }
        t
    }

    fn name(&self) -> Vec<u8> {
        let strings: Vec<(u16, Vec<u8>)> = vec![(1, utf16(&self.family)), (2, utf16(&self.subfamily))];
        let mut t = Vec::new();
        put_u16(&mut t, 0); // format
        put_u16(&mut t, strings.len() as u16);
        put_u16(&mut t, 6 + 12 * strings.len() as u16);
        let mut offset = 0u16;
        for (name_id, data) in &strings {
            put_u16(&mut t, 3); // windows
            put_u16(&mut t, 1); // unicode BMP
            put_u16(&mut t, 0x0409); // en-US
            put_u16(&mut t, *name_id);
            put_u16(&mut t, data.len() as u16);
            put_u16(&mut t, offset);
            offset += data.len() as u16;
        }
        for (_, data) in &strings {
            t.extend_from_slice(data);
        }
        t
    }
}

fn head() -> Vec<u8> {
    let mut t = vec![0u8; 54];
    t[0..4].copy_from_slice(&0x0001_0000u32.to_be_bytes());
    t[12..16].copy_from_slice(&0x5F0F_3CF5u32.to_be_bytes());
    t[18..20].copy_from_slice(&1000u16.to_be_bytes()); // units per em
    t
}

fn hhea() -> Vec<u8> {
    let mut t = vec![0u8; 36];
    t[0..4].copy_from_slice(&0x0001_0000u32.to_be_bytes());
    t[4..6].copy_from_slice(&800i16.to_be_bytes());
    t[6..8].copy_from_slice(&(-200i16).to_be_bytes());
    t[34..36].copy_from_slice(&1u16.to_be_bytes());
    t
}

fn maxp() -> Vec<u8> {
    let mut t = Vec::new();
    put_u32(&mut t, 0x0000_5000);
    put_u16(&mut t, 0xFFFF);
    t
}

fn utf16(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(|u| u.to_be_bytes()).collect()
}

fn put_u16(dst: &mut Vec<u8>, v: u16) {
    dst.extend_from_slice(&v.to_be_bytes());
}

fn put_u32(dst: &mut Vec<u8>, v: u32) {
    dst.extend_from_slice(&v.to_be_bytes());
}
