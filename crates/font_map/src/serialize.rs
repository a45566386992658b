//! Binary format of the system font index
//!
//! The index file is gzip compressed. Once decompressed it holds a u16
//! format version, a u32 record count, then one record per scanned file,
//! each prefixed by its u32 length:
//!
//! ```text
//! record    := path:string mtime:i64 footprint*
//! footprint := file:string index:u16 instance:u16 family:string
//!              runes:RuneCoverage scripts:ScriptSet aspect
//! aspect    := style:u8 weight:f32 stretch:f32
//! string    := len:u16 utf8-bytes
//! ```
//!
//! All integers are big-endian.

use crate::aspect::{Aspect, Stretch, Style, Weight};
use crate::coverage::RuneCoverage;
use crate::footprint::{Footprint, Location};
use crate::scan::{FileFootprints, SystemFontsIndex};
use crate::script::ScriptSet;
use crate::{FontError, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Version of the index format; files of another version are rebuilt.
pub const INDEX_FORMAT_VERSION: u16 = 2;

const ASPECT_SIZE: usize = 1 + 4 + 4;

/// Path of the index file inside `cache_dir`
pub fn index_file_path(cache_dir: &Path) -> PathBuf {
    cache_dir.join(format!("font_index_v{}.cache", INDEX_FORMAT_VERSION))
}

/// Bounds checked reads over a byte slice
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn rest(&self) -> &'a [u8] {
        &self.data[self.pos.min(self.data.len())..]
    }

    fn take(&mut self, n: usize, what: &str) -> Result<&'a [u8]> {
        let rest = self.rest();
        if rest.len() < n {
            return Err(FontError::decode(format!("{} (EOF)", what)));
        }
        self.pos += n;
        Ok(&rest[..n])
    }

    fn u16(&mut self, what: &str) -> Result<u16> {
        let b = self.take(2, what)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self, what: &str) -> Result<u32> {
        let b = self.take(4, what)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn i64(&mut self, what: &str) -> Result<i64> {
        let b = self.take(8, what)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(b);
        Ok(i64::from_be_bytes(raw))
    }

    fn string(&mut self, what: &str) -> Result<String> {
        let len = usize::from(self.u16(what)?);
        let bytes = self.take(len, what)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| FontError::decode(format!("{} (not UTF-8)", what)))
    }

    /// Run a decoder reporting the bytes it consumed
    fn decode_with<T>(&mut self, decode: impl FnOnce(&'a [u8]) -> Result<(T, usize)>) -> Result<T> {
        let (value, read) = decode(self.rest())?;
        self.pos += read;
        Ok(value)
    }
}

fn put_string(dst: &mut Vec<u8>, s: &str) {
    // truncation keeps the output decodable; no real path or family is this long
    let mut len = s.len().min(usize::from(u16::MAX));
    while !s.is_char_boundary(len) {
        len -= 1;
    }
    dst.extend_from_slice(&(len as u16).to_be_bytes());
    dst.extend_from_slice(&s.as_bytes()[..len]);
}

impl Aspect {
    fn encode_into(&self, dst: &mut Vec<u8>) {
        dst.push(self.style.to_byte());
        dst.extend_from_slice(&f32::from(self.weight.0).to_be_bytes());
        dst.extend_from_slice(&self.stretch.0.to_be_bytes());
    }

    fn decode(data: &[u8]) -> Result<(Self, usize)> {
        if data.len() < ASPECT_SIZE {
            return Err(FontError::decode("aspect (EOF)"));
        }
        let style = Style::from_byte(data[0])
            .ok_or_else(|| FontError::decode(format!("aspect style {}", data[0])))?;
        let weight = f32::from_be_bytes([data[1], data[2], data[3], data[4]]);
        let stretch = f32::from_be_bytes([data[5], data[6], data[7], data[8]]);
        let aspect = Aspect {
            style,
            weight: Weight(weight.clamp(0.0, 1000.0).round() as u16),
            stretch: Stretch(stretch),
        };
        Ok((aspect.with_defaults(), ASPECT_SIZE))
    }
}

impl Footprint {
    /// Append the binary form of the footprint. The provenance flag is not
    /// stored: only scanned footprints are serialized.
    pub fn encode_into(&self, dst: &mut Vec<u8>) {
        put_string(dst, &self.location.file);
        dst.extend_from_slice(&self.location.index.to_be_bytes());
        dst.extend_from_slice(&self.location.instance.to_be_bytes());
        put_string(dst, &self.family);
        self.runes.encode_into(dst);
        self.scripts.encode_into(dst);
        self.aspect.encode_into(dst);
    }

    /// Read one footprint, returning it with the number of bytes consumed.
    pub fn decode(data: &[u8]) -> Result<(Self, usize)> {
        let mut cursor = Cursor::new(data);
        let file = cursor.string("footprint location")?;
        let index = cursor.u16("footprint location")?;
        let instance = cursor.u16("footprint location")?;
        let family = cursor.string("footprint family")?;
        let runes = cursor.decode_with(RuneCoverage::decode)?;
        let scripts = cursor.decode_with(ScriptSet::decode)?;
        let aspect = cursor.decode_with(Aspect::decode)?;
        let footprint = Footprint {
            location: Location { file, index, instance },
            family,
            runes,
            scripts,
            aspect,
            is_user_provided: false,
        };
        Ok((footprint, cursor.pos))
    }
}

impl FileFootprints {
    pub fn encode_into(&self, dst: &mut Vec<u8>) {
        put_string(dst, &self.path);
        dst.extend_from_slice(&self.modified.to_be_bytes());
        for footprint in &self.footprints {
            footprint.encode_into(dst);
        }
    }

    /// Read a record spanning the whole of `data`
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data);
        let path = cursor.string("file path")?;
        let modified = cursor.i64("file modification time")?;
        let mut footprints = Vec::new();
        while !cursor.is_empty() {
            footprints.push(cursor.decode_with(Footprint::decode)?);
        }
        Ok(Self {
            path,
            modified,
            footprints,
        })
    }
}

impl SystemFontsIndex {
    /// Uncompressed binary form of the index
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(6 + self.files().len() * 64);
        out.extend_from_slice(&INDEX_FORMAT_VERSION.to_be_bytes());
        out.extend_from_slice(&(self.files().len() as u32).to_be_bytes());
        for file in self.files() {
            let start = out.len();
            out.extend_from_slice(&[0; 4]);
            file.encode_into(&mut out);
            let size = (out.len() - start - 4) as u32;
            out[start..start + 4].copy_from_slice(&size.to_be_bytes());
        }
        out
    }

    /// Parse the uncompressed binary form
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data);
        let version = cursor.u16("index version")?;
        if version != INDEX_FORMAT_VERSION {
            return Err(FontError::VersionMismatch {
                found: version,
                expected: INDEX_FORMAT_VERSION,
            });
        }
        let count = cursor.u32("index length")?;
        // each record takes at least 14 bytes; do not trust the count for allocation
        let mut files = Vec::with_capacity((count as usize).min(data.len() / 14));
        for _ in 0..count {
            let size = cursor.u32("record size")? as usize;
            let record = cursor.take(size, "record")?;
            files.push(FileFootprints::decode(record)?);
        }
        Ok(Self::from_files(files))
    }

    /// Write the gzip compressed index
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut encoder = GzEncoder::new(writer, Compression::default());
        encoder.write_all(&self.to_bytes())?;
        encoder.finish()?;
        Ok(())
    }

    /// Read a gzip compressed index
    pub fn read_from<R: Read>(reader: R) -> Result<Self> {
        let mut decoder = GzDecoder::new(reader);
        let mut data = Vec::new();
        decoder
            .read_to_end(&mut data)
            .map_err(|e| FontError::decode(format!("compressed index: {}", e)))?;
        Self::from_bytes(&data)
    }

    /// Write the index to `path`, creating its directory if needed.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .map_err(|e| FontError::CacheDirectory(format!("{}: {}", dir.display(), e)))?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn read_from_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::read_from(BufReader::new(file))
    }
}
