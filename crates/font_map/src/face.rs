//! Loaded font faces
//!
//! A [`Face`] is a cheap, clonable handle on the bytes of a font file and the
//! index of one face inside it. Handles are compared by identity, which is
//! what the reverse lookups of [`crate::FontMap`] rely on.

use crate::aspect::Aspect;
use crate::{FontError, Result};
use rustybuzz::ttf_parser;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_FACE_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of a loaded face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceId(pub u64);

impl FaceId {
    fn next() -> Self {
        FaceId(NEXT_FACE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for FaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "face-{}", self.0)
    }
}

/// Number of faces declared by a font collection header, or `None` for a
/// plain font file
///
/// The count is rejected when the offset table it implies does not fit in
/// `data`, and capped so that every index fits a [`crate::Location`].
pub(crate) fn collection_len(data: &[u8]) -> Result<Option<u32>> {
    let Some(count) = ttf_parser::fonts_in_collection(data) else {
        return Ok(None);
    };
    let table_end = 12 + 4 * u64::from(count);
    if table_end > data.len() as u64 {
        return Err(FontError::UnsupportedResource(format!(
            "font collection declares {} faces in {} bytes",
            count,
            data.len()
        )));
    }
    Ok(Some(count.min(u32::from(u16::MAX))))
}

/// A parsed face within a font resource
#[derive(Clone)]
pub struct Face {
    id: FaceId,
    data: Arc<Vec<u8>>,
    index: u32,
}

impl Face {
    /// Load face `index` of `data`, failing if the bytes are not a usable
    /// OpenType face.
    pub fn from_data(data: Arc<Vec<u8>>, index: u32) -> Result<Self> {
        if let Err(err) = ttf_parser::Face::parse(&data, index) {
            return Err(FontError::UnsupportedResource(format!("face {}: {}", index, err)));
        }
        Ok(Self {
            id: FaceId::next(),
            data,
            index,
        })
    }

    /// Load every face of a font file or collection
    ///
    /// Faces that fail to parse are skipped; an error is returned only when
    /// the resource is not a font at all.
    pub fn collection(data: Arc<Vec<u8>>) -> Result<Vec<Self>> {
        let count = match collection_len(&data)? {
            Some(count) => count,
            None => {
                // plain font file
                return Ok(vec![Self::from_data(data, 0)?]);
            }
        };
        if count == 0 {
            return Err(FontError::EmptyResource("font collection without faces".into()));
        }
        let faces = (0..count)
            .filter_map(|index| match Self::from_data(Arc::clone(&data), index) {
                Ok(face) => Some(face),
                Err(err) => {
                    tracing::warn!("skipping collection face: {}", err);
                    None
                }
            })
            .collect();
        Ok(faces)
    }

    /// Get the face identifier
    pub fn id(&self) -> FaceId {
        self.id
    }

    /// Get the raw font file bytes
    pub fn data(&self) -> &Arc<Vec<u8>> {
        &self.data
    }

    /// Get the face index inside the font file
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Parse the font tables.
    pub fn tables(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.data, self.index).ok()
    }

    /// Face ready to be passed to the shaper
    pub fn shaper_face(&self) -> Option<rustybuzz::Face<'_>> {
        rustybuzz::Face::from_slice(&self.data, self.index)
    }

    /// Check if the face maps `r` to a glyph
    pub fn has_glyph(&self, r: char) -> bool {
        self.tables().is_some_and(|face| face.glyph_index(r).is_some())
    }
}

#[cfg(test)]
impl Face {
    pub(crate) fn unchecked(data: Arc<Vec<u8>>, index: u32) -> Self {
        Self {
            id: FaceId::next(),
            data,
            index,
        }
    }
}

impl PartialEq for Face {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Face {}

impl fmt::Debug for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Face")
            .field("id", &self.id)
            .field("index", &self.index)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Caller supplied metadata for [`crate::FontMap::add_face`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Description {
    pub family: String,
    pub aspect: Aspect,
}

impl Description {
    pub fn new(family: impl Into<String>, aspect: Aspect) -> Self {
        Self {
            family: family.into(),
            aspect,
        }
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.family, self.aspect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection_header(count: u32) -> Vec<u8> {
        let mut data = b"ttcf".to_vec();
        data.extend_from_slice(&0x0001_0000u32.to_be_bytes());
        data.extend_from_slice(&count.to_be_bytes());
        data
    }

    #[test]
    fn test_oversized_collection_is_rejected() {
        let data = Arc::new(collection_header(u32::MAX));
        let result = Face::collection(data);
        assert!(matches!(result, Err(FontError::UnsupportedResource(_))));

        // two offsets declared, only one present
        let mut data = collection_header(2);
        data.extend_from_slice(&0u32.to_be_bytes());
        assert!(matches!(collection_len(&data), Err(FontError::UnsupportedResource(_))));
    }

    #[test]
    fn test_collection_len() {
        assert_eq!(collection_len(b"not a collection").unwrap(), None);
        assert_eq!(collection_len(&collection_header(0)).unwrap(), Some(0));

        let mut data = collection_header(3);
        data.extend_from_slice(&[0; 12]);
        assert_eq!(collection_len(&data).unwrap(), Some(3));
    }

    #[test]
    fn test_face_id_display() {
        assert_eq!(FaceId(7).to_string(), "face-7");
    }
}
