//! Pack buffer construction.

use crate::location::{
    Transform, KIND_MATRIX, KIND_NONE, KIND_ROTATION_TRANSLATION,
    KIND_SCALE_ROTATION_TRANSLATION, KIND_TRANSLATION,
};
use crate::varint::encode_varint;
use crate::{PACK_MAGIC, PACK_VERSION};

/// One fragment record to be written into a pack buffer.
#[derive(Debug, Clone)]
pub struct FragmentRecord {
    /// Record format version; versions > 3 mark the bounding box as
    /// world-space on decode.
    pub version: u64,
    /// Record flag byte.
    pub flags: u8,
    /// Material identifier.
    pub material_id: u64,
    /// Geometry identifier.
    pub geometry_id: u64,
    /// Fragment transform; `None` produces a record decoders skip.
    pub transform: Option<Transform>,
    /// Local bounding box: min x/y/z then max x/y/z.
    pub bbox: [f32; 6],
    /// Id of the scene element this fragment belongs to.
    pub db_id: u64,
}

/// Builds a pack buffer record by record.
#[derive(Debug, Default)]
pub struct PackWriter {
    body: Vec<u8>,
    count: u64,
}

impl PackWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record.
    pub fn add_record(&mut self, record: &FragmentRecord) {
        let buf = &mut self.body;
        encode_varint(record.version, buf);
        buf.push(record.flags);
        encode_varint(record.material_id, buf);
        encode_varint(record.geometry_id, buf);

        match &record.transform {
            None => buf.push(KIND_NONE),
            Some(Transform::Translation(t)) => {
                buf.push(KIND_TRANSLATION);
                push_f32s(buf, t);
            }
            Some(Transform::RotationTranslation {
                rotation,
                translation,
            }) => {
                buf.push(KIND_ROTATION_TRANSLATION);
                push_f32s(buf, rotation);
                push_f32s(buf, translation);
            }
            Some(Transform::ScaleRotationTranslation {
                scale,
                rotation,
                translation,
            }) => {
                buf.push(KIND_SCALE_ROTATION_TRANSLATION);
                buf.extend_from_slice(&scale.to_le_bytes());
                push_f32s(buf, rotation);
                push_f32s(buf, translation);
            }
            Some(Transform::Matrix(m)) => {
                buf.push(KIND_MATRIX);
                push_f32s(buf, m);
            }
        }

        push_f32s(buf, &record.bbox);
        encode_varint(record.db_id, buf);
        self.count += 1;
    }

    /// Number of records added so far.
    pub fn record_count(&self) -> u64 {
        self.count
    }

    /// Assemble the final pack buffer.
    pub fn finish(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.body.len() + 16);
        out.extend_from_slice(&PACK_MAGIC);
        out.push(PACK_VERSION);
        encode_varint(self.count, &mut out);
        out.extend_from_slice(&self.body);
        out
    }
}

fn push_f32s(buf: &mut Vec<u8>, values: &[f32]) {
    for v in values {
        buf.extend_from_slice(&v.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let writer = PackWriter::new();
        let buf = writer.finish();
        assert_eq!(&buf[..4], b"PFRG");
        assert_eq!(buf[4], PACK_VERSION);
        assert_eq!(buf[5], 0); // record count varint
        assert_eq!(buf.len(), 6);
    }

    #[test]
    fn test_count_tracks_records() {
        let mut writer = PackWriter::new();
        assert_eq!(writer.record_count(), 0);
        writer.add_record(&FragmentRecord {
            version: 3,
            flags: 0,
            material_id: 0,
            geometry_id: 0,
            transform: None,
            bbox: [0.0; 6],
            db_id: 1,
        });
        assert_eq!(writer.record_count(), 1);
    }
}
