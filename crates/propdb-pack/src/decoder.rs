//! Pack buffer decoding.

use std::collections::{HashMap, HashSet};

use crate::error::PackError;
use crate::location::{
    FragmentLocation, Transform, KIND_MATRIX, KIND_NONE, KIND_ROTATION_TRANSLATION,
    KIND_SCALE_ROTATION_TRANSLATION, KIND_TRANSLATION,
};
use crate::reader::Cursor;
use crate::{PACK_MAGIC, PACK_VERSION};

/// Record format versions above 3 store their bounding box offset into world
/// space by the transform translation.
pub const WORLD_SPACE_MIN_VERSION: u64 = 4;

/// One fully parsed record, before first-occurrence filtering.
struct RawRecord {
    version: u64,
    transform: Option<Transform>,
    bbox: [f32; 6],
    db_id: u64,
}

/// Decode every usable record of a pack buffer into a map of element id to
/// [`FragmentLocation`].
///
/// Records without a transform are consumed but not emitted. Multiple
/// fragments may reference the same element id; the first occurrence wins.
/// Bytes past the declared record count are ignored.
pub fn decode_locations(buf: &[u8]) -> Result<HashMap<u64, FragmentLocation>, PackError> {
    decode_with(buf, |_| true)
}

/// Decode only the records whose element id is in `targets`.
///
/// Identical to [`decode_locations`] otherwise; use this when a prior
/// property query already narrowed down the ids of interest.
pub fn decode_locations_filtered(
    buf: &[u8],
    targets: &HashSet<u64>,
) -> Result<HashMap<u64, FragmentLocation>, PackError> {
    decode_with(buf, |db_id| targets.contains(&db_id))
}

fn decode_with(
    buf: &[u8],
    mut wanted: impl FnMut(u64) -> bool,
) -> Result<HashMap<u64, FragmentLocation>, PackError> {
    let mut cur = Cursor::new(buf);
    cur.read_magic(&PACK_MAGIC)?;
    let container_version = cur.read_u8()?;
    if container_version != PACK_VERSION {
        return Err(PackError::UnsupportedVersion(container_version));
    }

    let count = cur.read_varint()?;
    let mut locations = HashMap::new();
    let mut skipped = 0u64;

    for _ in 0..count {
        let record = read_record(&mut cur)?;

        let Some(transform) = record.transform else {
            skipped += 1;
            continue;
        };
        if !wanted(record.db_id) || locations.contains_key(&record.db_id) {
            continue;
        }

        let [x, y, z] = transform.translation();
        let mut bbox = record.bbox;
        if record.version >= WORLD_SPACE_MIN_VERSION {
            bbox[0] += x;
            bbox[1] += y;
            bbox[2] += z;
            bbox[3] += x;
            bbox[4] += y;
            bbox[5] += z;
        }

        locations.insert(
            record.db_id,
            FragmentLocation {
                x,
                y,
                z,
                min_x: bbox[0],
                min_y: bbox[1],
                min_z: bbox[2],
                max_x: bbox[3],
                max_y: bbox[4],
                max_z: bbox[5],
            },
        );
    }

    tracing::debug!(
        records = count,
        emitted = locations.len(),
        skipped,
        "decoded fragment pack"
    );
    Ok(locations)
}

/// Read one record in strict field order, consuming every field even when
/// the record will not be emitted.
fn read_record(cur: &mut Cursor<'_>) -> Result<RawRecord, PackError> {
    let version = cur.read_varint()?;
    let _flags = cur.read_u8()?;
    let _material_id = cur.read_varint()?;
    let _geometry_id = cur.read_varint()?;

    let transform = read_transform(cur)?;

    let mut bbox = [0.0f32; 6];
    for slot in &mut bbox {
        *slot = cur.read_f32()?;
    }

    let db_id = cur.read_varint()?;

    Ok(RawRecord {
        version,
        transform,
        bbox,
        db_id,
    })
}

fn read_transform(cur: &mut Cursor<'_>) -> Result<Option<Transform>, PackError> {
    let kind = cur.read_u8()?;
    let transform = match kind {
        KIND_NONE => None,
        KIND_TRANSLATION => Some(Transform::Translation(cur.read_f32x3()?)),
        KIND_ROTATION_TRANSLATION => Some(Transform::RotationTranslation {
            rotation: cur.read_f32x4()?,
            translation: cur.read_f32x3()?,
        }),
        KIND_SCALE_ROTATION_TRANSLATION => Some(Transform::ScaleRotationTranslation {
            scale: cur.read_f32()?,
            rotation: cur.read_f32x4()?,
            translation: cur.read_f32x3()?,
        }),
        KIND_MATRIX => {
            let mut m = [0.0f32; 12];
            for slot in &mut m {
                *slot = cur.read_f32()?;
            }
            Some(Transform::Matrix(m))
        }
        other => return Err(PackError::InvalidTransformKind(other)),
    };
    Ok(transform)
}
