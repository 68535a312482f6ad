//! Persisted window geometry and marker position
//!
//! Settings live in a namespaced binary key-value store. Every access is a
//! scoped open/read-or-write/close sequence, and every failure falls back
//! to defaults: persistence is best-effort and never reaches the user.
//!
//! Value layout (native endian, compatible with earlier releases):
//! - `windowRect`: four i32 (left, top, right, bottom)
//! - `markerPresent`: one-byte bool (four-byte flags are accepted on read)
//! - `markerPos`: two i32 (x, y), only written while a marker exists

use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::core::{Point, Rect};

pub const WINDOW_RECT_VALUE: &str = "windowRect";
pub const MARKER_PRESENT_VALUE: &str = "markerPresent";
pub const MARKER_POS_VALUE: &str = "markerPos";

const RECT_LEN: usize = 16;
const POINT_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to open settings location {key}: code {code}")]
    OpenFailed { key: String, code: i32 },
    #[error("Settings value {name} not found")]
    NotFound { name: String },
    #[error("Failed to read settings value {name}: code {code}")]
    ReadFailed { name: String, code: i32 },
    #[error("Failed to write settings value {name}: code {code}")]
    WriteFailed { name: String, code: i32 },
}

/// Durable key-value store for binary settings values
///
/// Implementations must not keep the underlying location open between
/// calls.
pub trait SettingsStore {
    fn read_binary(&self, name: &str) -> Result<Vec<u8>, StoreError>;

    /// Writes all values within one open/close scope
    fn write_binary(&mut self, values: &[(&str, &[u8])]) -> Result<(), StoreError>;
}

/// Snapshot of the state that survives restarts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistedSettings {
    pub window_rect: Rect,
    pub marker: Option<Point>,
}

impl PersistedSettings {
    pub fn new(window_rect: Rect, marker: Option<Point>) -> Self {
        Self {
            window_rect,
            marker,
        }
    }
}

/// Writes the settings, logging and swallowing any store failure
pub fn save<S: SettingsStore + ?Sized>(store: &mut S, settings: &PersistedSettings) {
    let rect = encode_rect(settings.window_rect);
    let present = [u8::from(settings.marker.is_some())];
    let position = settings.marker.map(encode_point);

    let mut values: Vec<(&str, &[u8])> = vec![
        (WINDOW_RECT_VALUE, &rect[..]),
        (MARKER_PRESENT_VALUE, &present[..]),
    ];
    if let Some(position) = position.as_ref() {
        values.push((MARKER_POS_VALUE, &position[..]));
    }

    match store.write_binary(&values) {
        Ok(()) => debug!(rect = ?settings.window_rect, marker = ?settings.marker, "settings saved"),
        Err(err) => warn!(%err, "failed to save settings"),
    }
}

/// Reads the settings, substituting defaults for anything missing or malformed
pub fn load<S: SettingsStore + ?Sized>(store: &S, default_rect: Rect) -> PersistedSettings {
    let window_rect = read_value(store, WINDOW_RECT_VALUE)
        .and_then(|bytes| decode_rect(&bytes))
        .filter(Rect::is_valid)
        .unwrap_or(default_rect);

    let marker_present = read_value(store, MARKER_PRESENT_VALUE)
        .and_then(|bytes| decode_flag(&bytes))
        .unwrap_or(false);

    let marker = if marker_present {
        read_value(store, MARKER_POS_VALUE).and_then(|bytes| decode_point(&bytes))
    } else {
        None
    };

    debug!(rect = ?window_rect, ?marker, "settings loaded");
    PersistedSettings::new(window_rect, marker)
}

fn read_value<S: SettingsStore + ?Sized>(store: &S, name: &str) -> Option<Vec<u8>> {
    match store.read_binary(name) {
        Ok(bytes) => Some(bytes),
        Err(StoreError::NotFound { .. }) => None,
        Err(err) => {
            debug!(%err, "using default for unreadable settings value");
            None
        }
    }
}

fn encode_rect(rect: Rect) -> [u8; RECT_LEN] {
    let mut bytes = [0u8; RECT_LEN];
    for (chunk, value) in bytes
        .chunks_exact_mut(4)
        .zip([rect.left, rect.top, rect.right, rect.bottom])
    {
        chunk.copy_from_slice(&value.to_ne_bytes());
    }
    bytes
}

fn decode_rect(bytes: &[u8]) -> Option<Rect> {
    if bytes.len() != RECT_LEN {
        return None;
    }
    let values = decode_i32s::<4>(bytes);
    Some(Rect::new(values[0], values[1], values[2], values[3]))
}

fn encode_point(point: Point) -> [u8; POINT_LEN] {
    let mut bytes = [0u8; POINT_LEN];
    bytes[..4].copy_from_slice(&point.x.to_ne_bytes());
    bytes[4..].copy_from_slice(&point.y.to_ne_bytes());
    bytes
}

fn decode_point(bytes: &[u8]) -> Option<Point> {
    if bytes.len() != POINT_LEN {
        return None;
    }
    let values = decode_i32s::<2>(bytes);
    Some(Point::new(values[0], values[1]))
}

fn decode_flag(bytes: &[u8]) -> Option<bool> {
    match bytes.len() {
        1 | 4 => Some(bytes.iter().any(|byte| *byte != 0)),
        _ => None,
    }
}

fn decode_i32s<const N: usize>(bytes: &[u8]) -> [i32; N] {
    let mut values = [0i32; N];
    for (value, chunk) in values.iter_mut().zip(bytes.chunks_exact(4)) {
        *value = i32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    values
}

/// In-memory store for tests
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub values: std::collections::HashMap<String, Vec<u8>>,
    pub fail_writes: bool,
}

#[cfg(test)]
impl SettingsStore for MemoryStore {
    fn read_binary(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        self.values.get(name).cloned().ok_or_else(|| StoreError::NotFound {
            name: name.to_string(),
        })
    }

    fn write_binary(&mut self, values: &[(&str, &[u8])]) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::OpenFailed {
                key: "memory".to_string(),
                code: 5,
            });
        }
        for (name, bytes) in values {
            self.values.insert(name.to_string(), bytes.to_vec());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT_RECT: Rect = Rect::new(100, 100, 900, 600);

    #[test]
    fn empty_store_yields_defaults() {
        let store = MemoryStore::default();
        let settings = load(&store, DEFAULT_RECT);
        assert_eq!(settings, PersistedSettings::new(DEFAULT_RECT, None));
    }

    #[test]
    fn save_then_load_restores_rect_and_marker() {
        let mut store = MemoryStore::default();
        let saved = PersistedSettings::new(Rect::new(50, 50, 650, 450), Some(Point::new(150, 75)));
        save(&mut store, &saved);
        assert_eq!(load(&store, DEFAULT_RECT), saved);
    }

    #[test]
    fn save_then_load_without_marker() {
        let mut store = MemoryStore::default();
        let saved = PersistedSettings::new(Rect::new(-1200, -40, -200, 700), None);
        save(&mut store, &saved);
        assert_eq!(load(&store, DEFAULT_RECT), saved);
        assert!(!store.values.contains_key(MARKER_POS_VALUE));
    }

    #[test]
    fn clearing_marker_overrides_stale_position() {
        let mut store = MemoryStore::default();
        let rect = Rect::new(0, 0, 300, 200);
        save(&mut store, &PersistedSettings::new(rect, Some(Point::new(10, 20))));
        save(&mut store, &PersistedSettings::new(rect, None));

        // The old position stays in the store but the flag hides it
        assert!(store.values.contains_key(MARKER_POS_VALUE));
        assert_eq!(load(&store, DEFAULT_RECT).marker, None);
    }

    #[test]
    fn rect_uses_native_endian_layout() {
        let mut store = MemoryStore::default();
        save(&mut store, &PersistedSettings::new(Rect::new(1, 2, 3, 4), None));

        let mut expected = Vec::new();
        for value in [1i32, 2, 3, 4] {
            expected.extend_from_slice(&value.to_ne_bytes());
        }
        assert_eq!(store.values[WINDOW_RECT_VALUE], expected);
        assert_eq!(store.values[MARKER_PRESENT_VALUE], vec![0]);
    }

    #[test]
    fn malformed_rect_falls_back_to_default() {
        let mut store = MemoryStore::default();
        store.values.insert(WINDOW_RECT_VALUE.to_string(), vec![1, 2, 3]);
        assert_eq!(load(&store, DEFAULT_RECT).window_rect, DEFAULT_RECT);
    }

    #[test]
    fn inverted_rect_falls_back_to_default() {
        let mut store = MemoryStore::default();
        save(&mut store, &PersistedSettings::new(Rect::new(500, 500, 100, 100), None));
        assert_eq!(load(&store, DEFAULT_RECT).window_rect, DEFAULT_RECT);
    }

    #[test]
    fn overflowing_rect_falls_back_to_default() {
        let mut store = MemoryStore::default();
        save(&mut store, &PersistedSettings::new(Rect::new(i32::MIN, 0, i32::MAX, 10), None));
        let loaded = load(&store, DEFAULT_RECT).window_rect;
        assert_eq!(loaded, DEFAULT_RECT);
        assert_eq!(loaded.width(), 800);
    }

    #[test]
    fn four_byte_flag_is_accepted() {
        let mut store = MemoryStore::default();
        store
            .values
            .insert(MARKER_PRESENT_VALUE.to_string(), 1u32.to_ne_bytes().to_vec());
        store.values.insert(
            MARKER_POS_VALUE.to_string(),
            encode_point(Point::new(7, -3)).to_vec(),
        );
        assert_eq!(load(&store, DEFAULT_RECT).marker, Some(Point::new(7, -3)));
    }

    #[test]
    fn present_flag_without_position_yields_no_marker() {
        let mut store = MemoryStore::default();
        store.values.insert(MARKER_PRESENT_VALUE.to_string(), vec![1]);
        assert_eq!(load(&store, DEFAULT_RECT).marker, None);
    }

    #[test]
    fn write_failure_is_swallowed() {
        let mut store = MemoryStore {
            fail_writes: true,
            ..MemoryStore::default()
        };
        save(&mut store, &PersistedSettings::new(Rect::new(0, 0, 10, 10), None));
        assert!(store.values.is_empty());
    }
}
