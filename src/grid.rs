use serde::{Deserialize, Serialize};
use std::fmt;

/// Grid dimensions the device profile would pick without a user override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub num_columns: u32,
    pub num_rows: u32,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            num_columns: 4,
            num_rows: 5,
        }
    }
}

impl DeviceProfile {
    pub fn grid_size(&self) -> GridSize {
        GridSize::new(self.num_columns, self.num_rows)
    }
}

/// Workspace grid, persisted as `"<columns>x<rows>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    pub columns: u32,
    pub rows: u32,
}

impl GridSize {
    pub const MIN: u32 = 3;
    pub const MAX: u32 = 9;
    /// Initial picker value when nothing valid is stored.
    pub const PICKER_FALLBACK: GridSize = GridSize {
        columns: 4,
        rows: 5,
    };

    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    pub fn encode(&self) -> String {
        format!("{}x{}", self.columns, self.rows)
    }

    pub fn decode(raw: &str) -> Option<Self> {
        let (columns, rows) = raw.trim().split_once('x')?;
        let columns = columns.trim().parse::<u32>().ok()?;
        let rows = rows.trim().parse::<u32>().ok()?;
        if columns == 0 || rows == 0 {
            return None;
        }
        Some(Self { columns, rows })
    }

    /// Decodes a stored value, falling back to the device profile on absence or garbage.
    pub fn decode_or_default(raw: Option<&str>, profile: &DeviceProfile) -> Self {
        raw.and_then(Self::decode)
            .unwrap_or_else(|| profile.grid_size())
    }

    pub fn clamped(self) -> Self {
        Self {
            columns: self.columns.clamp(Self::MIN, Self::MAX),
            rows: self.rows.clamp(Self::MIN, Self::MAX),
        }
    }

    /// Starting value for the grid picker.
    pub fn picker_initial(raw: Option<&str>) -> Self {
        raw.and_then(Self::decode)
            .unwrap_or(Self::PICKER_FALLBACK)
            .clamped()
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
