//! PNG export: status tracking, error taxonomy and artifact packaging.
//!
//! Exports are serialized. While one is in flight the trigger is refused
//! with [`ExportError::Busy`], and a finished export leaves a transient
//! success or error status that reverts to idle after a display timeout.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDate;
use serde::Serialize;
use sld_render::RasterError;
use thiserror::Error;

pub const FILE_PREFIX: &str = "so-do-luoi-";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("render surface is not mounted")]
    SurfaceNotMounted,
    #[error("an export is already in progress")]
    Busy,
    #[error("diagram is empty")]
    EmptyDiagram,
    #[error("rasterization failed: {0}")]
    Rasterize(String),
    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

impl From<RasterError> for ExportError {
    fn from(err: RasterError) -> Self {
        match err {
            RasterError::Encode(cause) => ExportError::Encode(cause),
            other => ExportError::Rasterize(other.to_string()),
        }
    }
}

/// Toolbar-visible export state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ExportStatus {
    #[default]
    Idle,
    Exporting,
    Success,
    Error,
}

impl ExportStatus {
    /// Button caption for this state.
    pub fn caption(self) -> &'static str {
        match self {
            ExportStatus::Idle => "Xuất PNG",
            ExportStatus::Exporting => "Đang xuất...",
            ExportStatus::Success => "Đã xuất!",
            ExportStatus::Error => "Lỗi xuất",
        }
    }
}

/// A successful export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub png: Vec<u8>,
    pub data_url: String,
    pub file_name: String,
}

impl ExportArtifact {
    pub fn new(png: Vec<u8>, date: NaiveDate) -> Self {
        let data_url = png_data_url(&png);
        Self {
            png,
            data_url,
            file_name: export_file_name(date),
        }
    }
}

/// A started export holding the captured surface.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingExport {
    pub svg: String,
    pub scale: f32,
    pub date: NaiveDate,
}

/// `so-do-luoi-YYYY-MM-DD.png`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("{FILE_PREFIX}{}.png", date.format("%Y-%m-%d"))
}

pub fn png_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

/// Export status machine. Time is supplied by the caller in milliseconds.
#[derive(Debug, Clone)]
pub struct ExportTracker {
    status: ExportStatus,
    settled_at: u64,
    display_ms: u64,
}

impl ExportTracker {
    pub fn new(display_ms: u64) -> Self {
        Self {
            status: ExportStatus::Idle,
            settled_at: 0,
            display_ms,
        }
    }

    pub fn status(&self) -> ExportStatus {
        self.status
    }

    pub fn in_flight(&self) -> bool {
        self.status == ExportStatus::Exporting
    }

    /// Enter the exporting state, or refuse if one is already running.
    pub fn start(&mut self) -> Result<(), ExportError> {
        if self.in_flight() {
            return Err(ExportError::Busy);
        }
        self.status = ExportStatus::Exporting;
        Ok(())
    }

    pub fn succeed(&mut self, now_ms: u64) {
        self.status = ExportStatus::Success;
        self.settled_at = now_ms;
    }

    pub fn fail(&mut self, now_ms: u64) {
        self.status = ExportStatus::Error;
        self.settled_at = now_ms;
    }

    /// Revert a settled status once it has been shown long enough.
    /// Returns whether the status changed.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        let settled = matches!(self.status, ExportStatus::Success | ExportStatus::Error);
        if settled && now_ms.saturating_sub(self.settled_at) >= self.display_ms {
            self.status = ExportStatus::Idle;
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        if !self.in_flight() {
            self.status = ExportStatus::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn file_name_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(export_file_name(date), "so-do-luoi-2025-03-07.png");
    }

    #[test]
    fn data_url_is_base64_png() {
        assert_eq!(png_data_url(b"abc"), "data:image/png;base64,YWJj");
    }

    #[test]
    fn busy_while_in_flight() {
        let mut t = ExportTracker::new(3000);
        t.start().unwrap();
        assert_eq!(t.start(), Err(ExportError::Busy));
        t.succeed(10);
        assert!(t.start().is_ok());
    }

    #[test]
    fn settled_status_reverts_after_timeout() {
        let mut t = ExportTracker::new(3000);
        t.start().unwrap();
        t.fail(1_000);
        assert!(!t.tick(3_999));
        assert_eq!(t.status(), ExportStatus::Error);
        assert!(t.tick(4_000));
        assert_eq!(t.status(), ExportStatus::Idle);
        assert!(!t.tick(9_000));
    }

    #[test]
    fn exporting_never_times_out() {
        let mut t = ExportTracker::new(3000);
        t.start().unwrap();
        assert!(!t.tick(u64::MAX));
        assert_eq!(t.status(), ExportStatus::Exporting);
    }

    #[test]
    fn encode_failures_keep_their_category() {
        assert_eq!(
            ExportError::from(RasterError::Encode("disk".into())),
            ExportError::Encode("disk".into())
        );
        assert!(matches!(
            ExportError::from(RasterError::EmptySurface),
            ExportError::Rasterize(_)
        ));
    }
}
