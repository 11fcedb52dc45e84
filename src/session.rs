//! Single-writer editing session.
//!
//! A [`Session`] owns the current image, both interaction regions, the
//! finalized selection, and the latest composite. Everything runs on the
//! caller's thread; there is one logical writer and no locking.
//!
//! ## Loads and stale completions
//!
//! Loading is split in two so that the slow part (reading bytes, parsing
//! metadata) can happen elsewhere:
//!
//! ```text
//! let ticket = session.begin_load();   // generation n
//! ...read file...
//! session.finish_load(ticket, ...);    // applied only if still generation n
//! ```
//!
//! Every `begin_load` (and `clear`) bumps the generation, so a completion
//! that arrives after a newer load was started is discarded as
//! [`LoadOutcome::Stale`], whatever order the completions arrive in.
//!
//! ## Selection lifecycle
//!
//! `propose` moves the live rectangle and withdraws any finalized one.
//! `complete_selection` finalizes the live rectangle. `compose` requires a
//! finalized selection and replaces the previous composite; changing mode,
//! display size, or the selection drops the old composite so quality is
//! never reported for a raster that no longer matches.

use crate::crop::{CropGeometry, CropRegion, SizeAdvisory};
use crate::imaging::{
    ComposeError, ComposeRequest, CompositeResult, ExportSettings, ImageBackend, compose, export,
};
use crate::metadata::{ImageAsset, MetadataError, MimeType};
use crate::placement::PlacementRegion;
use crate::quality::{QualityReport, estimate, estimate_from_metadata};
use crate::types::{Dimensions, PhysicalSize, SelectionMode, SelectionRect, TargetSpec};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No image loaded")]
    NoAsset,
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    #[error(transparent)]
    Compose(#[from] ComposeError),
}

/// Inputs that stay fixed for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub print: PhysicalSize,
    /// Configured export DPI; `None` exports at the default.
    pub dpi: Option<f64>,
    pub min_width_px: u32,
    pub initial_fill: f64,
    pub initial_scale: f64,
    pub background: [u8; 3],
}

impl Default for SessionSettings {
    fn default() -> Self {
        crate::config::PrintConfig::default().session_settings()
    }
}

/// Proof that a load was started; see [`Session::finish_load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct LoadTicket {
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    /// A newer load was started; this completion was dropped.
    Stale,
}

struct Loaded {
    asset: ImageAsset,
    crop: CropRegion,
    placement: PlacementRegion,
    displayed: Dimensions,
}

pub struct Session<B: ImageBackend> {
    backend: B,
    settings: SessionSettings,
    generation: u64,
    current: Option<Loaded>,
    mode: SelectionMode,
    completed: Option<SelectionRect>,
    composite: Option<CompositeResult>,
}

impl<B: ImageBackend> Session<B> {
    pub fn new(backend: B, settings: SessionSettings) -> Self {
        Self {
            backend,
            settings,
            generation: 0,
            current: None,
            mode: SelectionMode::default(),
            completed: None,
            composite: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Start a load. Any load started earlier becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Apply a load if `ticket` is still the newest.
    ///
    /// A rejected image leaves the session as it was.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        name: &str,
        mime: MimeType,
        bytes: Vec<u8>,
    ) -> Result<LoadOutcome, SessionError> {
        if ticket.generation != self.generation {
            log::debug!(
                "discarding stale load of {name} (generation {} < {})",
                ticket.generation,
                self.generation
            );
            return Ok(LoadOutcome::Stale);
        }

        let asset = ImageAsset::load(&self.backend, name, mime, bytes)?;
        let native = asset.metadata.dimensions();
        let frame = self.target()?.output_dimensions();

        let geometry = CropGeometry::new(native, self.settings.print, self.settings.min_width_px);
        let crop = CropRegion::initialize(geometry, self.settings.initial_fill);
        let placement = PlacementRegion::initialize(native, frame, self.settings.initial_scale);

        log::debug!("loaded {} ({native}, {})", asset.name, asset.mime);
        self.current = Some(Loaded {
            asset,
            crop,
            placement,
            displayed: native,
        });
        self.completed = None;
        self.composite = None;
        Ok(LoadOutcome::Loaded)
    }

    /// `begin_load` + `finish_load` in one step.
    pub fn load(&mut self, name: &str, mime: MimeType, bytes: Vec<u8>) -> Result<LoadOutcome, SessionError> {
        let ticket = self.begin_load();
        self.finish_load(ticket, name, mime, bytes)
    }

    /// Drop the current image. Pending loads become stale.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.current = None;
        self.completed = None;
        self.composite = None;
    }

    pub fn asset(&self) -> Option<&ImageAsset> {
        self.current.as_ref().map(|c| &c.asset)
    }

    /// Export target, with the default DPI applied when none is configured.
    pub fn target(&self) -> Result<TargetSpec, ComposeError> {
        Ok(TargetSpec::for_export(self.settings.print, self.settings.dpi)?)
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: SelectionMode) {
        if mode != self.mode {
            self.mode = mode;
            self.completed = None;
            self.composite = None;
        }
    }

    /// Size the image is shown at. Defaults to native size on load.
    pub fn set_display_size(&mut self, displayed: Dimensions) -> Result<(), SessionError> {
        let current = self.current.as_mut().ok_or(SessionError::NoAsset)?;
        current.displayed = Dimensions::new(displayed.width.max(1), displayed.height.max(1));
        self.completed = None;
        self.composite = None;
        Ok(())
    }

    pub fn display_size(&self) -> Option<Dimensions> {
        self.current.as_ref().map(|c| c.displayed)
    }

    /// Live rectangle of the active mode.
    pub fn selection(&self) -> Option<SelectionRect> {
        let current = self.current.as_ref()?;
        Some(match self.mode {
            SelectionMode::Crop => current.crop.selection(),
            SelectionMode::Placement => current.placement.selection(),
        })
    }

    /// Feed an interaction tick to the active region; returns the accepted rectangle.
    pub fn propose(&mut self, candidate: SelectionRect) -> Result<SelectionRect, SessionError> {
        let current = self.current.as_mut().ok_or(SessionError::NoAsset)?;
        let accepted = match self.mode {
            SelectionMode::Crop => current.crop.propose_change(candidate),
            SelectionMode::Placement => current.placement.propose_change(candidate),
        };
        self.completed = None;
        self.composite = None;
        Ok(accepted)
    }

    /// Finalize the live rectangle.
    pub fn complete_selection(&mut self) -> Result<SelectionRect, SessionError> {
        let selection = self.selection().ok_or(SessionError::NoAsset)?;
        if self.mode == SelectionMode::Crop {
            if let Some(advisory) = self.advisory() {
                log::warn!("{advisory}");
            }
        }
        self.completed = Some(selection);
        Ok(selection)
    }

    pub fn completed_selection(&self) -> Option<SelectionRect> {
        self.completed
    }

    /// Size advisory for the current crop, if any.
    pub fn advisory(&self) -> Option<&SizeAdvisory> {
        self.current.as_ref()?.crop.advisory()
    }

    pub fn crop_region(&self) -> Option<&CropRegion> {
        self.current.as_ref().map(|c| &c.crop)
    }

    pub fn placement_region(&self) -> Option<&PlacementRegion> {
        self.current.as_ref().map(|c| &c.placement)
    }

    /// Render the finalized selection, replacing any previous composite.
    pub fn compose(&mut self) -> Result<&CompositeResult, SessionError> {
        let current = self.current.as_ref().ok_or(SessionError::NoAsset)?;
        let request = ComposeRequest {
            selection: self.completed,
            mode: self.mode,
            target: self.target()?,
            displayed: current.displayed,
            background: self.settings.background,
        };
        self.composite = None;
        let result = compose(&self.backend, &current.asset, &request)?;
        Ok(&*self.composite.insert(result))
    }

    pub fn composite(&self) -> Option<&CompositeResult> {
        self.composite.as_ref()
    }

    /// Write the latest composite into `output_dir`.
    pub fn export(&self, output_dir: &Path, settings: ExportSettings) -> Result<PathBuf, SessionError> {
        let composite = self.composite.as_ref().ok_or(ComposeError::NotReady)?;
        let path = export(&self.backend, composite, output_dir, settings).map_err(ComposeError::from)?;
        Ok(path)
    }

    /// Quality of the latest composite; `Unknown` when there is none.
    pub fn quality(&self) -> QualityReport {
        estimate(
            self.composite.as_ref().map(CompositeResult::dimensions),
            self.settings.print,
        )
    }

    /// Quality of printing the whole source at the target size.
    pub fn source_quality(&self) -> QualityReport {
        estimate_from_metadata(self.asset().map(|a| &a.metadata), self.settings.print)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crop::AdvisoryKind;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::imaging::{ComposePlan, OutputFormat};
    use crate::quality::QualityTier;
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image::RgbImage::new(2, 2)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    fn session(w: u32, h: u32) -> Session<MockBackend> {
        Session::new(MockBackend::with_dimensions(w, h), SessionSettings::default())
    }

    #[test]
    fn load_initializes_crop() {
        let mut s = session(4000, 5000);
        assert_eq!(s.load("a.png", MimeType::Png, png_bytes()).unwrap(), LoadOutcome::Loaded);

        let rect = s.selection().unwrap();
        assert!((rect.width - 80.0).abs() < 1e-9);
        assert!(s.advisory().is_none());
        assert!(s.completed_selection().is_none());
    }

    #[test]
    fn stale_completion_is_discarded() {
        let mut s = session(4000, 5000);
        let first = s.begin_load();
        let second = s.begin_load();

        // Newer load finishes first
        assert_eq!(
            s.finish_load(second, "new.png", MimeType::Png, png_bytes()).unwrap(),
            LoadOutcome::Loaded
        );
        assert_eq!(
            s.finish_load(first, "old.png", MimeType::Png, png_bytes()).unwrap(),
            LoadOutcome::Stale
        );
        assert_eq!(s.asset().unwrap().name, "new.png");
    }

    #[test]
    fn clear_makes_pending_load_stale() {
        let mut s = session(4000, 5000);
        let ticket = s.begin_load();
        s.clear();
        assert_eq!(
            s.finish_load(ticket, "a.png", MimeType::Png, png_bytes()).unwrap(),
            LoadOutcome::Stale
        );
        assert!(s.asset().is_none());
    }

    #[test]
    fn rejected_load_keeps_previous_asset() {
        let mut s = session(4000, 5000);
        s.load("a.png", MimeType::Png, png_bytes()).unwrap();
        let err = s.load("b.jpg", MimeType::Jpeg, png_bytes()).unwrap_err();
        assert!(matches!(err, SessionError::Metadata(MetadataError::UnsupportedType(_))));
        assert_eq!(s.asset().unwrap().name, "a.png");
    }

    #[test]
    fn compose_requires_finalized_selection() {
        let mut s = session(4000, 5000);
        s.load("a.png", MimeType::Png, png_bytes()).unwrap();
        assert!(matches!(
            s.compose(),
            Err(SessionError::Compose(ComposeError::NotReady))
        ));

        s.complete_selection().unwrap();
        let composite = s.compose().unwrap();
        assert_eq!(composite.dimensions(), Dimensions::new(2400, 3000));
    }

    #[test]
    fn propose_withdraws_completion_and_composite() {
        let mut s = session(4000, 5000);
        s.load("a.png", MimeType::Png, png_bytes()).unwrap();
        s.complete_selection().unwrap();
        s.compose().unwrap();

        s.propose(SelectionRect::new(0.0, 0.0, 50.0, 50.0)).unwrap();
        assert!(s.completed_selection().is_none());
        assert!(s.composite().is_none());
        assert_eq!(s.quality().tier, QualityTier::Unknown);
    }

    #[test]
    fn quality_follows_latest_composite() {
        let mut s = session(4000, 5000);
        s.load("a.png", MimeType::Png, png_bytes()).unwrap();
        s.complete_selection().unwrap();
        s.compose().unwrap();

        let report = s.quality();
        assert_eq!(report.dpi, Some(300));
        assert_eq!(report.tier, QualityTier::Excellent);
    }

    #[test]
    fn small_source_advisory_survives_edits() {
        let mut s = session(700, 900);
        s.load("a.png", MimeType::Png, png_bytes()).unwrap();
        assert_eq!(s.advisory().map(|a| a.kind), Some(AdvisoryKind::SourceTooSmall));

        s.propose(SelectionRect::full()).unwrap();
        s.complete_selection().unwrap();
        assert_eq!(s.advisory().map(|a| a.kind), Some(AdvisoryKind::SourceTooSmall));
        // Advisory does not block composing
        assert!(s.compose().is_ok());
    }

    #[test]
    fn placement_mode_plans_placement() {
        let mut s = session(4000, 5000);
        s.load("a.png", MimeType::Png, png_bytes()).unwrap();
        s.set_mode(SelectionMode::Placement);
        s.complete_selection().unwrap();
        s.compose().unwrap();

        let ops = s.backend().get_operations();
        assert!(matches!(
            ops.last(),
            Some(RecordedOp::Compose { plan: ComposePlan::Placement { destination }, .. })
                if destination.x == 0 && destination.width == 1000
        ));
    }

    #[test]
    fn set_mode_withdraws_completion() {
        let mut s = session(4000, 5000);
        s.load("a.png", MimeType::Png, png_bytes()).unwrap();
        s.complete_selection().unwrap();
        s.set_mode(SelectionMode::Placement);
        assert!(s.completed_selection().is_none());
    }

    #[test]
    fn set_display_size_withdraws_completion_and_composite() {
        let mut s = session(4000, 5000);
        s.load("a.png", MimeType::Png, png_bytes()).unwrap();
        s.complete_selection().unwrap();
        s.compose().unwrap();

        s.set_display_size(Dimensions::new(400, 500)).unwrap();
        assert!(s.completed_selection().is_none());
        assert!(s.composite().is_none());
        assert!(matches!(s.compose(), Err(SessionError::Compose(ComposeError::NotReady))));
    }

    #[test]
    fn display_size_scales_crop_mapping() {
        let mut s = session(4000, 5000);
        s.load("a.png", MimeType::Png, png_bytes()).unwrap();
        s.set_display_size(Dimensions::new(400, 500)).unwrap();
        s.propose(SelectionRect::new(10.0, 10.0, 20.0, 20.0)).unwrap();
        s.complete_selection().unwrap();
        s.compose().unwrap();

        let ops = s.backend().get_operations();
        assert!(matches!(
            ops.last(),
            Some(RecordedOp::Compose { plan: ComposePlan::Crop { source }, .. })
                if source.x == 400 && source.width == 800 && source.height == 1000
        ));
    }

    #[test]
    fn export_without_composite_is_not_ready() {
        let mut s = session(4000, 5000);
        s.load("a.png", MimeType::Png, png_bytes()).unwrap();
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(matches!(
            s.export(tmp.path(), ExportSettings::default()),
            Err(SessionError::Compose(ComposeError::NotReady))
        ));
    }

    #[test]
    fn export_writes_named_file() {
        let mut s = session(4000, 5000);
        s.load("a.png", MimeType::Png, png_bytes()).unwrap();
        s.complete_selection().unwrap();
        s.compose().unwrap();
        let tmp = tempfile::TempDir::new().unwrap();

        let path = s.export(tmp.path(), ExportSettings::default()).unwrap();
        assert!(path.ends_with("8x10_photo_print_quality.jpg"));
        assert!(matches!(
            s.backend().get_operations().last(),
            Some(RecordedOp::Encode { format: OutputFormat::Jpeg, dpi: 300, .. })
        ));
    }

    #[test]
    fn operations_without_asset_fail() {
        let mut s = session(4000, 5000);
        assert!(matches!(s.propose(SelectionRect::full()), Err(SessionError::NoAsset)));
        assert!(matches!(s.complete_selection(), Err(SessionError::NoAsset)));
        assert!(matches!(s.compose(), Err(SessionError::NoAsset)));
        assert_eq!(s.source_quality().tier, QualityTier::Unknown);
    }
}
