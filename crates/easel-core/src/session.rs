//! The edit session: three buffers, a preview, and the rules for moving
//! between them.
//!
//! # States
//!
//! ```text
//!            load                begin_preview
//!   Empty ---------> Loaded -----------------> Previewing
//!     ^                ^  <-- commit/discard ---    |
//!     |                |                            |
//!     +---- unload ----+------- revert -------------+
//! ```
//!
//! `original` is fixed for the lifetime of a loaded image, `committed` only
//! changes on [`EditSession::commit`], and `pending` holds the result of the
//! one transform currently being previewed. Every redisplay goes through the
//! [`Presenter`] and refreshes the [`ViewTransform`] used to map canvas
//! points back to source pixels.

use std::path::Path;
use std::rc::Rc;

use ab_glyph::FontArc;
use log::{debug, info, warn};
use thiserror::Error;

use crate::config::EditorConfig;
use crate::decode::{decode_file, DecodeError, PixelBuffer};
use crate::encode::{encode_file, EncodeError};
use crate::ops::{self, TransformError};
use crate::view::{Point, SourcePoint, ViewTransform};

/// Errors surfaced by session operations.
///
/// Whatever the variant, a failed operation leaves the session's buffers and
/// state exactly as they were.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The operation needs a loaded image.
    #[error("No image loaded")]
    NotLoaded,

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    /// The configured font could not be read or parsed.
    #[error("Failed to load font {path}: {reason}")]
    Font { path: String, reason: String },
}

// ============================================================================
// Presentation
// ============================================================================

/// Receives every redisplay.
///
/// `preview` is already scaled to `view.display_width` x `view.display_height`.
pub trait Presenter {
    fn present(&mut self, preview: &PixelBuffer, view: &ViewTransform);
}

/// Discards frames.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn present(&mut self, _preview: &PixelBuffer, _view: &ViewTransform) {}
}

/// Keeps the most recent frame.
#[derive(Debug, Default, Clone)]
pub struct LatestFrame {
    pub frame: Option<PixelBuffer>,
    pub view: Option<ViewTransform>,
    /// Number of frames presented so far.
    pub presented: usize,
}

impl Presenter for LatestFrame {
    fn present(&mut self, preview: &PixelBuffer, view: &ViewTransform) {
        self.frame = Some(preview.clone());
        self.view = Some(*view);
        self.presented += 1;
    }
}

/// Best system match for `family`, falling back to the generic sans-serif face.
pub fn system_font(family: Option<&str>) -> Option<FontArc> {
    use font_kit::family_name::FamilyName;
    use font_kit::properties::Properties;
    use font_kit::source::SystemSource;

    let mut families: Vec<FamilyName> = family
        .map(|name| FamilyName::Title(name.to_string()))
        .into_iter()
        .collect();
    families.push(FamilyName::SansSerif);

    let handle = SystemSource::new()
        .select_best_match(&families, &Properties::new())
        .ok()?;
    let font = handle.load().ok()?;
    let bytes = font.copy_font_data()?;
    FontArc::try_from_vec((*bytes).clone()).ok()
}

// ============================================================================
// Session
// ============================================================================

/// Coarse session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No image loaded.
    Empty,
    /// All edits committed; `pending == committed`.
    Loaded,
    /// A transform result is shown but not yet committed.
    Previewing,
}

/// Family of the transform held in `pending`.
///
/// Strokes and orientation changes accumulate: a second stroke extends the
/// current stroke preview and a second rotate/flip composes with the first.
/// Anything else starts over from the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    Stroke,
    Orientation,
    Other,
}

impl PreviewKind {
    fn accumulates(self) -> bool {
        !matches!(self, PreviewKind::Other)
    }
}

/// Buffer a transform reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceBuffer {
    Committed,
    Original,
}

#[derive(Debug, Clone)]
struct Buffers {
    original: Rc<PixelBuffer>,
    committed: Rc<PixelBuffer>,
    pending: Rc<PixelBuffer>,
    preview: Option<PreviewKind>,
}

/// An editing session over one image.
///
/// Single-threaded by construction: buffers are shared through `Rc`, so the
/// three buffers are only copied when a transform actually produces new
/// pixels.
pub struct EditSession<P: Presenter = NullPresenter> {
    config: EditorConfig,
    presenter: P,
    font: Option<FontArc>,
    buffers: Option<Buffers>,
    view: ViewTransform,
}

impl<P: Presenter> EditSession<P> {
    pub fn new(config: EditorConfig, presenter: P) -> Self {
        Self {
            config,
            presenter,
            font: None,
            buffers: None,
            view: ViewTransform::default(),
        }
    }

    /// Read a TrueType/OpenType font for text overlays.
    pub fn load_font(&mut self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        let path = path.as_ref();
        let font_error = |reason: String| SessionError::Font {
            path: path.display().to_string(),
            reason,
        };

        let bytes = std::fs::read(path).map_err(|e| font_error(e.to_string()))?;
        let font = FontArc::try_from_vec(bytes).map_err(|e| font_error(e.to_string()))?;
        debug!("Loaded font {}", path.display());
        self.font = Some(font);
        Ok(())
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Font for text overlays.
    ///
    /// Falls back to a system font (the configured `font_family`, else the
    /// generic sans-serif face) when none was loaded. The match is cached.
    pub(crate) fn text_font(&mut self) -> Option<FontArc> {
        if self.font.is_none() {
            self.font = system_font(self.config.font_family.as_deref());
            match &self.font {
                Some(_) => info!("Using system font for text"),
                None => warn!("No font configured and no system font found"),
            }
        }
        self.font.clone()
    }

    pub fn state(&self) -> SessionState {
        match &self.buffers {
            None => SessionState::Empty,
            Some(b) if b.preview.is_some() => SessionState::Previewing,
            Some(_) => SessionState::Loaded,
        }
    }

    /// Transform of the most recent redisplay.
    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn original(&self) -> Option<&PixelBuffer> {
        self.buffers.as_ref().map(|b| b.original.as_ref())
    }

    pub fn committed(&self) -> Option<&PixelBuffer> {
        self.buffers.as_ref().map(|b| b.committed.as_ref())
    }

    pub fn pending(&self) -> Option<&PixelBuffer> {
        self.buffers.as_ref().map(|b| b.pending.as_ref())
    }

    /// Family of the transform being previewed, if any.
    pub fn preview_kind(&self) -> Option<PreviewKind> {
        self.buffers.as_ref().and_then(|b| b.preview)
    }

    /// Map a canvas point to source pixels using the current view.
    pub fn map_to_source(&self, point: Point) -> SourcePoint {
        self.view.map_to_source(point)
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Replace whatever is loaded with `buffer`.
    ///
    /// All three buffers start out equal and the session is `Loaded`.
    pub fn load(&mut self, buffer: PixelBuffer) -> Result<(), SessionError> {
        if buffer.is_empty() || !buffer.is_well_formed() {
            warn!("Rejected empty image {}x{}", buffer.width, buffer.height);
            return Err(DecodeError::EmptyImage {
                width: buffer.width,
                height: buffer.height,
            }
            .into());
        }

        let (view, frame) = self.render(&buffer)?;
        let shared = Rc::new(buffer);
        info!("Loaded {}x{} image", shared.width, shared.height);

        self.buffers = Some(Buffers {
            original: Rc::clone(&shared),
            committed: Rc::clone(&shared),
            pending: shared,
            preview: None,
        });
        self.show(view, &frame);
        Ok(())
    }

    /// Decode `path` and load it. On failure the session is unchanged.
    pub fn load_path(&mut self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        let path = path.as_ref();
        let buffer = decode_file(path).inspect_err(|e| warn!("Failed to load {}: {}", path.display(), e))?;
        self.load(buffer)
    }

    /// Drop all buffers and return to `Empty`.
    pub fn unload(&mut self) {
        if self.buffers.take().is_some() {
            info!("Unloaded image");
        }
        self.view = ViewTransform::default();
    }

    // ------------------------------------------------------------------------
    // Preview / commit
    // ------------------------------------------------------------------------

    /// Preview `transform` applied to the committed buffer.
    pub fn begin_preview<F>(&mut self, transform: F) -> Result<(), SessionError>
    where
        F: FnOnce(&PixelBuffer) -> Result<PixelBuffer, TransformError>,
    {
        self.preview_with(PreviewKind::Other, SourceBuffer::Committed, transform)
    }

    /// Preview `transform` of the given family, reading from `source`.
    ///
    /// When both the current preview and `kind` are the same accumulating
    /// family, the transform reads `pending` instead so the two compose.
    pub fn preview_with<F>(
        &mut self,
        kind: PreviewKind,
        source: SourceBuffer,
        transform: F,
    ) -> Result<(), SessionError>
    where
        F: FnOnce(&PixelBuffer) -> Result<PixelBuffer, TransformError>,
    {
        let buffers = self.require_loaded("preview")?;

        let input = if kind.accumulates() && buffers.preview == Some(kind) {
            &buffers.pending
        } else {
            match source {
                SourceBuffer::Committed => &buffers.committed,
                SourceBuffer::Original => &buffers.original,
            }
        };

        let result = transform(input).inspect_err(|e| warn!("Transform failed: {}", e))?;
        let (view, frame) = self.render(&result)?;
        debug!(
            "Previewing {:?} result {}x{} from {:?}",
            kind, result.width, result.height, source
        );

        if let Some(buffers) = self.buffers.as_mut() {
            buffers.pending = Rc::new(result);
            buffers.preview = Some(kind);
        }
        self.show(view, &frame);
        Ok(())
    }

    /// Accept the previewed result. A no-op when nothing is being previewed.
    pub fn commit(&mut self) -> Result<(), SessionError> {
        self.require_loaded("commit")?;
        let Some(buffers) = self.buffers.as_mut() else {
            return Err(SessionError::NotLoaded);
        };
        if buffers.preview.take().is_none() {
            debug!("Commit with nothing pending");
            return Ok(());
        }

        buffers.committed = Rc::clone(&buffers.pending);
        let committed = Rc::clone(&buffers.committed);
        info!("Committed {}x{} edit", committed.width, committed.height);
        self.redisplay(&committed)
    }

    /// Drop the previewed result and show the committed buffer again.
    pub fn discard(&mut self) -> Result<(), SessionError> {
        self.require_loaded("discard")?;
        let Some(buffers) = self.buffers.as_mut() else {
            return Err(SessionError::NotLoaded);
        };
        if buffers.preview.take().is_some() {
            debug!("Discarded pending edit");
        }

        buffers.pending = Rc::clone(&buffers.committed);
        let committed = Rc::clone(&buffers.committed);
        self.redisplay(&committed)
    }

    /// Throw away every edit and go back to the original.
    pub fn revert(&mut self) -> Result<(), SessionError> {
        self.require_loaded("revert")?;
        let Some(buffers) = self.buffers.as_mut() else {
            return Err(SessionError::NotLoaded);
        };

        buffers.committed = Rc::clone(&buffers.original);
        buffers.pending = Rc::clone(&buffers.original);
        buffers.preview = None;
        let original = Rc::clone(&buffers.original);
        info!("Reverted all changes");
        self.redisplay(&original)
    }

    /// Encode the committed buffer to `path`. Buffers are never touched.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        let path = path.as_ref();
        let buffers = self.require_loaded("save")?;
        if buffers.preview.is_some() {
            warn!("Saving committed image; pending edit is not included");
        }

        encode_file(&buffers.committed, path, self.config.jpeg_quality)
            .inspect_err(|e| warn!("Failed to save {}: {}", path.display(), e))?;
        info!("Saved {}", path.display());
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn require_loaded(&self, operation: &str) -> Result<&Buffers, SessionError> {
        self.buffers.as_ref().ok_or_else(|| {
            warn!("Rejected {} with no image loaded", operation);
            SessionError::NotLoaded
        })
    }

    /// Scale `buffer` for display without touching any state.
    fn render(&self, buffer: &PixelBuffer) -> Result<(ViewTransform, PixelBuffer), TransformError> {
        let view = ViewTransform::fit(buffer.width, buffer.height, self.config.preview);
        let frame = ops::resize(
            buffer,
            view.display_width,
            view.display_height,
            self.config.preview_filter,
        )?;
        Ok((view, frame))
    }

    fn show(&mut self, view: ViewTransform, frame: &PixelBuffer) {
        debug!(
            "Display {}x{} (ratio {:.4})",
            view.display_width, view.display_height, view.ratio
        );
        self.presenter.present(frame, &view);
        self.view = view;
    }

    fn redisplay(&mut self, buffer: &PixelBuffer) -> Result<(), SessionError> {
        let (view, frame) = self.render(buffer)?;
        self.show(view, &frame);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::test_util::gradient;
    use crate::ops::{grayscale, negate};

    fn session() -> EditSession<LatestFrame> {
        EditSession::new(EditorConfig::default(), LatestFrame::default())
    }

    fn loaded(width: u32, height: u32) -> EditSession<LatestFrame> {
        let mut s = session();
        s.load(gradient(width, height)).unwrap();
        s
    }

    #[test]
    fn test_new_session_is_empty() {
        let s = session();
        assert_eq!(s.state(), SessionState::Empty);
        assert!(s.original().is_none());
        assert_eq!(s.presenter().presented, 0);
    }

    #[test]
    fn test_load_sets_all_buffers_equal() {
        let s = loaded(40, 30);
        assert_eq!(s.state(), SessionState::Loaded);
        assert_eq!(s.original(), s.committed());
        assert_eq!(s.committed(), s.pending());
        assert_eq!(s.presenter().presented, 1);
    }

    #[test]
    fn test_load_rejects_empty_buffer() {
        let mut s = session();
        let result = s.load(PixelBuffer::new(0, 0, vec![]));
        assert!(matches!(
            result,
            Err(SessionError::Decode(DecodeError::EmptyImage { .. }))
        ));
        assert_eq!(s.state(), SessionState::Empty);
    }

    #[test]
    fn test_load_path_failure_keeps_state() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.png");
        std::fs::write(&bad, b"not an image").unwrap();

        let mut s = session();
        assert!(matches!(s.load_path(&bad), Err(SessionError::Decode(_))));
        assert_eq!(s.state(), SessionState::Empty);

        let mut s = loaded(10, 10);
        let before = s.committed().cloned();
        assert!(s.load_path(&bad).is_err());
        assert_eq!(s.committed().cloned(), before);
    }

    #[test]
    fn test_operations_require_loaded_image() {
        let mut s = session();
        assert!(matches!(s.commit(), Err(SessionError::NotLoaded)));
        assert!(matches!(s.discard(), Err(SessionError::NotLoaded)));
        assert!(matches!(s.revert(), Err(SessionError::NotLoaded)));
        assert!(matches!(
            s.begin_preview(|b| Ok(negate(b))),
            Err(SessionError::NotLoaded)
        ));
        assert!(matches!(s.save("out.png"), Err(SessionError::NotLoaded)));
        assert_eq!(s.state(), SessionState::Empty);
        assert_eq!(s.presenter().presented, 0);
    }

    #[test]
    fn test_preview_then_commit() {
        let mut s = loaded(20, 20);
        let original = s.original().cloned().unwrap();

        s.begin_preview(|b| Ok(negate(b))).unwrap();
        assert_eq!(s.state(), SessionState::Previewing);
        assert_eq!(s.committed(), Some(&original));
        assert_eq!(s.pending(), Some(&negate(&original)));

        s.commit().unwrap();
        assert_eq!(s.state(), SessionState::Loaded);
        assert_eq!(s.committed(), Some(&negate(&original)));
        assert_eq!(s.original(), Some(&original));
    }

    #[test]
    fn test_preview_reads_committed_not_pending() {
        let mut s = loaded(8, 8);
        let original = s.original().cloned().unwrap();

        // Last write wins: the second preview replaces the first
        s.begin_preview(|b| Ok(negate(b))).unwrap();
        s.begin_preview(|b| Ok(negate(b))).unwrap();
        assert_eq!(s.pending(), Some(&negate(&original)));
    }

    #[test]
    fn test_discard_restores_committed() {
        let mut s = loaded(12, 9);
        let committed = s.committed().cloned();

        s.begin_preview(|b| Ok(grayscale(b))).unwrap();
        s.discard().unwrap();

        assert_eq!(s.state(), SessionState::Loaded);
        assert_eq!(s.committed().cloned(), committed);
        assert_eq!(s.pending().cloned(), committed);
    }

    #[test]
    fn test_commit_then_discard_is_idempotent() {
        let mut s = loaded(12, 9);
        s.begin_preview(|b| Ok(negate(b))).unwrap();
        s.commit().unwrap();
        let committed = s.committed().cloned();

        s.discard().unwrap();
        assert_eq!(s.committed().cloned(), committed);
        s.commit().unwrap();
        assert_eq!(s.committed().cloned(), committed);
        assert_eq!(s.state(), SessionState::Loaded);
    }

    #[test]
    fn test_failed_transform_leaves_state() {
        let mut s = loaded(10, 10);
        s.begin_preview(|b| Ok(negate(b))).unwrap();
        let pending = s.pending().cloned();
        let presented = s.presenter().presented;

        let result = s.begin_preview(|_| Err(TransformError::InvalidKernelSize(2)));
        assert!(matches!(result, Err(SessionError::Transform(_))));
        assert_eq!(s.state(), SessionState::Previewing);
        assert_eq!(s.pending().cloned(), pending);
        assert_eq!(s.presenter().presented, presented);
    }

    #[test]
    fn test_revert_after_commits_restores_original() {
        let mut s = loaded(30, 20);
        let original = s.original().cloned().unwrap();

        for _ in 0..3 {
            s.begin_preview(|b| Ok(negate(&grayscale(b)))).unwrap();
            s.commit().unwrap();
        }
        s.begin_preview(|b| Ok(negate(b))).unwrap();
        s.revert().unwrap();

        assert_eq!(s.state(), SessionState::Loaded);
        assert_eq!(s.committed(), Some(&original));
        assert_eq!(s.pending(), Some(&original));
    }

    #[test]
    fn test_grayscale_commit_revert_keeps_original_intact() {
        let mut s = loaded(16, 16);
        let original = s.original().cloned().unwrap();

        s.begin_preview(|b| Ok(grayscale(b))).unwrap();
        s.commit().unwrap();
        assert_ne!(s.committed(), Some(&original));
        s.revert().unwrap();

        assert_eq!(s.committed().unwrap().pixels, original.pixels);
    }

    #[test]
    fn test_original_source_reads_unedited_pixels() {
        let mut s = loaded(10, 10);
        let original = s.original().cloned().unwrap();
        s.begin_preview(|b| Ok(negate(b))).unwrap();
        s.commit().unwrap();

        s.preview_with(PreviewKind::Other, SourceBuffer::Original, |b| Ok(b.clone()))
            .unwrap();
        assert_eq!(s.pending(), Some(&original));
    }

    #[test]
    fn test_accumulating_previews_compose() {
        let mut s = loaded(10, 10);
        let committed = s.committed().cloned().unwrap();

        s.preview_with(PreviewKind::Orientation, SourceBuffer::Committed, |b| Ok(negate(b)))
            .unwrap();
        s.preview_with(PreviewKind::Orientation, SourceBuffer::Committed, |b| Ok(negate(b)))
            .unwrap();
        assert_eq!(s.pending(), Some(&committed));

        // A different family starts over from committed
        s.preview_with(PreviewKind::Stroke, SourceBuffer::Committed, |b| Ok(negate(b)))
            .unwrap();
        assert_eq!(s.pending(), Some(&negate(&committed)));
    }

    #[test]
    fn test_view_tracks_displayed_buffer() {
        let mut s = session();
        s.load(PixelBuffer::filled(600, 900, [1, 2, 3])).unwrap();

        let view = *s.view();
        assert_eq!((view.display_width, view.display_height), (266, 400));
        assert!((view.ratio - 2.25).abs() < 1e-12);

        let frame = s.presenter().frame.as_ref().unwrap();
        assert_eq!((frame.width, frame.height), (266, 400));

        // A smaller preview changes the ratio
        s.begin_preview(|b| {
            ops::apply_crop(
                b,
                &crate::selection::SelectionRect {
                    start: SourcePoint::new(0, 0),
                    end: SourcePoint::new(200, 100),
                },
            )
        })
        .unwrap();
        assert_eq!(s.view().ratio, 1.0);
        assert_eq!(s.map_to_source(Point::new(10.0, 10.0)), SourcePoint::new(10, 10));

        s.discard().unwrap();
        assert!((s.view().ratio - 2.25).abs() < 1e-12);
    }

    #[test]
    fn test_unload() {
        let mut s = loaded(10, 10);
        s.unload();
        assert_eq!(s.state(), SessionState::Empty);
        assert!(matches!(s.commit(), Err(SessionError::NotLoaded)));
    }

    #[test]
    fn test_save_writes_committed_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");

        let mut s = loaded(9, 7);
        let committed = s.committed().cloned().unwrap();
        s.begin_preview(|b| Ok(negate(b))).unwrap();
        s.save(&path).unwrap();

        assert_eq!(crate::decode::decode_file(&path).unwrap(), committed);
        assert_eq!(s.state(), SessionState::Previewing);
    }

    #[test]
    fn test_save_failure_leaves_buffers() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = loaded(9, 7);
        let committed = s.committed().cloned();

        let result = s.save(dir.path().join("out.unknown"));
        assert!(matches!(result, Err(SessionError::Encode(_))));
        assert_eq!(s.committed().cloned(), committed);

        s.discard().unwrap();
    }

    #[test]
    fn test_load_font_missing_file() {
        let mut s = session();
        assert!(matches!(
            s.load_font("/definitely/not/a/font.ttf"),
            Err(SessionError::Font { .. })
        ));
    }
}
