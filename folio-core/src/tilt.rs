/// Pointer-driven tilt effect for gallery cards
use crate::frame::FrameSlot;
use crate::transform::TiltTransform;

/// Bounding rectangle of the tracked element, in client coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementBounds {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ElementBounds {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Whether the rectangle has a usable, finite area
    pub fn has_area(&self) -> bool {
        self.left.is_finite()
            && self.top.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }
}

/// Pointer position normalized to the element, both axes within [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
}

impl PointerSample {
    /// Normalize a client-space position against `bounds`.
    ///
    /// Returns `None` for degenerate bounds or a non-finite position.
    /// Positions just outside the rectangle are clamped onto its edge.
    pub fn from_client(client_x: f32, client_y: f32, bounds: &ElementBounds) -> Option<Self> {
        if !bounds.has_area() || !client_x.is_finite() || !client_y.is_finite() {
            return None;
        }

        let x = (client_x - bounds.left) / bounds.width;
        let y = (client_y - bounds.top) / bounds.height;

        Some(Self {
            x: x.clamp(0.0, 1.0),
            y: y.clamp(0.0, 1.0),
        })
    }
}

/// How the transform is written into the `transform` property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransformSyntax {
    /// `perspective(..) rotateX(..) rotateY(..) scale(..)`
    #[default]
    Functions,
    /// One precomposed `matrix3d(..)`
    Matrix,
}

/// Tuning for the tilt effect
#[derive(Debug, Clone, PartialEq)]
pub struct TiltConfig {
    /// Degrees of rotation across the full width/height of the element
    pub sensitivity: f32,
    /// Scale applied while the pointer hovers the element
    pub hover_scale: f32,
    pub perspective_px: f32,
    pub track_duration_ms: u32,
    pub track_easing: String,
    pub settle_duration_ms: u32,
    pub settle_easing: String,
    pub syntax: TransformSyntax,
}

impl Default for TiltConfig {
    fn default() -> Self {
        Self {
            sensitivity: 15.0,
            hover_scale: 1.05,
            perspective_px: 1000.0,
            track_duration_ms: 150,
            track_easing: "cubic-bezier(0.4, 0, 0.2, 1)".to_string(),
            settle_duration_ms: 600,
            settle_easing: "cubic-bezier(0.23, 1, 0.32, 1)".to_string(),
            syntax: TransformSyntax::Functions,
        }
    }
}

impl TiltConfig {
    /// Map a normalized sample to a transform
    pub fn transform_for(&self, sample: &PointerSample) -> TiltTransform {
        TiltTransform::new(
            (sample.y - 0.5) * self.sensitivity,
            (sample.x - 0.5) * -self.sensitivity,
            self.hover_scale,
        )
    }

    /// CSS `transform` value for `transform` in the configured syntax
    pub fn render(&self, transform: &TiltTransform) -> String {
        match self.syntax {
            TransformSyntax::Functions => transform.css(self.perspective_px),
            TransformSyntax::Matrix => transform.css_matrix(self.perspective_px),
        }
    }

    fn transition(duration_ms: u32, easing: &str) -> String {
        format!("transform {}ms {}", duration_ms, easing)
    }
}

/// Style properties to write onto the element
#[derive(Debug, Clone, PartialEq)]
pub struct TiltStyle {
    pub transform: String,
    pub transition: String,
}

/// Result of feeding a pointer move to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Nothing to do: degenerate bounds or the engine is detached
    Skipped,
    /// A frame is already scheduled; the pending transform was replaced
    Coalesced,
    /// The caller must schedule a frame and then call [`TiltEngine::on_frame`]
    RequestFrame,
}

/// Tilt state for one tracked element
#[derive(Debug)]
pub struct TiltEngine {
    config: TiltConfig,
    slot: FrameSlot<TiltTransform>,
    applied: TiltTransform,
    detached: bool,
}

impl TiltEngine {
    pub fn new(config: TiltConfig) -> Self {
        Self {
            config,
            slot: FrameSlot::new(),
            applied: TiltTransform::neutral(),
            detached: false,
        }
    }

    pub fn config(&self) -> &TiltConfig {
        &self.config
    }

    /// The last transform handed out for application
    pub fn applied(&self) -> TiltTransform {
        self.applied
    }

    pub fn is_frame_pending(&self) -> bool {
        self.slot.is_scheduled()
    }

    pub fn pointer_move(&mut self, client_x: f32, client_y: f32, bounds: ElementBounds) -> MoveOutcome {
        if self.detached {
            return MoveOutcome::Skipped;
        }
        let Some(sample) = PointerSample::from_client(client_x, client_y, &bounds) else {
            return MoveOutcome::Skipped;
        };

        let transform = self.config.transform_for(&sample);
        if self.slot.offer(transform) {
            MoveOutcome::RequestFrame
        } else {
            MoveOutcome::Coalesced
        }
    }

    /// Apply the most recent pending transform, if any
    pub fn on_frame(&mut self) -> Option<TiltStyle> {
        let transform = self.slot.take()?;
        if self.detached {
            return None;
        }

        self.applied = transform;
        Some(TiltStyle {
            transform: self.config.render(&transform),
            transition: TiltConfig::transition(
                self.config.track_duration_ms,
                &self.config.track_easing,
            ),
        })
    }

    /// Cancel pending work and settle back to neutral
    pub fn pointer_leave(&mut self) -> Option<TiltStyle> {
        self.slot.cancel();
        if self.detached {
            return None;
        }

        self.applied = TiltTransform::neutral();
        Some(TiltStyle {
            transform: self.config.render(&self.applied),
            transition: TiltConfig::transition(
                self.config.settle_duration_ms,
                &self.config.settle_easing,
            ),
        })
    }

    /// Stop tracking; nothing is applied after this
    pub fn detach(&mut self) {
        if self.slot.cancel() {
            tracing::debug!("tilt detached with a pending frame");
        }
        self.detached = true;
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }
}

impl Default for TiltEngine {
    fn default() -> Self {
        Self::new(TiltConfig::default())
    }
}
