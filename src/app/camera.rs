use eframe::egui::{Pos2, Vec2, vec2};

#[derive(Clone, Copy, Debug)]
pub(in crate::app) struct CameraConfig {
    pub(in crate::app) min_scale: f32,
    pub(in crate::app) max_scale: f32,
    pub(in crate::app) fit_min_scale: f32,
    pub(in crate::app) fit_max_scale: f32,
    pub(in crate::app) transition_secs: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.3,
            max_scale: 4.0,
            fit_min_scale: 0.35,
            fit_max_scale: 2.0,
            transition_secs: 0.6,
        }
    }
}

/// `screen = origin + translate + world * scale`, where `origin` is the canvas corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct CameraTransform {
    pub(in crate::app) translate: Vec2,
    pub(in crate::app) scale: f32,
}

impl CameraTransform {
    pub(in crate::app) const IDENTITY: Self = Self {
        translate: Vec2::ZERO,
        scale: 1.0,
    };

    pub(in crate::app) fn world_to_screen(self, origin: Pos2, world: Vec2) -> Pos2 {
        origin + self.translate + world * self.scale
    }

    pub(in crate::app) fn screen_to_world(self, origin: Pos2, screen: Pos2) -> Vec2 {
        (screen - origin - self.translate) / self.scale
    }

    fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            translate: self.translate + (other.translate - self.translate) * t,
            scale: self.scale + (other.scale - self.scale) * t,
        }
    }
}

fn ease_cubic_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[derive(Clone, Copy, Debug)]
struct Transition {
    from: CameraTransform,
    to: CameraTransform,
    started_at: f64,
}

pub(in crate::app) struct Camera {
    config: CameraConfig,
    transform: CameraTransform,
    transition: Option<Transition>,
}

impl Camera {
    pub(in crate::app) fn new(config: CameraConfig) -> Self {
        Self {
            config,
            transform: CameraTransform::IDENTITY,
            transition: None,
        }
    }

    pub(in crate::app) fn transform(&self) -> CameraTransform {
        self.transform
    }

    #[cfg(test)]
    pub(in crate::app) fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    /// Starts an eased transition toward `target`, replacing any running one.
    pub(in crate::app) fn animate_to(&mut self, target: CameraTransform, now: f64) {
        self.transition = Some(Transition {
            from: self.transform,
            to: target,
            started_at: now,
        });
    }

    /// Advances the running transition. Returns whether one is still in flight.
    pub(in crate::app) fn tick(&mut self, now: f64) -> bool {
        let Some(transition) = self.transition else {
            return false;
        };

        let elapsed = (now - transition.started_at).max(0.0);
        let progress = if self.config.transition_secs > 0.0 {
            (elapsed / self.config.transition_secs) as f32
        } else {
            1.0
        };

        if progress >= 1.0 {
            self.transform = transition.to;
            self.transition = None;
            return false;
        }

        self.transform = transition
            .from
            .lerp(transition.to, ease_cubic_in_out(progress));
        true
    }

    pub(in crate::app) fn pan_by(&mut self, delta: Vec2) {
        self.transition = None;
        self.transform.translate += delta;
    }

    /// Zooms by `factor` keeping the world point under `pointer` (canvas-local) fixed.
    pub(in crate::app) fn zoom_at(&mut self, pointer: Vec2, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }

        self.transition = None;
        let world_before = (pointer - self.transform.translate) / self.transform.scale;
        self.transform.scale =
            (self.transform.scale * factor).clamp(self.config.min_scale, self.config.max_scale);
        self.transform.translate = pointer - world_before * self.transform.scale;
    }

    /// Animates so `world` lands in the middle of the viewport. Returns `false`
    /// without touching the camera when the point is not finite yet.
    pub(in crate::app) fn focus_on(
        &mut self,
        world: Vec2,
        scale: f32,
        viewport: Vec2,
        now: f64,
    ) -> bool {
        if !world.x.is_finite() || !world.y.is_finite() {
            return false;
        }

        let scale = scale.clamp(self.config.min_scale, self.config.max_scale);
        let target = CameraTransform {
            translate: viewport * 0.5 - world * scale,
            scale,
        };
        self.animate_to(target, now);
        true
    }

    /// Animates so the padded bounding box of every finite point fills the viewport.
    pub(in crate::app) fn fit_points(
        &mut self,
        points: impl IntoIterator<Item = Vec2>,
        viewport: Vec2,
        padding: f32,
        max_scale: f32,
        now: f64,
    ) -> bool {
        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);
        let mut any = false;
        for point in points {
            if !point.x.is_finite() || !point.y.is_finite() {
                continue;
            }
            min = min.min(point);
            max = max.max(point);
            any = true;
        }

        if !any {
            return false;
        }

        let span = (max - min).max(vec2(1.0, 1.0));
        let available = viewport - vec2(padding, padding) * 2.0;
        let upper = self.config.fit_max_scale.min(max_scale).max(self.config.fit_min_scale);
        let scale = (available.x / span.x)
            .min(available.y / span.y)
            .clamp(self.config.fit_min_scale, upper);
        let center = (min + max) * 0.5;

        self.animate_to(
            CameraTransform {
                translate: viewport * 0.5 - center * scale,
                scale,
            },
            now,
        );
        true
    }
}
