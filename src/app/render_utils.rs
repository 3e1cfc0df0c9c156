use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke};

use super::camera::CameraTransform;

const CLUSTER_PALETTE: [Color32; 10] = [
    Color32::from_rgb(98, 166, 230),
    Color32::from_rgb(240, 146, 74),
    Color32::from_rgb(102, 190, 121),
    Color32::from_rgb(226, 98, 104),
    Color32::from_rgb(168, 130, 214),
    Color32::from_rgb(176, 132, 104),
    Color32::from_rgb(226, 140, 198),
    Color32::from_rgb(150, 156, 164),
    Color32::from_rgb(196, 198, 92),
    Color32::from_rgb(84, 196, 210),
];
const ROOT_COLOR: Color32 = Color32::from_rgb(245, 206, 93);

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

/// Slot 0 is the root; slots from 1 follow the root's direct advisees.
pub(super) fn cluster_color(slot: usize) -> Color32 {
    if slot == 0 {
        ROOT_COLOR
    } else {
        CLUSTER_PALETTE[(slot - 1) % CLUSTER_PALETTE.len()]
    }
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, transform: CameraTransform) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (64.0 * transform.scale.clamp(0.6, 1.8)).max(24.0);
    let origin = rect.min + transform.translate;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 60));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2) -> bool {
    let min_x = start.x.min(end.x);
    let max_x = start.x.max(end.x);
    let min_y = start.y.min(end.y);
    let max_y = start.y.max(end.y);

    !(max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom())
}

/// On-screen radius, floored so tiny nodes stay clickable when zoomed out.
pub(super) fn screen_radius(radius: f32, scale: f32) -> f32 {
    (radius * scale).max(3.0)
}

/// Larger subtrees draw larger; the root gets an extra 15%.
pub(super) fn node_radius(
    total_descendants: u32,
    direct_advisees: u32,
    max_descendants: u32,
    is_root: bool,
) -> f32 {
    let subtree = crate::util::normalize(
        (total_descendants as f32).sqrt(),
        (max_descendants as f32).sqrt(),
    );
    let fan_out = (2.9 * (direct_advisees as f32).sqrt()).min(11.0);
    let radius = (10.0 + 42.0 * subtree + fan_out).max(11.0);
    if is_root { radius * 1.15 } else { radius }
}
