use eframe::egui;
use nalgebra::Point2;
use projection::PixelRect;

use crate::scene::{Scene, SceneShape};

fn to_pos(p: &Point2<f64>) -> egui::Pos2 {
    egui::pos2(p.x as f32, p.y as f32)
}

fn to_rect(r: &PixelRect) -> egui::Rect {
    egui::Rect::from_min_size(
        egui::pos2(r.x as f32, r.y as f32),
        egui::vec2(r.width as f32, r.height as f32),
    )
}

/// Paint a built scene: the field texture, then markers, then overlay text.
pub fn paint(scene: &Scene, field: &egui::TextureHandle, painter: &egui::Painter) {
    let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
    painter.image(field.id(), to_rect(&scene.field), uv, egui::Color32::WHITE);

    for shape in scene.shapes() {
        paint_shape(shape, painter);
    }
}

fn paint_shape(shape: &SceneShape, painter: &egui::Painter) {
    match shape {
        SceneShape::Polygon { points, fill, outline, outline_width } => {
            painter.add(egui::Shape::convex_polygon(
                points.iter().map(to_pos).collect(),
                *fill,
                egui::Stroke::new(*outline_width, *outline),
            ));
        }
        SceneShape::Segment { from, to, width, color } => {
            painter.line_segment([to_pos(from), to_pos(to)], egui::Stroke::new(*width, *color));
        }
        SceneShape::Circle { center, radius, color } => {
            painter.circle_filled(to_pos(center), *radius as f32, *color);
        }
        SceneShape::Text { position, anchor, text, size, color, background } => {
            let font = egui::FontId::proportional(*size);
            match background {
                Some(fill) => {
                    let galley = painter.layout_no_wrap(text.clone(), font, *color);
                    let rect = anchor.anchor_size(to_pos(position), galley.size());
                    painter.rect_filled(rect.expand2(egui::vec2(10.0, 5.0)), 0.0, *fill);
                    painter.galley(rect.min, galley, *color);
                }
                None => {
                    painter.text(to_pos(position), *anchor, text, font, *color);
                }
            }
        }
    }
}
