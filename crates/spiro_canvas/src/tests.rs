//! Canvas behaviour against the recording backend

use std::f32::consts::FRAC_PI_2;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use spiro_text::{BakedGlyph, GlyphAtlas};

use crate::prelude::*;
use crate::{BakedFont, ImageData};

fn canvas() -> Canvas<RecordingBackend> {
    Canvas::headless(RecordingBackend::new(), CanvasConfig::default())
}

/// 10px font whose only drawable glyph is 'A' (6x8, advance 7)
fn test_font() -> BakedFont {
    let mut glyphs = vec![None; 95];
    glyphs[0] = Some(BakedGlyph {
        uv: [0.0; 4],
        bearing_x: 0.0,
        bearing_y: 0.0,
        width: 0.0,
        height: 0.0,
        advance: 4.0,
    });
    glyphs['A' as usize - 32] = Some(BakedGlyph {
        uv: [0.0, 0.0, 0.5, 1.0],
        bearing_x: 1.0,
        bearing_y: 8.0,
        width: 6.0,
        height: 8.0,
        advance: 7.0,
    });
    let atlas = GlyphAtlas::from_pixels(2, 2, vec![0, 64, 128, 255]).unwrap();
    BakedFont::from_parts(atlas, glyphs, 10.0, 8.0, -2.0, 0.0)
}

fn image(width: u32, height: u32) -> ImageData {
    ImageData::from_rgba(vec![200; (width * height * 4) as usize], width, height).unwrap()
}

#[test]
fn test_stroke_path_draws_one_quad_per_segment() {
    let mut c = canvas();
    let pen = c.create_pen(Pen::new(2.0));
    let path = c.create_path();
    c.path_move_to(path, 0.0, 0.0);
    c.path_line_to(path, 10.0, 0.0);
    c.path_line_to(path, 10.0, 10.0);
    c.path_close(path);

    c.begin_frame().unwrap();
    c.set_pen(Some(pen));
    c.set_color(Color::RED);
    c.stroke_path(path);
    c.end_frame().unwrap();

    let draws = &c.backend().draws;
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].quad_count(), 3);
    assert!(draws[0].textures.is_empty());
    assert_eq!(c.frame_stats().quads, 3);
}

#[test]
fn test_stroke_without_pen_draws_nothing() {
    let mut c = canvas();
    let path = c.create_path();
    c.path_move_to(path, 0.0, 0.0);
    c.path_line_to(path, 10.0, 0.0);

    c.begin_frame().unwrap();
    c.stroke_path(path);
    c.draw_line(0.0, 0.0, 5.0, 5.0);
    c.end_frame().unwrap();
    assert!(c.backend().draws.is_empty());
}

#[test]
fn test_destroyed_handles_are_skipped() {
    let mut c = canvas();
    let pen = c.create_pen(Pen::default());
    let path = c.create_path();
    c.path_move_to(path, 0.0, 0.0);
    c.path_line_to(path, 10.0, 0.0);
    c.set_pen(Some(pen));

    c.destroy_path(path);
    c.path_line_to(path, 20.0, 0.0);
    c.begin_frame().unwrap();
    c.stroke_path(path);

    let live = c.create_path();
    c.path_move_to(live, 0.0, 0.0);
    c.path_line_to(live, 1.0, 0.0);
    c.destroy_pen(pen);
    c.stroke_path(live);
    c.end_frame().unwrap();

    assert!(c.backend().draws.is_empty());
    assert!(c.path(path).is_none());
}

#[test]
fn test_draw_line_uses_current_pen() {
    let mut c = canvas();
    let pen = c.create_pen(Pen::new(4.0));
    c.set_pen(Some(pen));
    c.begin_frame().unwrap();
    c.draw_line(0.0, 0.0, 0.0, 10.0);
    c.end_frame().unwrap();

    let v = &c.backend().draws[0].vertices;
    // Direction +y, normal -x, half width 2
    assert_eq!(v[0].position, [2.0, 0.0]);
    assert_eq!(v[2].position, [-2.0, 10.0]);
}

#[test]
fn test_draw_rect_matches_fill_rect() {
    let mut c = canvas();
    c.begin_frame().unwrap();
    c.fill_rect(1.0, 2.0, 3.0, 4.0);
    c.draw_rect(1.0, 2.0, 3.0, 4.0);
    c.end_frame().unwrap();

    let v = &c.backend().draws[0].vertices;
    assert_eq!(v.len(), 12);
    assert_eq!(v[..6], v[6..]);
}

#[test]
fn test_unsupported_shapes_are_noops() {
    let mut c = canvas();
    let path = c.create_path();
    c.begin_frame().unwrap();
    c.draw_circle(5.0, 5.0, 3.0);
    c.draw_ellipse(5.0, 5.0, 3.0, 2.0);
    c.fill_circle(5.0, 5.0, 3.0);
    c.path_arc_to(path, 0.0, 0.0, 1.0, 1.0, 1.0);
    c.path_cubic_bezier_to(path, 0.0, 0.0, 1.0, 1.0, 2.0, 2.0);
    c.fill_path(path);
    c.end_frame().unwrap();

    assert!(c.backend().draws.is_empty());
    assert!(c.path(path).unwrap().is_empty());
}

#[test]
fn test_save_restore_scopes_color_and_transform() {
    let mut c = canvas();
    c.begin_frame().unwrap();
    c.set_color(Color::RED);
    c.save();
    c.set_color(Color::BLUE);
    c.translate(100.0, 0.0);
    c.fill_rect(0.0, 0.0, 1.0, 1.0);
    c.restore();
    c.fill_rect(0.0, 0.0, 1.0, 1.0);
    // Extra restores keep the base state
    c.restore();
    c.restore();
    c.end_frame().unwrap();

    let v = &c.backend().draws[0].vertices;
    assert_eq!(v[0].color, Color::BLUE.to_array());
    assert_eq!(v[0].position, [100.0, 0.0]);
    assert_eq!(v[6].color, Color::RED.to_array());
    assert_eq!(v[6].position, [0.0, 0.0]);
    assert_eq!(c.renderer().state().depth(), 1);
}

#[test]
fn test_translate_then_rotate() {
    let mut c = canvas();
    c.begin_frame().unwrap();
    c.translate(10.0, 0.0);
    c.rotate(FRAC_PI_2);
    c.fill_rect(1.0, 0.0, 0.0, 0.0);
    c.end_frame().unwrap();

    let p = c.backend().draws[0].vertices[0].position;
    assert!((p[0] - 10.0).abs() < 1e-5);
    assert!((p[1] - 1.0).abs() < 1e-5);
}

#[test]
fn test_state_persists_across_frames() {
    let mut c = canvas();
    c.begin_frame().unwrap();
    c.set_color(Color::GREEN);
    c.end_frame().unwrap();

    c.begin_frame().unwrap();
    c.fill_rect(0.0, 0.0, 1.0, 1.0);
    c.end_frame().unwrap();
    assert_eq!(c.backend().draws[0].vertices[0].color, Color::GREEN.to_array());
}

#[test]
fn test_images_share_slots_within_batch() {
    let mut c = canvas();
    let a = c.create_image(&image(4, 4)).unwrap();
    let b = c.create_image(&image(2, 8)).unwrap();
    assert_eq!(c.image_size(b), Some((2, 8)));

    c.begin_frame().unwrap();
    c.draw_image(a, 0.0, 0.0);
    c.draw_image(b, 10.0, 0.0);
    c.draw_image(a, 20.0, 0.0);
    c.draw_image_rect(b, Rect::new(0.0, 0.0, 2.0, 4.0), Rect::new(0.0, 0.0, 20.0, 20.0));
    c.end_frame().unwrap();

    let draw = &c.backend().draws[0];
    assert_eq!(draw.textures.len(), 2);
    let slots: Vec<f32> = draw.vertices.iter().step_by(6).map(|v| v.tex_slot).collect();
    assert_eq!(slots, vec![0.0, 1.0, 0.0, 1.0]);
    assert_eq!(draw.vertices[20].tex_coord, [1.0, 0.5]);
}

#[test]
fn test_destroy_image_releases_texture() {
    let mut c = canvas();
    let img = c.create_image(&image(2, 2)).unwrap();
    assert_eq!(c.backend().texture_count(), 1);

    c.begin_frame().unwrap();
    c.draw_image(img, 0.0, 0.0);
    c.destroy_image(img);
    // The pending quad was flushed before the texture went away
    assert_eq!(c.backend().draws.len(), 1);
    assert_eq!(c.backend().texture_count(), 0);

    c.draw_image(img, 0.0, 0.0);
    c.end_frame().unwrap();
    assert_eq!(c.backend().draws.len(), 1);
    assert_eq!(c.image_size(img), None);
}

#[test]
fn test_draw_text() {
    let mut c = canvas();
    let font = c.add_baked_font(test_font()).unwrap();
    c.set_font(Some(font), 10.0);
    c.set_color(Color::YELLOW);

    c.begin_frame().unwrap();
    c.draw_text("A A\u{e9}\nA", 100.0, 50.0);
    c.end_frame().unwrap();

    let draw = &c.backend().draws[0];
    assert_eq!(draw.quad_count(), 3);
    assert_eq!(draw.textures.len(), 1);
    assert!(draw.vertices.iter().all(|v| v.color == Color::YELLOW.to_array()));
    // Third 'A' on the second line, back at the starting x
    assert_eq!(draw.vertices[12].position, [101.0, 60.0]);
}

#[test]
fn test_text_without_font_is_skipped() {
    let mut c = canvas();
    c.begin_frame().unwrap();
    c.draw_text("A", 0.0, 0.0);
    c.end_frame().unwrap();
    assert!(c.backend().draws.is_empty());
    assert_eq!(c.measure_text("A"), Rect::ZERO);
}

#[test]
fn test_measure_and_align_text() {
    let mut c = canvas();
    let font = c.add_baked_font(test_font()).unwrap();
    c.set_font(Some(font), 20.0);
    assert_eq!(c.measure_text("AA"), Rect::new(0.0, 0.0, 28.0, 20.0));

    c.begin_frame().unwrap();
    c.draw_text_aligned("AA", 100.0, 100.0, TextAlign::Center, TextBaseline::Middle);
    c.end_frame().unwrap();
    // Origin (86, 90); first glyph offset by bearing 2
    assert_eq!(c.backend().draws[0].vertices[0].position, [88.0, 90.0]);
}

#[test]
fn test_destroy_font() {
    let mut c = canvas();
    let font = c.add_baked_font(test_font()).unwrap();
    assert_eq!(c.backend().texture_count(), 1);
    c.set_font(Some(font), 10.0);
    c.destroy_font(font);
    assert_eq!(c.backend().texture_count(), 0);
    assert!(c.font(font).is_none());

    c.begin_frame().unwrap();
    c.draw_text("A", 0.0, 0.0);
    c.end_frame().unwrap();
    assert!(c.backend().draws.is_empty());
}

#[test]
fn test_clear_and_background() {
    let config = CanvasConfig::default().background(Color::BLACK);
    let mut c = Canvas::headless(RecordingBackend::new(), config);
    c.begin_frame().unwrap();
    c.fill_rect(0.0, 0.0, 1.0, 1.0);
    c.clear(Color::WHITE);
    c.end_frame().unwrap();

    assert_eq!(c.backend().clears, vec![Color::BLACK, Color::WHITE]);
    assert_eq!(c.backend().draws.len(), 1);
}

#[test]
fn test_resize_applies_next_frame() {
    let mut c = canvas();
    c.resize(320, 200);
    c.resize(0, 10);
    assert_eq!(c.size(), Size::new(320.0, 200.0));
    c.begin_frame().unwrap();
    let frame = c.backend().last_frame.unwrap();
    assert_eq!((frame.width, frame.height), (320, 200));
}

#[test]
fn test_terminated_canvas_refuses_frames() {
    let alive = Arc::new(AtomicBool::new(true));
    let mut c = Canvas::with_liveness(RecordingBackend::new(), CanvasConfig::default(), alive.clone());
    c.begin_frame().unwrap();
    c.fill_rect(0.0, 0.0, 1.0, 1.0);

    alive.store(false, Ordering::Release);
    c.fill_rect(0.0, 0.0, 1.0, 1.0);
    assert!(matches!(c.end_frame(), Err(CanvasError::Terminated)));
    assert!(matches!(c.begin_frame(), Err(CanvasError::Terminated)));
    assert!(c.backend().draws.is_empty());
    assert_eq!(c.renderer().batch().quad_count(), 1);
}

#[test]
fn test_log_level_setting() {
    let mut c = canvas();
    assert_eq!(c.log_level(), LogLevel::Trace);
    c.set_log_level(LogLevel::Off);
    c.draw_circle(0.0, 0.0, 1.0);
    assert_eq!(c.log_level(), LogLevel::Off);
}

#[test]
fn test_frame_stats_count_flushes() {
    let mut c = canvas();
    c.begin_frame().unwrap();
    c.fill_rect(0.0, 0.0, 1.0, 1.0);
    c.flush();
    c.fill_rect(0.0, 0.0, 1.0, 1.0);
    c.end_frame().unwrap();
    let stats = c.frame_stats();
    assert_eq!(stats.draw_calls, 2);
    assert_eq!(stats.quads, 2);
}
