use pagoda_garden::{
    gui::DebugPanel,
    lights::LightRig,
    pipelines::ui::{UiBatch, UiScreen, UiVertex},
};

fn rect(x0: f32, y0: f32, x1: f32, y1: f32) -> egui::Rect {
    egui::Rect::from_min_max(egui::pos2(x0, y0), egui::pos2(x1, y1))
}

#[test]
fn should_scale_clip_rects_to_pixels_and_cut_them_to_the_screen() {
    let screen = UiScreen {
        size_in_pixels: [800, 600],
        pixels_per_point: 2.0,
    };
    assert_eq!(screen.size_in_points(), [400.0, 300.0]);
    assert_eq!(screen.scissor(rect(10.0, 20.0, 110.0, 70.0)), Some([20, 40, 200, 100]));
    assert_eq!(screen.scissor(rect(-50.0, -50.0, 1000.0, 1000.0)), Some([0, 0, 800, 600]));
    assert_eq!(screen.scissor(rect(500.0, 0.0, 600.0, 100.0)), None);
    assert_eq!(screen.scissor(rect(10.0, 10.0, 10.0, 50.0)), None);
}

#[test]
fn should_keep_egui_vertex_colors_premultiplied() {
    let vertex = egui::epaint::Vertex {
        pos: egui::pos2(3.0, 4.0),
        uv: egui::pos2(0.25, 0.5),
        color: egui::Color32::from_rgba_premultiplied(10, 20, 30, 40),
    };
    assert_eq!(
        UiVertex::from(&vertex),
        UiVertex {
            position: [3.0, 4.0],
            uv: [0.25, 0.5],
            color: [10, 20, 30, 40],
        }
    );
}

#[test]
fn should_batch_the_tessellated_panel() {
    let ctx = egui::Context::default();
    let panel = DebugPanel::for_lights();
    let mut rig = LightRig::garden();
    let screen = UiScreen {
        size_in_pixels: [1280, 720],
        pixels_per_point: 1.0,
    };

    let mut uploaded_fonts = false;
    let mut batches = Vec::new();
    for _ in 0..3 {
        let input = egui::RawInput {
            screen_rect: Some(rect(0.0, 0.0, 1280.0, 720.0)),
            ..Default::default()
        };
        let output = ctx.run(input, |ctx| {
            panel.ui(ctx, &mut rig);
        });
        uploaded_fonts |= !output.textures_delta.set.is_empty();
        let primitives = ctx.tessellate(output.shapes, output.pixels_per_point);
        batches = UiBatch::collect(&primitives, &screen);
    }

    assert!(uploaded_fonts);
    assert!(!batches.is_empty());
    for batch in &batches {
        assert_eq!(batch.indices.len() % 3, 0);
        assert!(batch.indices.iter().all(|i| (*i as usize) < batch.vertices.len()));
        let [x, y, w, h] = batch.scissor;
        assert!(w > 0 && h > 0);
        assert!(x + w <= 1280 && y + h <= 720);
    }
}
