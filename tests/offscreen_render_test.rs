#[cfg(feature = "integration-tests")]
mod common;

#[test]
#[cfg(feature = "integration-tests")]
fn should_render_hearts_on_a_blue_background() {
    use pagoda_garden::{
        data_structures::texture::Placeholders,
        frame::pose_at,
        offscreen::{OffscreenScene, TARGET_SIZE},
        pipelines::Layouts,
    };

    use crate::common::test_utils::Headless;

    futures::executor::block_on(async {
        let gpu = Headless::new().await.expect("headless device");
        let layouts = Layouts::new(&gpu.device);
        let placeholders = Placeholders::new(&gpu.device, &gpu.queue);
        let mut hearts = OffscreenScene::new(&gpu.device, &layouts, &placeholders);
        hearts.animate(&pose_at(0.0));

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("hearts") });
        hearts.render(&gpu.device, &gpu.queue, &mut encoder);
        let image = gpu
            .read_rgba(encoder, &hearts.texture().texture, [TARGET_SIZE, TARGET_SIZE])
            .await
            .expect("readback");

        let blue = image::Rgba([0, 0, 255, 255]);
        assert_eq!(*image.get_pixel(0, 0), blue);
        assert_eq!(*image.get_pixel(TARGET_SIZE - 1, TARGET_SIZE - 1), blue);
        assert_ne!(*image.get_pixel(TARGET_SIZE / 2, TARGET_SIZE / 2), blue);
    });
}
