use pagoda_garden::{
    app::AppEvent,
    resources::{
        loading::{Finished, LoadingManager, ProgressBar},
        resolve_relative,
    },
    world::{ModelKind, TextureSlot},
};

fn started_manager() -> LoadingManager {
    let mut manager = LoadingManager::new();
    for slot in TextureSlot::ALL {
        manager.item_start(slot.url());
    }
    manager
}

#[test]
fn should_start_with_an_empty_visible_bar() {
    let bar = ProgressBar::new();
    assert_eq!(bar.scale_x(), 0.0);
    assert!(bar.visible());
    assert_eq!(bar.css_transform(), "scaleX(0)");
}

#[test]
fn should_scale_bar_by_loaded_fraction_at_every_event() {
    let mut manager = started_manager();
    let mut bar = ProgressBar::new();

    for (done, slot) in TextureSlot::ALL.iter().enumerate() {
        let progress = manager.item_end(slot.url());
        bar.on_progress(&progress);
        assert_eq!(progress.items_loaded, done + 1);
        assert_eq!(progress.items_total, 4);
        assert_eq!(bar.scale_x(), progress.items_loaded as f32 / progress.items_total as f32);
    }
    assert_eq!(bar.scale_x(), 1.0);
    assert!(!bar.visible());
    assert!(manager.is_complete());
}

#[test]
fn should_stay_visible_until_the_last_texture() {
    let mut manager = started_manager();
    let mut bar = ProgressBar::new();
    for slot in &TextureSlot::ALL[..3] {
        bar.on_progress(&manager.item_end(slot.url()));
    }
    assert!(bar.visible());
    assert_eq!(bar.css_transform(), "scaleX(0.75)");
}

#[test]
fn should_count_failed_loads_as_finished() {
    let mut manager = started_manager();
    let mut bar = ProgressBar::new();
    let error = anyhow::anyhow!("404");

    bar.on_progress(&manager.item_end(TextureSlot::Grass.url()));
    bar.on_progress(&manager.item_error(TextureSlot::Center.url(), &error));
    bar.on_progress(&manager.item_end(TextureSlot::BaseNormal.url()));
    bar.on_progress(&manager.item_error(TextureSlot::MidNormal.url(), &error));

    assert_eq!(manager.failed(), ["textures/center.jpg", "textures/NormalMap2.png"]);
    assert_eq!(bar.scale_x(), 1.0);
    assert!(!bar.visible());
}

#[test]
fn should_never_report_more_loaded_than_started() {
    let mut manager = LoadingManager::new();
    manager.item_start("a.png");
    manager.item_end("a.png");
    let progress = manager.item_end("a.png");
    assert_eq!(progress.items_loaded, 1);
    assert_eq!(progress.ratio(), 1.0);
}

#[test]
fn should_resolve_material_paths_next_to_the_model() {
    assert_eq!(resolve_relative("models/fruit-tree.obj", "fruit-tree.mtl"), "models/fruit-tree.mtl");
    assert_eq!(resolve_relative("models/fruit-tree.obj", "maps\\bark.png"), "models/maps/bark.png");
    assert_eq!(resolve_relative("tree.obj", "tree.mtl"), "tree.mtl");
    assert_eq!(resolve_relative("models/tree.obj", "/textures/leaf.png"), "textures/leaf.png");
}

#[test]
fn should_leave_progress_untouched_by_model_and_skybox_events() {
    let mut manager = started_manager();
    let mut bar = ProgressBar::new();
    let events = [
        AppEvent::Skybox(Err(anyhow::anyhow!("missing face"))),
        AppEvent::Model {
            kind: ModelKind::Balloon,
            result: Err(anyhow::anyhow!("404")),
        },
        AppEvent::Model {
            kind: ModelKind::Tree,
            result: Err(anyhow::anyhow!("404")),
        },
    ];
    for event in &events {
        assert!(manager.finish(&mut bar, event.finished()).is_none(), "{event:?}");
    }
    assert_eq!(manager.items_loaded(), 0);
    assert_eq!(manager.items_total(), 4);
    assert!(manager.failed().is_empty());
    assert_eq!(bar, ProgressBar::new());
}

#[test]
fn should_advance_progress_for_failed_texture_events() {
    let mut manager = started_manager();
    let mut bar = ProgressBar::new();
    let event = AppEvent::Texture {
        slot: TextureSlot::Grass,
        result: Err(anyhow::anyhow!("decode failed")),
    };

    let progress = manager.finish(&mut bar, event.finished());
    assert_eq!(progress.map(|p| p.items_loaded), Some(1));
    assert_eq!(manager.failed(), [TextureSlot::Grass.url()]);
    assert_eq!(bar.css_transform(), "scaleX(0.25)");

    manager.finish(&mut bar, Finished::Loaded(TextureSlot::Center.url()));
    assert_eq!(bar.scale_x(), 0.5);
    assert!(bar.visible());
}
