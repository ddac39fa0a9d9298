use std::collections::HashSet;

use pagoda_garden::world::{
    BALLOONS, DIRECTIONS, GROUND_SIZE, GROUND_TILE, ModelKind, PAGODA_PARTS, PAGODA_SPACING, PartSurface, SKYBOX_FACES,
    TextureSlot, pagoda_sites,
};

#[test]
fn should_build_twenty_four_distinct_sites() {
    let sites = pagoda_sites();
    assert_eq!(sites.len(), 24);

    let distinct: HashSet<(i32, i32)> = sites.iter().map(|s| (s.x as i32, s.z as i32)).collect();
    assert_eq!(distinct.len(), 24);
}

#[test]
fn should_keep_sites_on_principal_and_diagonal_directions() {
    for site in pagoda_sites() {
        assert_eq!(site.y, 0.0);
        let on_axis = site.x == 0.0 || site.z == 0.0;
        let on_diagonal = site.x.abs() == site.z.abs();
        assert!(on_axis || on_diagonal, "{site:?} is off every direction");

        for coordinate in [site.x, site.z] {
            let steps = coordinate / PAGODA_SPACING;
            assert_eq!(steps, steps.round(), "{site:?} is not on the 30 unit grid");
            assert!(steps.abs() <= 3.0);
        }
        assert!(site.x != 0.0 || site.z != 0.0, "no pagoda stands on the centerpiece");
    }
}

#[test]
fn should_place_three_pagodas_per_direction() {
    let sites = pagoda_sites();
    let direction = |v: f32| if v == 0.0 { 0.0 } else { v.signum() };
    for (dx, dz) in DIRECTIONS {
        let count = sites
            .iter()
            .filter(|s| direction(s.x) == dx && direction(s.z) == dz)
            .count();
        assert_eq!(count, 3, "direction ({dx}, {dz})");
    }
}

#[test]
fn should_stack_pagoda_parts_from_roof_to_base() {
    let heights: Vec<f32> = PAGODA_PARTS.iter().map(|p| p.offset_y).collect();
    assert_eq!(heights, vec![15.0, 11.0, 4.0, 1.0]);
    let colors: Vec<u32> = PAGODA_PARTS.iter().map(|p| p.color).collect();
    assert_eq!(colors, vec![0xEEDA03, 0xC4A287, 0xD45113, 0x813405]);

    let rendered: Vec<_> = PAGODA_PARTS
        .iter()
        .filter(|p| p.surface == PartSurface::RenderTarget)
        .map(|p| p.name)
        .collect();
    assert_eq!(rendered, vec!["orb"]);
    assert_eq!(PAGODA_PARTS[2].surface, PartSurface::NormalMap(TextureSlot::BaseNormal));
    assert_eq!(PAGODA_PARTS[3].surface, PartSurface::NormalMap(TextureSlot::MidNormal));
}

#[test]
fn should_give_every_balloon_its_own_color() {
    assert_eq!(BALLOONS.len(), 8);
    let colors: HashSet<u32> = BALLOONS.iter().map(|b| b.color).collect();
    assert_eq!(colors.len(), 8);
    assert!(BALLOONS.iter().all(|b| b.position[1] == -80.0));
}

#[test]
fn should_repeat_grass_ten_times_across_the_ground() {
    assert_eq!(GROUND_SIZE / GROUND_TILE, 10.0);
}

#[test]
fn should_track_only_the_four_scene_textures() {
    let urls: Vec<_> = TextureSlot::ALL.iter().map(|s| s.url()).collect();
    assert_eq!(
        urls,
        vec![
            "textures/grass.jpg",
            "textures/center.jpg",
            "textures/NormalMap3.png",
            "textures/NormalMap2.png"
        ]
    );
    let normal_maps = TextureSlot::ALL.iter().filter(|s| s.is_normal_map()).count();
    assert_eq!(normal_maps, 2);
    assert_eq!(TextureSlot::Grass.sampling().mag_filter, wgpu::FilterMode::Nearest);
    assert_eq!(TextureSlot::Grass.sampling().wrap, wgpu::AddressMode::Repeat);
}

#[test]
fn should_load_skybox_faces_in_cube_order() {
    let suffixes: Vec<_> = SKYBOX_FACES
        .iter()
        .map(|f| f.trim_start_matches("textures/miramar_").trim_end_matches(".jpg"))
        .collect();
    assert_eq!(suffixes, vec!["ft", "bk", "up", "dn", "rt", "lf"]);
    assert_eq!(ModelKind::Balloon.url(), "models/hotballoon.obj");
    assert_eq!(ModelKind::Tree.url(), "models/fruit-tree.obj");
}
