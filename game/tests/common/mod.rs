#![allow(dead_code)]

use engine::{AssetStore, NullAudio, PointerEvent, SceneHandler, Touch, TouchPhase, Vec2, World};
use game::card::BACK_TEXTURE;
use game::{CardKind, CardScene, GameConfig};

pub const SCENE_SIZE: Vec2 = Vec2::new(1024.0, 768.0);
pub const CARD_SIZE: Vec2 = Vec2::new(100.0, 140.0);

pub const WOLF: usize = 0;
pub const BEAR: usize = 1;
pub const DRAGON: usize = 2;

pub fn assets() -> AssetStore {
    let mut assets = AssetStore::in_memory();
    assets.register_texture("bg_blank", SCENE_SIZE);
    assets.register_texture(BACK_TEXTURE, CARD_SIZE);
    for kind in CardKind::ALL {
        assets.register_texture(kind.art().front, CARD_SIZE);
        assets.register_texture(kind.art().large, CARD_SIZE * 2.5);
        assets.register_sound(kind.art().sound);
    }
    assets
}

/// Default table, dealt and ready for input.
pub fn table() -> (World, CardScene) {
    table_with(GameConfig::default())
}

pub fn table_with(config: GameConfig) -> (World, CardScene) {
    let mut world = World::new(SCENE_SIZE, assets());
    let mut scene = CardScene::new(config);
    scene.did_move(&mut world).expect("scene should deal");
    (world, scene)
}

pub fn touch(id: u64, phase: TouchPhase, at: Vec2, tap_count: u32) -> PointerEvent {
    PointerEvent::Touch(Touch {
        id,
        phase,
        location: at,
        tap_count,
    })
}

pub fn press(world: &mut World, scene: &mut CardScene, at: Vec2, tap_count: u32) {
    world.dispatch(scene, touch(1, TouchPhase::Began, at, tap_count));
}

pub fn drag(world: &mut World, scene: &mut CardScene, at: Vec2) {
    world.dispatch(scene, touch(1, TouchPhase::Moved, at, 1));
}

pub fn release(world: &mut World, scene: &mut CardScene, at: Vec2) {
    world.dispatch(scene, touch(1, TouchPhase::Ended, at, 1));
}

/// Single tap followed by the second press of a double tap, released.
pub fn double_press(world: &mut World, scene: &mut CardScene, at: Vec2) {
    press(world, scene, at, 1);
    release(world, scene, at);
    press(world, scene, at, 2);
    release(world, scene, at);
}

/// Runs frames until every one-shot animation has had time to finish.
pub fn settle(world: &mut World, scene: &mut CardScene) {
    for _ in 0..60 {
        world.advance(scene, 1.0 / 60.0, &mut NullAudio);
    }
}
