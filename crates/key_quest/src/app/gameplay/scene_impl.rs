use engine::{
    text_height_px, InputSnapshot, Panel, Scene, SceneWorld, Sprite, TextAlign, TextItem,
    TileShape, TileStyle, Tilemap,
};
use tracing::{info, warn};

use super::session::{GameState, MessageTone, Session};
use super::tiles::{TileKind, TileMap};
use super::{SCREEN_HEIGHT, SCREEN_WIDTH, TILE_SIZE};

const WHITE: [u8; 4] = [255, 255, 255, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];
const GREEN: [u8; 4] = [0, 200, 0, 255];
const BLUE: [u8; 4] = [0, 100, 200, 255];
const RED: [u8; 4] = [255, 0, 0, 255];
const YELLOW: [u8; 4] = [255, 215, 0, 255];
const BROWN: [u8; 4] = [139, 69, 19, 255];
const PURPLE: [u8; 4] = [150, 0, 200, 255];
const MENU_SHADE: [u8; 4] = [0, 0, 0, 180];

const HUD_SCALE: i32 = 3;
const MESSAGE_SCALE: i32 = 4;
const BANNER_SCALE: i32 = 6;
const HINT_SCALE: i32 = 3;

const TITLE_TEXT: &str = "Key Quest - Space to Start";
const MENU_TITLE: &str = "--- ITEM MENU ---";
const MENU_X: i32 = 300;
const MENU_TITLE_Y: i32 = 140;
const MENU_FIRST_ITEM_Y: i32 = 200;
const MENU_ITEM_SPACING: i32 = 50;
const MESSAGE_CENTER_Y: i32 = 200;
const RESTART_HINT: &str = "PRESS SPACE TO PLAY AGAIN";

fn tile_style(kind: TileKind) -> TileStyle {
    let (shape, color, sprite_key) = match kind {
        TileKind::Empty => (TileShape::Empty, WHITE, None),
        TileKind::Wall => (TileShape::Filled, GREEN, Some("tile/wall")),
        TileKind::Key => (TileShape::Ellipse, YELLOW, Some("tile/key")),
        TileKind::Door => (TileShape::Filled, BROWN, Some("tile/door")),
        TileKind::Goal => (TileShape::Filled, PURPLE, Some("tile/goal")),
    };
    TileStyle {
        shape,
        color,
        sprite_key,
    }
}

fn message_color(tone: MessageTone) -> [u8; 4] {
    match tone {
        MessageTone::Info => BLUE,
        MessageTone::Success => GREEN,
        MessageTone::Warning => RED,
    }
}

fn screen_center_x() -> i32 {
    (SCREEN_WIDTH / 2.0) as i32
}

fn centered_text(text: &str, center_y: i32, color: [u8; 4], scale: i32) -> TextItem {
    TextItem {
        text: text.to_string(),
        x: screen_center_x(),
        y: center_y - text_height_px(scale) / 2,
        align: TextAlign::Center,
        color,
        scale,
    }
}

/// Adapts the session to the engine: advances it once per tick and rebuilds
/// the frame's draw lists from its state.
pub(crate) struct KeyQuestScene {
    session: Session,
    synced_stage: Option<u32>,
}

impl KeyQuestScene {
    pub(crate) fn new(session: Session) -> Self {
        Self {
            session,
            synced_stage: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn session(&self) -> &Session {
        &self.session
    }

    /// Builds the render tilemap when a stage starts, then patches only the
    /// cells that changed since the last tick.
    fn sync_tilemap(&mut self, world: &mut SceneWorld) {
        let Some(map) = self.session.map() else {
            if self.synced_stage.take().is_some() {
                world.clear_tilemap();
            }
            return;
        };
        let stage = self.session.stage_number();
        if self.synced_stage == Some(stage) {
            if let Some(tilemap) = world.tilemap_mut() {
                if patch_tilemap(tilemap, map) {
                    return;
                }
            }
        }
        match build_tilemap(map) {
            Ok(tilemap) => {
                world.set_tilemap(tilemap);
                self.synced_stage = Some(stage);
            }
            Err(error) => {
                warn!(stage, error = %error, "tilemap_sync_failed");
                world.clear_tilemap();
                self.synced_stage = None;
            }
        }
    }

    fn push_actors(&self, world: &mut SceneWorld) {
        if let Some(player) = self.session.player() {
            world.push_sprite(Sprite {
                rect: player.body.rect,
                color: BLUE,
                visible: player.is_visible(),
                sprite_key: Some("actor/player"),
            });
        }
        for enemy in self.session.enemies() {
            world.push_sprite(Sprite {
                rect: enemy.body.rect,
                color: RED,
                visible: true,
                sprite_key: Some("actor/enemy"),
            });
        }
    }

    fn push_hud(&self, world: &mut SceneWorld) {
        let health = self.session.player().map_or(0, |player| player.health);
        world.push_text(TextItem {
            text: format!("STAGE {} | LIFE: {}", self.session.stage_number(), health),
            x: 20,
            y: 20,
            align: TextAlign::Left,
            color: BLACK,
            scale: HUD_SCALE,
        });
        if let Some(message) = self.session.message() {
            world.push_text(centered_text(
                message.text,
                MESSAGE_CENTER_Y,
                message_color(message.tone),
                MESSAGE_SCALE,
            ));
        }
    }

    fn push_menu(&self, world: &mut SceneWorld) {
        world.push_panel(Panel {
            x: 0,
            y: 0,
            width: SCREEN_WIDTH as i32,
            height: SCREEN_HEIGHT as i32,
            color: MENU_SHADE,
        });
        world.push_text(TextItem {
            text: MENU_TITLE.to_string(),
            x: MENU_X,
            y: MENU_TITLE_Y,
            align: TextAlign::Left,
            color: WHITE,
            scale: MESSAGE_SCALE,
        });
        for (index, item) in self.session.inventory().iter().enumerate() {
            let selected = index == self.session.menu_cursor();
            let prefix = if selected { "> " } else { "  " };
            world.push_text(TextItem {
                text: format!("{prefix}{}", item.label()),
                x: MENU_X,
                y: MENU_FIRST_ITEM_Y + index as i32 * MENU_ITEM_SPACING,
                align: TextAlign::Left,
                color: if selected { YELLOW } else { WHITE },
                scale: MESSAGE_SCALE,
            });
        }
    }

    fn push_banner(&self, world: &mut SceneWorld, text: &str, color: [u8; 4]) {
        let center_y = (SCREEN_HEIGHT / 2.0) as i32;
        world.push_text(centered_text(text, center_y, color, BANNER_SCALE));
        world.push_text(centered_text(
            RESTART_HINT,
            center_y + text_height_px(BANNER_SCALE) + 20,
            BLACK,
            HINT_SCALE,
        ));
    }

    fn sync_world(&mut self, world: &mut SceneWorld) {
        world.begin_frame();
        let state = self.session.state();
        if state == GameState::Title {
            world.set_show_world(false);
            world.push_text(centered_text(
                TITLE_TEXT,
                (SCREEN_HEIGHT / 2.0) as i32,
                BLACK,
                MESSAGE_SCALE,
            ));
            return;
        }

        world.set_show_world(true);
        self.sync_tilemap(world);
        world.camera_mut().offset = self.session.camera();
        self.push_actors(world);
        self.push_hud(world);
        match state {
            GameState::Menu => self.push_menu(world),
            GameState::GameOver => self.push_banner(world, "GAME OVER", RED),
            GameState::AllClear => self.push_banner(world, "ALL STAGES CLEAR!", GREEN),
            GameState::Title | GameState::Running | GameState::StageClear => {}
        }
    }
}

fn build_tilemap(map: &TileMap) -> Result<Tilemap, engine::TilemapError> {
    Tilemap::new(map.width() as u32, map.height() as u32, TILE_SIZE, map.render_ids())
}

/// Returns false when the grids differ in size and need a rebuild.
fn patch_tilemap(tilemap: &mut Tilemap, map: &TileMap) -> bool {
    if tilemap.width() as usize != map.width() || tilemap.height() as usize != map.height() {
        return false;
    }
    for (col, row, kind) in map.cells() {
        tilemap.set_tile(col as u32, row as u32, kind.render_id());
    }
    true
}

impl Scene for KeyQuestScene {
    fn load(&mut self, world: &mut SceneWorld) {
        world.clear();
        world.set_clear_color(WHITE);
        for kind in TileKind::ALL {
            world.set_tile_style(kind.render_id(), tile_style(kind));
        }
        self.synced_stage = None;
        self.sync_world(world);
        info!(stage_count = self.session.stage_count(), "key_quest_scene_ready");
    }

    fn update(&mut self, input: &InputSnapshot, world: &mut SceneWorld) {
        self.session.update(input);
        self.sync_world(world);
    }

    fn unload(&mut self, world: &mut SceneWorld) {
        world.clear();
        self.synced_stage = None;
    }

    fn debug_title(&self) -> Option<String> {
        match self.session.state() {
            GameState::Title => None,
            state => Some(format!(
                "Key Quest - Stage {} ({state:?})",
                self.session.stage_number()
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use engine::{InputAction, InputEdge, UiElement};

    use super::*;
    use crate::app::config::GameConfig;
    use crate::app::gameplay::tests::single_stage_catalog;

    fn texts(world: &SceneWorld) -> Vec<String> {
        world
            .ui_elements()
            .iter()
            .filter_map(|element| match element {
                UiElement::Text(text) => Some(text.text.clone()),
                UiElement::Panel(_) => None,
            })
            .collect()
    }

    fn loaded_scene() -> (KeyQuestScene, SceneWorld) {
        let catalog = single_stage_catalog("10000000\n10000001\n10000001\n11111111");
        let mut scene = KeyQuestScene::new(Session::new(catalog, GameConfig::default()));
        let mut world = SceneWorld::default();
        scene.load(&mut world);
        (scene, world)
    }

    fn confirm() -> InputSnapshot {
        InputSnapshot::empty().with_pressed(InputEdge::Confirm, true)
    }

    #[test]
    fn title_hides_world_and_shows_prompt() {
        let (scene, world) = loaded_scene();
        assert!(!world.show_world());
        assert_eq!(texts(&world), vec![TITLE_TEXT.to_string()]);
        assert!(world.tilemap().is_none());
        assert_eq!(scene.debug_title(), None);
        assert_eq!(world.tile_style(TileKind::Key.render_id()).map(|s| s.shape), Some(TileShape::Ellipse));
    }

    #[test]
    fn running_frame_has_tilemap_actors_and_hud() {
        let (mut scene, mut world) = loaded_scene();
        scene.update(&confirm(), &mut world);

        assert!(world.show_world());
        let tilemap = world.tilemap().expect("tilemap");
        assert_eq!((tilemap.width(), tilemap.height()), (8, 4));
        assert_eq!(tilemap.tile_at(0, 3), Some(TileKind::Wall.render_id()));
        assert_eq!(world.sprites().len(), 2);
        assert_eq!(world.sprites()[0].color, BLUE);
        assert_eq!(world.sprites()[1].color, RED);
        assert_eq!(texts(&world), vec!["STAGE 1 | LIFE: 3".to_string()]);
        assert_eq!(world.camera().offset, scene.session().camera());
        assert_eq!(
            scene.debug_title().as_deref(),
            Some("Key Quest - Stage 1 (Running)")
        );
    }

    #[test]
    fn menu_frame_shows_overlay_and_highlights_cursor() {
        let (mut scene, mut world) = loaded_scene();
        scene.update(&confirm(), &mut world);
        scene.update(
            &InputSnapshot::empty().with_pressed(InputEdge::MenuToggle, true),
            &mut world,
        );

        let panel = world.ui_elements().iter().find_map(|element| match element {
            UiElement::Panel(panel) => Some(*panel),
            UiElement::Text(_) => None,
        });
        assert_eq!(panel.map(|panel| panel.color), Some(MENU_SHADE));
        let texts = texts(&world);
        assert!(texts.contains(&MENU_TITLE.to_string()));
        assert!(texts.contains(&"> POTION".to_string()));
    }

    #[test]
    fn game_over_frame_shows_banner() {
        let (mut scene, mut world) = loaded_scene();
        scene.update(&confirm(), &mut world);
        scene.session.player_mut().expect("player").health = 1;
        let player_rect = scene.session().player().expect("player").body.rect;
        let enemy = &mut scene.session.enemies_mut()[0];
        enemy.body.rect.x = player_rect.x;
        enemy.body.rect.y = player_rect.bottom() - enemy.body.rect.h;
        scene.update(&InputSnapshot::empty(), &mut world);

        assert_eq!(scene.session().state(), GameState::GameOver);
        let texts = texts(&world);
        assert!(texts.contains(&"GAME OVER".to_string()));
        assert!(texts.contains(&"STAGE 1 | LIFE: 0".to_string()));
    }

    #[test]
    fn tilemap_resyncs_when_cells_change() {
        let catalog = single_stage_catalog("1000000\n10K0001\n10K0001\n1111111");
        let mut scene = KeyQuestScene::new(Session::new(catalog, GameConfig::default()));
        let mut world = SceneWorld::default();
        scene.load(&mut world);
        scene.update(&confirm(), &mut world);
        assert_eq!(
            world.tilemap().and_then(|tilemap| tilemap.tile_at(2, 2)),
            Some(TileKind::Key.render_id())
        );

        let walk_right = InputSnapshot::empty().with_action_down(InputAction::MoveRight, true);
        for _ in 0..5 {
            scene.update(&walk_right, &mut world);
        }
        assert_eq!(
            world.tilemap().and_then(|tilemap| tilemap.tile_at(2, 2)),
            Some(TileKind::Empty.render_id())
        );
    }

    #[test]
    fn patching_updates_cells_in_place_and_refuses_resized_maps() {
        let mut map = TileMap::parse(Path::new("patch.txt"), "1K\n11").expect("map");
        let mut tilemap = build_tilemap(&map).expect("tilemap");
        map.set(1, 0, TileKind::Empty);

        assert!(patch_tilemap(&mut tilemap, &map));
        assert_eq!(tilemap.tile_at(1, 0), Some(TileKind::Empty.render_id()));
        assert_eq!(tilemap.tile_at(0, 1), Some(TileKind::Wall.render_id()));

        let wider = TileMap::parse(Path::new("wide.txt"), "100\n111").expect("map");
        assert!(!patch_tilemap(&mut tilemap, &wider));
    }
}
