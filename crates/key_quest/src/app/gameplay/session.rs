use engine::{InputAction, InputEdge, InputSnapshot, Vec2};
use tracing::{info, warn};

use super::enemy::Enemy;
use super::player::{DamageOutcome, MoveIntent, Player};
use super::stage::StageCatalog;
use super::tiles::{cell_index, TileKind, TileMap};
use super::{SCREEN_HEIGHT, SCREEN_WIDTH, TILE_SIZE};
use crate::app::config::{DoorMode, GameConfig};

const CAMERA_LAG: f32 = 10.0;
const CLEAR_DELAY_TICKS: u32 = 90;
const SHORT_MESSAGE_TICKS: u32 = 60;
const LONG_MESSAGE_TICKS: u32 = 90;
const DOOR_REACH_TILES: f32 = 2.5;

pub(crate) const KEY_MESSAGE: &str = "GOT THE KEY!";
pub(crate) const CLEAR_MESSAGE: &str = "STAGE CLEAR!";
pub(crate) const POTION_MESSAGE: &str = "LIFE RESTORED!";
pub(crate) const DOOR_OPENED_MESSAGE: &str = "THE DOOR OPENED! HURRY TO THE GOAL!";
pub(crate) const DOOR_TOO_FAR_MESSAGE: &str = "THE DOOR IS TOO FAR...";
pub(crate) const NO_ITEMS_MESSAGE: &str = "NO ITEMS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GameState {
    Title,
    Running,
    Menu,
    StageClear,
    GameOver,
    AllClear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Item {
    Potion,
    StageKey,
}

impl Item {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Item::Potion => "POTION",
            Item::StageKey => "STAGE KEY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MessageTone {
    Info,
    Success,
    Warning,
}

/// Transient centered message, shown while `ticks_left > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Message {
    pub(crate) text: &'static str,
    pub(crate) ticks_left: u32,
    pub(crate) tone: MessageTone,
}

impl Message {
    fn new(text: &'static str, ticks_left: u32, tone: MessageTone) -> Self {
        Self {
            text,
            ticks_left,
            tone,
        }
    }
}

/// All mutable game state. Advanced one fixed tick at a time by `update`.
#[derive(Debug)]
pub(crate) struct Session {
    catalog: StageCatalog,
    config: GameConfig,
    state: GameState,
    stage_number: u32,
    clear_timer: u32,
    map: Option<TileMap>,
    player: Option<Player>,
    enemies: Vec<Enemy>,
    camera: Vec2,
    message: Option<Message>,
    inventory: Vec<Item>,
    menu_cursor: usize,
}

impl Session {
    pub(crate) fn new(catalog: StageCatalog, config: GameConfig) -> Self {
        Self {
            catalog,
            config,
            state: GameState::Title,
            stage_number: 0,
            clear_timer: 0,
            map: None,
            player: None,
            enemies: Vec::new(),
            camera: Vec2::default(),
            message: None,
            inventory: Vec::new(),
            menu_cursor: 0,
        }
    }

    pub(crate) fn update(&mut self, input: &InputSnapshot) {
        if self.state != GameState::Title {
            self.tick_message();
        }
        match self.state {
            GameState::Title => {
                if input.was_pressed(InputEdge::Confirm) {
                    self.start_stage(1);
                }
            }
            GameState::Running => self.update_running(input),
            GameState::Menu => self.update_menu(input),
            GameState::StageClear => {
                self.clear_timer = self.clear_timer.saturating_sub(1);
                if self.clear_timer == 0 {
                    self.start_stage(self.stage_number + 1);
                }
            }
            GameState::GameOver | GameState::AllClear => {
                if input.was_pressed(InputEdge::Confirm) {
                    info!(from = ?self.state, "session_restart");
                    self.start_stage(1);
                }
            }
        }
    }

    fn tick_message(&mut self) {
        if let Some(message) = self.message.as_mut() {
            message.ticks_left = message.ticks_left.saturating_sub(1);
            if message.ticks_left == 0 {
                self.message = None;
            }
        }
    }

    fn show_message(&mut self, text: &'static str, ticks: u32, tone: MessageTone) {
        self.message = Some(Message::new(text, ticks, tone));
    }

    /// Fresh map, player, enemies and camera for `number`. Past the last
    /// stage the run is complete.
    fn start_stage(&mut self, number: u32) {
        let Some(stage) = self.catalog.get(number) else {
            self.enter_all_clear();
            return;
        };
        let map = stage.map.clone();
        let spawn = stage.spawn;
        let enemies = stage
            .enemies
            .iter()
            .map(|position| Enemy::spawn(position.x, position.y))
            .collect::<Vec<_>>();
        info!(
            stage = number,
            map = stage.map_name.as_str(),
            width = map.width(),
            height = map.height(),
            enemy_count = enemies.len(),
            "stage_loaded"
        );

        let player = Player::spawn(spawn.x, spawn.y);
        if player.body.overlaps_solid(&map, self.config.rules.door_mode) {
            warn!(stage = number, x = spawn.x, y = spawn.y, "stage_spawn_inside_wall");
        }

        self.stage_number = number;
        self.map = Some(map);
        self.player = Some(player);
        self.enemies = enemies;
        self.camera = Vec2::new(spawn.x - SCREEN_WIDTH / 2.0, spawn.y - SCREEN_HEIGHT / 2.0);
        self.message = None;
        self.inventory = vec![Item::Potion];
        self.menu_cursor = 0;
        self.clear_timer = 0;
        self.state = GameState::Running;
    }

    fn enter_all_clear(&mut self) {
        info!(last_stage = self.stage_number, "all_stages_cleared");
        self.player = None;
        self.enemies.clear();
        self.state = GameState::AllClear;
    }

    fn update_running(&mut self, input: &InputSnapshot) {
        if input.was_pressed(InputEdge::MenuToggle) {
            self.state = GameState::Menu;
            return;
        }

        let rules = self.config.rules;
        let physics = self.config.physics;
        let stage_number = self.stage_number;
        let (Some(player), Some(map)) = (self.player.as_mut(), self.map.as_mut()) else {
            return;
        };

        player.intent = MoveIntent {
            left: input.is_down(InputAction::MoveLeft),
            right: input.is_down(InputAction::MoveRight),
            jump: input.is_down(InputAction::Jump),
        };
        player.update(map, &rules, &physics);

        let center = player.center();
        self.camera.x += (center.x - SCREEN_WIDTH / 2.0 - self.camera.x) / CAMERA_LAG;
        self.camera.y += (center.y - SCREEN_HEIGHT / 2.0 - self.camera.y) / CAMERA_LAG;

        let (col, row) = (cell_index(center.x), cell_index(center.y));
        match map.get(col, row) {
            Some(TileKind::Key) => {
                map.set(col, row, TileKind::Empty);
                player.has_key = true;
                if rules.door_mode == DoorMode::MenuKey {
                    self.inventory.push(Item::StageKey);
                }
                self.message = Some(Message::new(
                    KEY_MESSAGE,
                    SHORT_MESSAGE_TICKS,
                    MessageTone::Success,
                ));
                info!(stage = stage_number, col, row, "key_collected");
            }
            Some(TileKind::Goal) if rules.door_mode == DoorMode::MenuKey || player.has_key => {
                self.state = GameState::StageClear;
                self.clear_timer = CLEAR_DELAY_TICKS;
                self.message = Some(Message::new(
                    CLEAR_MESSAGE,
                    LONG_MESSAGE_TICKS,
                    MessageTone::Info,
                ));
                info!(stage = stage_number, "stage_cleared");
                return;
            }
            _ => {}
        }

        let mut defeated = false;
        self.enemies.retain_mut(|enemy| {
            enemy.update(map, &rules);
            if !player.body.rect.overlaps(&enemy.body.rect) {
                return true;
            }
            if enemy.is_stomped_by(&player.body.rect, player.body.vy) {
                player.bounce(physics.jump_strength);
                info!(stage = stage_number, "enemy_stomped");
                return false;
            }
            match player.take_damage(enemy.body.rect.center().x, rules.knockback) {
                DamageOutcome::Hurt => {
                    info!(stage = stage_number, health = player.health, "player_hurt");
                }
                DamageOutcome::Defeated => defeated = true,
                DamageOutcome::Ignored => {}
            }
            true
        });

        if defeated {
            self.state = GameState::GameOver;
            info!(stage = stage_number, "game_over");
        }
    }

    fn update_menu(&mut self, input: &InputSnapshot) {
        if input.was_pressed(InputEdge::MenuToggle) {
            self.state = GameState::Running;
            return;
        }
        let len = self.inventory.len();
        if len > 0 {
            if input.was_pressed(InputEdge::MenuUp) {
                self.menu_cursor = (self.menu_cursor + len - 1) % len;
            }
            if input.was_pressed(InputEdge::MenuDown) {
                self.menu_cursor = (self.menu_cursor + 1) % len;
            }
        }
        if input.was_pressed(InputEdge::MenuSelect) {
            self.use_selected_item();
        }
    }

    fn use_selected_item(&mut self) {
        let Some(item) = self.inventory.get(self.menu_cursor).copied() else {
            self.show_message(NO_ITEMS_MESSAGE, SHORT_MESSAGE_TICKS, MessageTone::Warning);
            return;
        };

        match item {
            Item::Potion => {
                self.inventory.remove(self.menu_cursor);
                if let Some(player) = self.player.as_mut() {
                    player.heal();
                    info!(health = player.health, "potion_used");
                }
                self.show_message(POTION_MESSAGE, SHORT_MESSAGE_TICKS, MessageTone::Info);
            }
            Item::StageKey => {
                let opened = self.open_doors_near_player();
                if opened > 0 {
                    self.inventory.remove(self.menu_cursor);
                    if let Some(player) = self.player.as_mut() {
                        player.has_key = false;
                    }
                    self.menu_cursor = 0;
                    info!(stage = self.stage_number, opened, "door_opened");
                    self.show_message(DOOR_OPENED_MESSAGE, LONG_MESSAGE_TICKS, MessageTone::Success);
                } else {
                    self.show_message(DOOR_TOO_FAR_MESSAGE, SHORT_MESSAGE_TICKS, MessageTone::Warning);
                }
            }
        }
        self.menu_cursor = self.menu_cursor.min(self.inventory.len().saturating_sub(1));
        self.state = GameState::Running;
    }

    /// Turns every door whose top-left corner is within reach of the
    /// player's center into a goal. Returns how many changed.
    fn open_doors_near_player(&mut self) -> usize {
        let (Some(player), Some(map)) = (self.player.as_ref(), self.map.as_mut()) else {
            return 0;
        };
        let center = player.center();
        let reach = TILE_SIZE * DOOR_REACH_TILES;
        let doors = map
            .cells()
            .filter(|(_, _, kind)| *kind == TileKind::Door)
            .filter(|(col, row, _)| {
                let dx = center.x - *col as f32 * TILE_SIZE;
                let dy = center.y - *row as f32 * TILE_SIZE;
                (dx * dx + dy * dy).sqrt() < reach
            })
            .map(|(col, row, _)| (col, row))
            .collect::<Vec<_>>();
        for (col, row) in &doors {
            map.set(*col, *row, TileKind::Goal);
        }
        doors.len()
    }

    pub(crate) fn stage_count(&self) -> usize {
        self.catalog.len()
    }

    pub(crate) fn state(&self) -> GameState {
        self.state
    }

    pub(crate) fn stage_number(&self) -> u32 {
        self.stage_number
    }

    pub(crate) fn map(&self) -> Option<&TileMap> {
        self.map.as_ref()
    }

    pub(crate) fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    pub(crate) fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub(crate) fn camera(&self) -> Vec2 {
        self.camera
    }

    pub(crate) fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    pub(crate) fn inventory(&self) -> &[Item] {
        &self.inventory
    }

    pub(crate) fn menu_cursor(&self) -> usize {
        self.menu_cursor
    }

    #[cfg(test)]
    pub(crate) fn player_mut(&mut self) -> Option<&mut Player> {
        self.player.as_mut()
    }

    #[cfg(test)]
    pub(crate) fn enemies_mut(&mut self) -> &mut Vec<Enemy> {
        &mut self.enemies
    }
}
