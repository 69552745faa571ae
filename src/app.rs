use crate::config::{
    load_rules, load_settings, project_paths, save_settings_atomic, warn_malformed, Paths, Settings,
};
use crate::input::{collect_input_nonblocking, map_event_to_action, KeyTracker, PlayerAction};
use crate::logging;
use crate::model::{Overlay, Phase, SoundCue};
use crate::render::{draw_text, draw_world, ui_overlay, Cell, Frame, Terminal, SETTINGS_ROWS};
use crate::sim::{GameAction, GameController, TickOutcome};
use crate::world::World;
use crossterm::style::Color;
use std::cmp::min;
use std::time::{Duration, Instant};
use tracing::info;

/// A cue's speech bubble stays up this long.
const BUBBLE_SECS: f32 = 1.5;

struct Bubble {
    cue: SoundCue,
    ttl: f32,
}

pub(crate) struct App {
    settings: Settings,
    paths: Paths,
    game: GameController,
    world: World,
    keys: KeyTracker,
    overlay: Overlay,
    settings_cursor: usize,
    bubble: Option<Bubble>,
    term: Terminal,
    should_quit: bool,
}

impl App {
    fn init() -> anyhow::Result<Self> {
        let paths = project_paths()?;
        let (settings, settings_err) = load_settings(&paths.settings_path);
        logging::init(&paths.log_path, &settings.log_level)?;
        if let Some(err) = settings_err {
            warn_malformed(&paths.settings_path, "settings", &err);
        }
        let rules = load_rules(&paths.rules_path);
        info!(seed = settings.seed, "starting dogpark");

        let world = World::new(settings.seed, &rules);
        let game = GameController::new(rules);

        let term = Terminal::begin()?;
        let keys = KeyTracker::new(
            term.release_events,
            Duration::from_millis(settings.key_hold_ms),
        );
        info!(release_events = term.release_events, "terminal ready");

        Ok(Self {
            settings,
            paths,
            game,
            world,
            keys,
            overlay: Overlay::None,
            settings_cursor: 0,
            bubble: None,
            term,
            should_quit: false,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let fps = self.settings.fps_cap.clamp(10, 240);
        let frame_dt = Duration::from_secs_f32(1.0 / fps as f32);
        let mut last_frame = Instant::now();

        while !self.should_quit {
            let _resized = self.term.resize_if_needed()?;

            // input
            let events = collect_input_nonblocking(frame_dt)?;
            let now = Instant::now();
            for ev in events {
                self.keys.observe(&ev, now);
                if let Some(action) = map_event_to_action(self.overlay, self.game.phase(), &ev) {
                    self.handle(action)?;
                    if self.should_quit {
                        break;
                    }
                }
            }

            // one tick per frame
            let max_dt = self.game.rules().max_frame_dt;
            let dt = now.saturating_duration_since(last_frame).as_secs_f32().min(max_dt);
            last_frame = now;
            self.step(dt, now)?;

            self.render_frame()?;

            // frame cap
            spin_sleep(frame_dt, Instant::now());
        }

        self.term.end()?;
        save_settings_atomic(&self.paths.settings_path, &self.settings)?;
        info!("bye");
        Ok(())
    }

    fn step(&mut self, dt: f32, now: Instant) -> anyhow::Result<()> {
        let raw = self.keys.snapshot(now);
        let out = self.game.tick(dt, &raw);

        advance_world(&mut self.game, &mut self.world, &out, dt);

        for cue in out.cues {
            self.cue(cue)?;
        }
        if let Some(b) = self.bubble.as_mut() {
            b.ttl -= dt;
            if b.ttl <= 0.0 {
                self.bubble = None;
            }
        }
        Ok(())
    }

    fn handle(&mut self, action: PlayerAction) -> anyhow::Result<()> {
        match action {
            PlayerAction::Game(act) => {
                let before = self.game.phase();
                if let Some(cue) = self.game.apply(act) {
                    self.cue(cue)?;
                }
                if act == GameAction::Restart && before != self.game.phase() {
                    self.world.reset();
                    self.keys.clear();
                    self.bubble = None;
                }
            }
            PlayerAction::HelpToggle => {
                self.overlay = match self.overlay {
                    Overlay::Help => Overlay::None,
                    _ => Overlay::Help,
                };
            }
            PlayerAction::SettingsOpen => {
                self.overlay = Overlay::Settings;
                self.settings_cursor = 0;
            }
            PlayerAction::SettingsMove(delta) => {
                let len = SETTINGS_ROWS as i32;
                self.settings_cursor = (self.settings_cursor as i32 + delta).rem_euclid(len) as usize;
            }
            PlayerAction::SettingsToggle => match self.settings_cursor {
                0 => self.settings.enable_braille = !self.settings.enable_braille,
                1 => self.settings.enable_color = !self.settings.enable_color,
                _ => self.settings.enable_bell = !self.settings.enable_bell,
            },
            PlayerAction::Back => self.overlay = Overlay::None,
            PlayerAction::Exit => self.should_quit = true,
        }
        Ok(())
    }

    fn cue(&mut self, cue: SoundCue) -> anyhow::Result<()> {
        self.bubble = Some(Bubble {
            cue,
            ttl: BUBBLE_SECS,
        });
        if self.settings.enable_bell {
            self.term.bell()?;
        }
        Ok(())
    }

    fn render_frame(&mut self) -> anyhow::Result<()> {
        self.term.cur.clear(Color::Black);

        let frame = Frame {
            pet: self.game.pet(),
            phase: self.game.phase(),
            message: self.game.message(),
            world: &self.world,
            settings: &self.settings,
            overlay: self.overlay,
            settings_cursor: self.settings_cursor,
            bubble: self.bubble.as_ref().map(|b| b.cue.bubble_text()),
            splash_lifetime: self.game.rules().splash_lifetime_secs,
        };
        draw_world(&mut self.term, &frame);
        ui_overlay(&mut self.term.cur, &frame);

        match (self.overlay, self.game.phase()) {
            (Overlay::Help, _) => self.draw_center_box(
                "How to play",
                "Keep your dog alive: health reaching zero ends the game.\n\
    Moving burns hunger and health; low hunger sours mood,\n\
    and a mood under 50 slowly eats away at health.\n\n\
    W walk, R run, J jump (hold), N/M or arrows turn.\n\
    E eat: refills hunger and mood but uses up food.\n\
    S sleep: full health and mood, but no moving for a bit.\n\
    P pet the dog.\n\n\
    Walk over apples to refill the food store.\n\
    Tab settings, Q quit the game, Esc exit.",
            ),
            (_, Phase::NotStarted) => {
                self.draw_center_box("Dogpark", "Your dog is waiting.\n\nPress Enter to start.")
            }
            (_, Phase::Over) => self.draw_center_box(
                "END!",
                "Your dog ran out of health.\n\nPress Enter to restart, or Esc to exit.",
            ),
            (_, Phase::Quit) => self.draw_center_box(
                "Game Quit",
                "Press Enter to restart, or Esc to exit.",
            ),
            (_, Phase::Running) => {}
        }

        self.term.present(true)?;
        Ok(())
    }

    fn draw_center_box(&mut self, title: &str, body: &str) {
        let w = self.term.cols;
        let h = self.term.rows;

        let bw = min(62, w.saturating_sub(4));
        let bh = min(16, h.saturating_sub(4));
        if bw < 4 || bh < 4 {
            return;
        }

        let x0 = (w - bw) / 2;
        let y0 = (h - bh) / 2;
        let buf = &mut self.term.cur;
        let mut put = |x: u16, y: u16, ch: char| {
            buf.set(
                x,
                y,
                Cell {
                    ch,
                    fg: Color::White,
                    bg: Color::Black,
                },
            )
        };

        // fill and border
        for y in y0..y0 + bh {
            for x in x0..x0 + bw {
                let edge_x = x == x0 || x == x0 + bw - 1;
                let edge_y = y == y0 || y == y0 + bh - 1;
                let ch = match (edge_x, edge_y) {
                    (true, true) => match (x == x0, y == y0) {
                        (true, true) => '┌',
                        (false, true) => '┐',
                        (true, false) => '└',
                        (false, false) => '┘',
                    },
                    (true, false) => '│',
                    (false, true) => '─',
                    (false, false) => ' ',
                };
                put(x, y, ch);
            }
        }

        draw_text(buf, x0 + 2, y0 + 1, title, Color::White, Color::Black);

        let mut yy = y0 + 3;
        for line in body.lines() {
            if yy >= y0 + bh - 1 {
                break;
            }
            draw_text(buf, x0 + 2, yy, line.trim_start(), Color::White, Color::Black);
            yy += 1;
        }
    }
}

/// Applies a tick's outcome to the world and feeds picked-up apples back to the game.
fn advance_world(game: &mut GameController, world: &mut World, out: &TickOutcome, dt: f32) {
    let rules = game.rules();
    let picked = if game.phase() == Phase::Running {
        world.ensure_apples(rules);
        world.step_dog(out, dt, rules);
        world.collect_apples(rules)
    } else {
        world.step_dog(&TickOutcome::default(), dt, rules);
        0
    };
    world.update_splashes(dt, rules);
    game.collect_apples(picked);
}

pub(crate) fn run() -> anyhow::Result<()> {
    let mut app = App::init()?;
    app.run()?;
    Ok(())
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Gait, RawInputs, Rules};

    fn game_and_world() -> (GameController, World) {
        let rules = Rules::default();
        let world = World::new(7, &rules);
        (GameController::new(rules), world)
    }

    #[test]
    fn apples_under_the_dog_refill_the_food_store() {
        let (mut game, mut world) = game_and_world();
        game.apply(GameAction::Start);
        advance_world(&mut game, &mut world, &TickOutcome::default(), 0.0);
        assert!(world.apples.is_spawned());

        // eat a bit, then drop an apple right on the dog
        game.tick(1.0, &RawInputs { eat: true, ..RawInputs::default() });
        let before = game.pet().food;
        let collected = world.apples.collected;
        assert!(!world.apples.apples.is_empty());
        let (x, z) = (world.dog.x, world.dog.z);
        world.apples.apples[0].x = x;
        world.apples.apples[0].z = z;
        advance_world(&mut game, &mut world, &TickOutcome::default(), 0.0);

        assert!(game.pet().food > before);
        assert_eq!(world.apples.collected, collected + 1);
    }

    #[test]
    fn the_dog_stays_put_outside_a_running_game() {
        let (mut game, mut world) = game_and_world();
        let start = (world.dog.x, world.dog.z);
        let walking = TickOutcome {
            gait: Some(Gait::Walk),
            ..TickOutcome::default()
        };
        advance_world(&mut game, &mut world, &walking, 0.1);
        assert_eq!((world.dog.x, world.dog.z), start);
        assert!(!world.apples.is_spawned());
    }
}
