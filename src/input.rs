use crate::model::{Overlay, Phase, RawInputs};
use crate::sim::GameAction;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
pub(crate) struct InputEvent {
    pub(crate) key: KeyCode,
    pub(crate) mods: KeyModifiers,
    pub(crate) kind: KeyEventKind,
}

pub(crate) fn collect_input_nonblocking(max_frame_time: Duration) -> anyhow::Result<Vec<InputEvent>> {
    let mut out = Vec::new();

    // poll with a tiny timeout so we stay responsive
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        if let Event::Key(k) = event::read()? {
            out.push(InputEvent {
                key: k.code,
                mods: k.modifiers,
                kind: k.kind,
            });
            if out.len() >= 32 {
                break;
            }
        }
    }
    Ok(out)
}

/* -----------------------------
   Held keys
------------------------------ */

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum HeldKey {
    Walk,
    Run,
    Jump,
    Eat,
    TurnLeft,
    TurnRight,
}

pub(crate) fn held_key(code: KeyCode) -> Option<HeldKey> {
    match code {
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'w' => Some(HeldKey::Walk),
            'r' => Some(HeldKey::Run),
            'j' => Some(HeldKey::Jump),
            'e' => Some(HeldKey::Eat),
            'n' => Some(HeldKey::TurnLeft),
            'm' => Some(HeldKey::TurnRight),
            _ => None,
        },
        KeyCode::Left => Some(HeldKey::TurnLeft),
        KeyCode::Right => Some(HeldKey::TurnRight),
        _ => None,
    }
}

/// Tracks which movement keys are down. Terminals that report key releases
/// release on the event; the rest release once auto-repeat stops for `hold`.
pub(crate) struct KeyTracker {
    last_seen: HashMap<HeldKey, Instant>,
    release_events: bool,
    hold: Duration,
}

impl KeyTracker {
    pub(crate) fn new(release_events: bool, hold: Duration) -> Self {
        Self {
            last_seen: HashMap::new(),
            release_events,
            hold,
        }
    }

    pub(crate) fn observe(&mut self, ev: &InputEvent, now: Instant) {
        let Some(key) = held_key(ev.key) else {
            return;
        };
        match ev.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                self.last_seen.insert(key, now);
            }
            KeyEventKind::Release => {
                self.last_seen.remove(&key);
            }
        }
    }

    fn is_down(&self, key: HeldKey, now: Instant) -> bool {
        match self.last_seen.get(&key) {
            Some(&t) => self.release_events || now.saturating_duration_since(t) <= self.hold,
            None => false,
        }
    }

    pub(crate) fn snapshot(&self, now: Instant) -> RawInputs {
        RawInputs {
            walk: self.is_down(HeldKey::Walk, now),
            run: self.is_down(HeldKey::Run, now),
            jump: self.is_down(HeldKey::Jump, now),
            eat: self.is_down(HeldKey::Eat, now),
            turn_left: self.is_down(HeldKey::TurnLeft, now),
            turn_right: self.is_down(HeldKey::TurnRight, now),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.last_seen.clear();
    }
}

/* -----------------------------
   Discrete actions
------------------------------ */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PlayerAction {
    Game(GameAction),
    HelpToggle,
    SettingsOpen,
    SettingsMove(i32),
    SettingsToggle,
    Back,
    Exit,
}

pub(crate) fn map_event_to_action(
    overlay: Overlay,
    phase: Phase,
    ev: &InputEvent,
) -> Option<PlayerAction> {
    if ev.kind != KeyEventKind::Press {
        return None;
    }

    // Global
    if matches!(ev.key, KeyCode::Char('c') | KeyCode::Char('C'))
        && ev.mods.contains(KeyModifiers::CONTROL)
    {
        return Some(PlayerAction::Exit);
    }
    match ev.key {
        KeyCode::Char('h') | KeyCode::Char('H') => return Some(PlayerAction::HelpToggle),
        KeyCode::Esc => {
            return Some(if overlay == Overlay::None {
                PlayerAction::Exit
            } else {
                PlayerAction::Back
            })
        }
        _ => {}
    }

    match overlay {
        Overlay::Settings => match ev.key {
            KeyCode::Up => Some(PlayerAction::SettingsMove(-1)),
            KeyCode::Down => Some(PlayerAction::SettingsMove(1)),
            KeyCode::Enter => Some(PlayerAction::SettingsToggle),
            KeyCode::Tab => Some(PlayerAction::Back),
            _ => None,
        },
        Overlay::Help => None,
        Overlay::None => match (phase, ev.key) {
            (_, KeyCode::Tab) => Some(PlayerAction::SettingsOpen),
            (_, KeyCode::Char('p') | KeyCode::Char('P')) => {
                Some(PlayerAction::Game(GameAction::Pet))
            }
            (Phase::NotStarted, KeyCode::Enter) => Some(PlayerAction::Game(GameAction::Start)),
            (Phase::Over | Phase::Quit, KeyCode::Enter) => {
                Some(PlayerAction::Game(GameAction::Restart))
            }
            (Phase::Running, KeyCode::Char('s') | KeyCode::Char('S')) => {
                Some(PlayerAction::Game(GameAction::Sleep))
            }
            (Phase::Running, KeyCode::Char('q') | KeyCode::Char('Q')) => {
                Some(PlayerAction::Game(GameAction::Quit))
            }
            (_, KeyCode::Char('q') | KeyCode::Char('Q')) => Some(PlayerAction::Exit),
            _ => None,
        },
    }
}
