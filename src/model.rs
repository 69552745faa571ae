use serde::{Deserialize, Serialize};
use std::fmt;

pub(crate) const NEED_MAX: f32 = 100.0;

/// What the dog is doing this frame. Drives both need decay and the pose drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Activity {
    Idle,
    Walk,
    Run,
    Jump,
    Eating,
    Sleeping,
}

impl Activity {
    pub(crate) fn is_moving(self) -> bool {
        matches!(self, Activity::Walk | Activity::Run | Activity::Jump)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Gait {
    Walk,
    Run,
    Jump,
}

impl Gait {
    pub(crate) fn activity(self) -> Activity {
        match self {
            Gait::Walk => Activity::Walk,
            Gait::Run => Activity::Run,
            Gait::Jump => Activity::Jump,
        }
    }

    /// World units per second.
    pub(crate) fn speed(self, rules: &Rules) -> f32 {
        let base = match self {
            Gait::Walk => rules.walk_speed,
            Gait::Run => rules.run_speed,
            Gait::Jump => rules.jump_speed,
        };
        base * rules.world_scale
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Phase {
    NotStarted,
    Running,
    Over,
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Overlay {
    None,
    Help,
    Settings,
}

/// The two facts about player intent that the needs model cares about.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ActivityInputs {
    pub(crate) is_moving: bool,
    pub(crate) is_eating: bool,
}

/// Held keys, sampled once per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct RawInputs {
    pub(crate) walk: bool,
    pub(crate) run: bool,
    pub(crate) jump: bool,
    pub(crate) eat: bool,
    pub(crate) turn_left: bool,
    pub(crate) turn_right: bool,
}

impl RawInputs {
    pub(crate) fn any_activity(&self) -> bool {
        self.walk || self.run || self.jump || self.eat
    }

    /// +1 turns left, -1 turns right.
    pub(crate) fn turn(&self) -> f32 {
        match (self.turn_left, self.turn_right) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PetState {
    pub(crate) health: f32,
    pub(crate) hunger: f32,
    pub(crate) mood: f32,
    pub(crate) food: f32,
    pub(crate) max_food: f32,
    pub(crate) activity: Activity,
}

impl PetState {
    pub(crate) fn new(max_food: f32) -> Self {
        let max_food = if max_food > 0.0 { max_food } else { NEED_MAX };
        Self {
            health: NEED_MAX,
            hunger: NEED_MAX,
            mood: 50.0,
            food: max_food,
            max_food,
            activity: Activity::Idle,
        }
    }

    pub(crate) fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    pub(crate) fn is_sleeping(&self) -> bool {
        self.activity == Activity::Sleeping
    }
}

impl Default for PetState {
    fn default() -> Self {
        Self::new(NEED_MAX)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Message {
    End,
    TooHungry,
    HuntForFood,
    SleepForMood,
    GameQuit,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Message::End => "END!",
            Message::TooHungry => "too hungry, cannot move",
            Message::HuntForFood => "hunt for food",
            Message::SleepForMood => "sleep to improve mood",
            Message::GameQuit => "Game Quit",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SoundCue {
    Bark,
    Happy,
    Sad,
}

impl SoundCue {
    pub(crate) fn bubble_text(self) -> &'static str {
        match self {
            SoundCue::Bark => "Woof! Woof!",
            SoundCue::Happy => "Yip yip!",
            SoundCue::Sad => "*whimper*",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Rules {
    // needs
    pub(crate) move_hunger_rate: f32,
    pub(crate) move_health_rate: f32,
    pub(crate) hungry_below: f32,
    pub(crate) hungry_mood_rate: f32,
    pub(crate) starving_mood_rate: f32,
    pub(crate) eat_hunger_rate: f32,
    pub(crate) eat_mood_rate: f32,
    pub(crate) low_mood_below: f32,
    pub(crate) low_mood_health_rate: f32,

    // messages
    pub(crate) hunger_warning_at: f32,
    pub(crate) food_warning_below: f32,
    pub(crate) mood_warning_below: f32,

    // food store
    pub(crate) max_food: f32,
    pub(crate) food_eat_rate: f32,
    pub(crate) food_per_apple: f32,

    // timers, seconds
    pub(crate) sleep_secs: f32,
    pub(crate) bark_cooldown_secs: f32,
    pub(crate) happy_cooldown_secs: f32,
    pub(crate) max_frame_dt: f32,

    // movement, base units before world_scale
    pub(crate) walk_speed: f32,
    pub(crate) run_speed: f32,
    pub(crate) jump_speed: f32,
    pub(crate) turn_rate: f32,
    pub(crate) world_scale: f32,
    pub(crate) max_slope: f32,

    // world
    pub(crate) world_w: u32,
    pub(crate) world_h: u32,
    pub(crate) terrain_height: f32,
    pub(crate) terrain_freq: f32,
    pub(crate) water_level: f32,

    // apples
    pub(crate) apple_count: u32,
    pub(crate) apple_spawn_attempts: u32,
    pub(crate) collection_radius: f32,

    // splashes
    pub(crate) splash_cooldown_secs: f32,
    pub(crate) splash_burst: u32,
    pub(crate) splash_lifetime_secs: f32,
    pub(crate) max_splashes: usize,
    pub(crate) splash_scatter_min: f32,
    pub(crate) splash_scatter_max: f32,
    pub(crate) splash_rise_rate: f32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            move_hunger_rate: 3.0,
            move_health_rate: 1.0,
            hungry_below: 30.0,
            hungry_mood_rate: 1.5,
            starving_mood_rate: 2.0,
            eat_hunger_rate: 10.0,
            eat_mood_rate: 3.0,
            low_mood_below: 50.0,
            low_mood_health_rate: 0.08,

            hunger_warning_at: 30.0,
            food_warning_below: 30.0,
            mood_warning_below: 0.0,

            max_food: 100.0,
            food_eat_rate: 20.0,
            food_per_apple: 10.0,

            sleep_secs: 3.0,
            bark_cooldown_secs: 5.0,
            happy_cooldown_secs: 2.0,
            max_frame_dt: 0.25,

            walk_speed: 0.9,
            run_speed: 1.8,
            jump_speed: 3.0,
            turn_rate: 2.4,
            world_scale: 4.0,
            max_slope: 2.0,

            world_w: 96,
            world_h: 64,
            terrain_height: 14.0,
            terrain_freq: 0.045,
            water_level: 0.36,

            apple_count: 15,
            apple_spawn_attempts: 1000,
            collection_radius: 1.0,

            splash_cooldown_secs: 0.15,
            splash_burst: 5,
            splash_lifetime_secs: 0.5,
            max_splashes: 30,
            splash_scatter_min: 0.15,
            splash_scatter_max: 0.3,
            splash_rise_rate: 0.1,
        }
    }
}
