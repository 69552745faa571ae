use crate::model::{
    Activity, ActivityInputs, Gait, Message, PetState, Phase, RawInputs, Rules, SoundCue,
    NEED_MAX,
};
use tracing::{debug, info};

fn clamp_need(v: f32) -> f32 {
    v.clamp(0.0, NEED_MAX)
}

impl PetState {
    /// Applies one frame of need decay and growth. Every field is clamped right
    /// after the rule that touches it.
    pub(crate) fn advance(&mut self, dt: f32, inputs: ActivityInputs, rules: &Rules) {
        debug_assert!(dt >= 0.0, "negative frame delta: {dt}");
        let dt = dt.max(0.0);

        // run and jump are folded into walk here; the gait only matters for speed
        let activity = if inputs.is_eating {
            Activity::Eating
        } else if inputs.is_moving {
            Activity::Walk
        } else {
            Activity::Idle
        };

        if activity.is_moving() {
            self.hunger = clamp_need(self.hunger - rules.move_hunger_rate * dt);
            self.health = clamp_need(self.health - rules.move_health_rate * dt);
        }

        if self.hunger < rules.hungry_below {
            self.mood = clamp_need(self.mood - rules.hungry_mood_rate * dt);
        }

        if inputs.is_eating {
            self.hunger = clamp_need(self.hunger + rules.eat_hunger_rate * dt);
            self.mood = clamp_need(self.mood + rules.eat_mood_rate * dt);
        }

        // stacks with the hungry penalty above
        if self.hunger < rules.hungry_below && !inputs.is_eating {
            self.mood = clamp_need(self.mood - rules.starving_mood_rate * dt);
        }

        self.activity = activity;
    }

    pub(crate) fn erode_health_from_low_mood(&mut self, dt: f32, rules: &Rules) {
        if self.mood < rules.low_mood_below {
            let deficit = rules.low_mood_below - self.mood;
            let loss = deficit * rules.low_mood_health_rate * dt.max(0.0);
            self.health = clamp_need(self.health - loss);
        }
    }

    pub(crate) fn add_food(&mut self, amount: f32) {
        self.food = (self.food + amount).clamp(0.0, self.max_food);
    }

    pub(crate) fn consume_food(&mut self, amount: f32) {
        self.food = (self.food - amount).clamp(0.0, self.max_food);
    }

    /// Returns false when the dog is already asleep or dead.
    pub(crate) fn fall_asleep(&mut self) -> bool {
        if self.is_sleeping() || self.is_dead() {
            return false;
        }
        self.health = NEED_MAX;
        self.mood = NEED_MAX;
        self.activity = Activity::Sleeping;
        true
    }

    pub(crate) fn wake(&mut self) {
        if self.is_sleeping() {
            self.activity = Activity::Idle;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum GameAction {
    Start,
    Quit,
    Restart,
    Sleep,
    Pet,
}

#[derive(Clone, Copy, Debug)]
struct SleepTimer {
    remaining: f32,
}

/// Cooldowns and one-shot latches for sound cues.
#[derive(Clone, Copy, Debug, Default)]
struct CueState {
    bark_cooldown: f32,
    happy_cooldown: f32,
    sad_played: bool,
    keys_were_held: bool,
}

impl CueState {
    fn cool_down(&mut self, dt: f32) {
        self.bark_cooldown = (self.bark_cooldown - dt).max(0.0);
        self.happy_cooldown = (self.happy_cooldown - dt).max(0.0);
    }
}

/// What the host loop should do with the world after a tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct TickOutcome {
    pub(crate) gait: Option<Gait>,
    pub(crate) eating: bool,
    pub(crate) turn: f32,
    pub(crate) cues: Vec<SoundCue>,
}

pub(crate) struct GameController {
    rules: Rules,
    phase: Phase,
    pet: PetState,
    sleep: Option<SleepTimer>,
    cues: CueState,
    message: Option<Message>,
}

impl GameController {
    pub(crate) fn new(rules: Rules) -> Self {
        let pet = PetState::new(rules.max_food);
        Self {
            rules,
            phase: Phase::NotStarted,
            pet,
            sleep: None,
            cues: CueState::default(),
            message: None,
        }
    }

    pub(crate) fn rules(&self) -> &Rules {
        &self.rules
    }

    pub(crate) fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn pet(&self) -> &PetState {
        &self.pet
    }

    pub(crate) fn message(&self) -> Option<Message> {
        self.message
    }

    /// Feeds collected apples into the food store.
    pub(crate) fn collect_apples(&mut self, count: u32) {
        if count == 0 || self.phase != Phase::Running {
            return;
        }
        self.pet.add_food(self.rules.food_per_apple * count as f32);
        info!(count, food = self.pet.food, "apples collected");
    }

    pub(crate) fn apply(&mut self, action: GameAction) -> Option<SoundCue> {
        match action {
            GameAction::Start => {
                if self.phase == Phase::NotStarted {
                    self.set_phase(Phase::Running);
                }
                None
            }
            GameAction::Quit => {
                if self.phase == Phase::Running {
                    self.set_phase(Phase::Quit);
                    self.message = Some(Message::GameQuit);
                    self.cues.sad_played = false;
                }
                None
            }
            GameAction::Restart => {
                if matches!(self.phase, Phase::Over | Phase::Quit) {
                    self.pet = PetState::new(self.rules.max_food);
                    self.sleep = None;
                    self.cues = CueState::default();
                    self.message = None;
                    self.set_phase(Phase::NotStarted);
                }
                None
            }
            GameAction::Sleep => {
                if self.phase == Phase::Running && self.sleep.is_none() && self.pet.fall_asleep()
                {
                    self.sleep = Some(SleepTimer {
                        remaining: self.rules.sleep_secs,
                    });
                    debug!(secs = self.rules.sleep_secs, "dog fell asleep");
                }
                None
            }
            GameAction::Pet => {
                if self.cues.happy_cooldown > 0.0 {
                    return None;
                }
                self.cues.happy_cooldown = self.rules.happy_cooldown_secs;
                Some(SoundCue::Happy)
            }
        }
    }

    /// One frame of the game. Nothing about the pet changes unless the game is running.
    pub(crate) fn tick(&mut self, dt: f32, raw: &RawInputs) -> TickOutcome {
        debug_assert!(dt >= 0.0, "negative frame delta: {dt}");
        let dt = dt.max(0.0);
        let mut out = TickOutcome::default();

        self.cues.cool_down(dt);

        if self.phase != Phase::Running {
            return out;
        }

        if self.pet.is_dead() {
            self.end(&mut out);
            return out;
        }

        match self.sleep.as_mut() {
            Some(timer) => {
                timer.remaining -= dt;
                if timer.remaining <= 0.0 {
                    self.sleep = None;
                    self.pet.wake();
                    debug!("dog woke up");
                }
            }
            None => {
                let (gait, eating) = self.gate(raw);
                if eating {
                    self.pet.consume_food(self.rules.food_eat_rate * dt);
                }
                let inputs = ActivityInputs {
                    is_moving: gait.is_some(),
                    is_eating: eating,
                };
                self.pet.advance(dt, inputs, &self.rules);
                out.gait = gait;
                out.eating = eating;
                out.turn = raw.turn();
            }
        }

        self.pet.erode_health_from_low_mood(dt, &self.rules);

        let held = raw.any_activity();
        if self.cues.keys_were_held && !held && self.sleep.is_none() {
            self.cues.sad_played = false;
        }
        self.cues.keys_were_held = held;

        if (raw.run || raw.jump) && self.sleep.is_none() && self.cues.bark_cooldown <= 0.0 {
            self.cues.bark_cooldown = self.rules.bark_cooldown_secs;
            out.cues.push(SoundCue::Bark);
        }

        self.message = derive_message(&self.pet, &self.rules);
        if self.pet.is_dead() {
            self.end(&mut out);
        } else if self.message == Some(Message::TooHungry) && !self.cues.sad_played {
            self.cues.sad_played = true;
            out.cues.push(SoundCue::Sad);
        }

        out
    }

    fn gate(&self, raw: &RawInputs) -> (Option<Gait>, bool) {
        if self.pet.food <= 0.0 {
            return (None, false);
        }
        let gait = if raw.walk {
            Some(Gait::Walk)
        } else if raw.run {
            Some(Gait::Run)
        } else if raw.jump {
            Some(Gait::Jump)
        } else {
            None
        };
        (gait, raw.eat)
    }

    fn end(&mut self, out: &mut TickOutcome) {
        self.message = Some(Message::End);
        self.sleep = None;
        self.set_phase(Phase::Over);
        if !self.cues.sad_played {
            self.cues.sad_played = true;
            out.cues.push(SoundCue::Sad);
        }
    }

    fn set_phase(&mut self, next: Phase) {
        if next != self.phase {
            info!(from = ?self.phase, to = ?next, "phase change");
            self.phase = next;
        }
    }
}

pub(crate) fn derive_message(pet: &PetState, rules: &Rules) -> Option<Message> {
    if pet.health <= 0.0 {
        Some(Message::End)
    } else if pet.hunger <= rules.hunger_warning_at {
        Some(Message::TooHungry)
    } else if pet.food < rules.food_warning_below {
        Some(Message::HuntForFood)
    } else if pet.mood < rules.mood_warning_below {
        Some(Message::SleepForMood)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn running() -> GameController {
        let mut game = GameController::new(Rules::default());
        game.apply(GameAction::Start);
        game
    }

    const MOVING: ActivityInputs = ActivityInputs {
        is_moving: true,
        is_eating: false,
    };
    const IDLE: ActivityInputs = ActivityInputs {
        is_moving: false,
        is_eating: false,
    };

    #[test]
    fn moving_from_fresh_state_costs_hunger_and_health() {
        let rules = Rules::default();
        let mut pet = PetState::default();
        pet.advance(1.0, MOVING, &rules);
        assert_eq!(pet.hunger, 97.0);
        assert_eq!(pet.health, 99.0);
        assert_eq!(pet.mood, 50.0);
        assert_eq!(pet.activity, Activity::Walk);
    }

    #[test]
    fn hungry_and_not_eating_stacks_both_mood_penalties() {
        let rules = Rules::default();
        let mut pet = PetState {
            hunger: 20.0,
            ..PetState::default()
        };
        pet.advance(1.0, IDLE, &rules);
        assert!(close(pet.mood, 50.0 - 3.5));
        assert_eq!(pet.activity, Activity::Idle);
    }

    #[test]
    fn eating_overrides_movement() {
        let rules = Rules::default();
        let mut pet = PetState {
            hunger: 50.0,
            ..PetState::default()
        };
        pet.advance(
            1.0,
            ActivityInputs {
                is_moving: true,
                is_eating: true,
            },
            &rules,
        );
        assert_eq!(pet.activity, Activity::Eating);
        assert_eq!(pet.hunger, 60.0);
        assert_eq!(pet.mood, 53.0);
        assert_eq!(pet.health, 100.0);
    }

    #[test]
    fn food_is_clamped_to_store_size() {
        let mut pet = PetState {
            food: 95.0,
            ..PetState::default()
        };
        pet.add_food(10.0);
        assert_eq!(pet.food, 100.0);
        pet.consume_food(250.0);
        assert_eq!(pet.food, 0.0);
    }

    #[test]
    fn nothing_moves_before_start() {
        let mut game = GameController::new(Rules::default());
        let raw = RawInputs {
            walk: true,
            ..RawInputs::default()
        };
        let out = game.tick(1.0, &raw);
        assert_eq!(out, TickOutcome::default());
        assert_eq!(game.pet(), &PetState::default());
        assert_eq!(game.phase(), Phase::NotStarted);
    }

    #[test]
    fn walking_reports_gait_and_decays_needs() {
        let mut game = running();
        let raw = RawInputs {
            walk: true,
            turn_left: true,
            ..RawInputs::default()
        };
        let out = game.tick(1.0, &raw);
        assert_eq!(out.gait, Some(Gait::Walk));
        assert_eq!(out.turn, 1.0);
        assert_eq!(game.pet().hunger, 97.0);
        assert_eq!(game.pet().health, 99.0);
        assert_eq!(game.message(), None);
    }

    #[test]
    fn run_and_jump_still_count_as_walking_for_needs() {
        let mut game = running();
        let raw = RawInputs {
            jump: true,
            ..RawInputs::default()
        };
        let out = game.tick(1.0, &raw);
        assert_eq!(out.gait, Some(Gait::Jump));
        assert_eq!(game.pet().activity, Activity::Walk);
        assert_eq!(game.pet().hunger, 97.0);
    }

    #[test]
    fn eating_uses_up_food() {
        let mut game = running();
        let raw = RawInputs {
            eat: true,
            ..RawInputs::default()
        };
        let out = game.tick(1.0, &raw);
        assert!(out.eating);
        assert_eq!(game.pet().food, 80.0);
    }

    #[test]
    fn empty_food_store_blocks_moving_and_eating() {
        let mut game = running();
        game.pet.food = 0.0;
        let raw = RawInputs {
            walk: true,
            eat: true,
            ..RawInputs::default()
        };
        let out = game.tick(1.0, &raw);
        assert_eq!(out.gait, None);
        assert!(!out.eating);
        assert_eq!(game.pet().activity, Activity::Idle);
        assert_eq!(game.message(), Some(Message::HuntForFood));
    }

    #[test]
    fn low_mood_erodes_health() {
        let mut game = running();
        game.pet.mood = 30.0;
        game.tick(1.0, &RawInputs::default());
        assert!(close(game.pet().health, 100.0 - 20.0 * 0.08));
    }

    #[test]
    fn zero_health_ends_the_game_for_good() {
        let mut game = running();
        game.pet.health = 0.0;
        let out = game.tick(0.016, &RawInputs::default());
        assert_eq!(game.phase(), Phase::Over);
        assert_eq!(game.message(), Some(Message::End));
        assert_eq!(game.message().map(|m| m.to_string()).as_deref(), Some("END!"));
        assert_eq!(out.cues, vec![SoundCue::Sad]);

        let frozen = game.pet().clone();
        let raw = RawInputs {
            walk: true,
            eat: true,
            ..RawInputs::default()
        };
        let out = game.tick(1.0, &raw);
        assert_eq!(game.pet(), &frozen);
        assert!(out.cues.is_empty());
        assert_eq!(game.phase(), Phase::Over);
    }

    #[test]
    fn walking_to_death_ends_the_game() {
        let mut game = running();
        game.pet.health = 0.5;
        let raw = RawInputs {
            walk: true,
            ..RawInputs::default()
        };
        game.tick(1.0, &raw);
        assert_eq!(game.pet().health, 0.0);
        assert_eq!(game.phase(), Phase::Over);
        assert_eq!(game.message(), Some(Message::End));
    }

    #[test]
    fn restart_restores_initial_pet() {
        let mut game = running();
        game.pet.health = 0.0;
        game.tick(0.1, &RawInputs::default());
        game.apply(GameAction::Restart);
        assert_eq!(game.phase(), Phase::NotStarted);
        assert_eq!(game.message(), None);
        let pet = game.pet();
        assert_eq!(pet.health, 100.0);
        assert_eq!(pet.hunger, 100.0);
        assert_eq!(pet.mood, 50.0);
        assert_eq!(pet.food, 100.0);
        assert_eq!(pet.activity, Activity::Idle);
    }

    #[test]
    fn quit_is_terminal_until_restart() {
        let mut game = running();
        game.apply(GameAction::Quit);
        assert_eq!(game.phase(), Phase::Quit);
        assert_eq!(game.message().map(|m| m.to_string()).as_deref(), Some("Game Quit"));

        game.apply(GameAction::Start);
        assert_eq!(game.phase(), Phase::Quit);
        let before = game.pet().clone();
        game.tick(
            1.0,
            &RawInputs {
                walk: true,
                ..RawInputs::default()
            },
        );
        assert_eq!(game.pet(), &before);

        game.apply(GameAction::Restart);
        assert_eq!(game.phase(), Phase::NotStarted);
        game.apply(GameAction::Start);
        assert_eq!(game.phase(), Phase::Running);
    }

    #[test]
    fn quit_and_restart_are_ignored_in_the_wrong_phase() {
        let mut game = GameController::new(Rules::default());
        game.apply(GameAction::Quit);
        assert_eq!(game.phase(), Phase::NotStarted);
        game.apply(GameAction::Start);
        game.apply(GameAction::Restart);
        assert_eq!(game.phase(), Phase::Running);
    }

    #[test]
    fn sleep_heals_once_and_blocks_input_until_it_ends() {
        let mut game = running();
        game.pet.health = 40.0;
        game.pet.mood = 10.0;
        game.pet.hunger = 60.0;
        game.apply(GameAction::Sleep);
        assert!(game.pet().is_sleeping());
        assert_eq!(game.pet().health, 100.0);
        assert_eq!(game.pet().mood, 100.0);
        assert_eq!(game.pet().activity, Activity::Sleeping);

        let raw = RawInputs {
            eat: true,
            walk: true,
            ..RawInputs::default()
        };
        let out = game.tick(1.0, &raw);
        assert_eq!(out.gait, None);
        assert_eq!(game.pet().hunger, 60.0);
        assert_eq!(game.pet().food, 100.0);

        // a second sleep while asleep must not heal again
        game.pet.health = 70.0;
        game.apply(GameAction::Sleep);
        assert_eq!(game.pet().health, 70.0);

        game.tick(2.5, &RawInputs::default());
        assert!(!game.pet().is_sleeping());
        assert_eq!(game.pet().activity, Activity::Idle);
    }

    #[test]
    fn sleep_only_while_running() {
        let mut game = GameController::new(Rules::default());
        game.apply(GameAction::Sleep);
        assert!(!game.pet().is_sleeping());
    }

    #[test]
    fn a_dead_dog_cannot_fall_asleep() {
        let mut pet = PetState {
            health: 0.0,
            ..PetState::default()
        };
        assert!(!pet.fall_asleep());
        assert_eq!(pet.health, 0.0);
        assert_eq!(pet.activity, Activity::Idle);
    }

    #[test]
    fn message_priority_is_fixed() {
        let rules = Rules::default();
        let mut pet = PetState {
            hunger: 30.0,
            food: 10.0,
            ..PetState::default()
        };
        assert_eq!(derive_message(&pet, &rules), Some(Message::TooHungry));
        pet.hunger = 31.0;
        assert_eq!(derive_message(&pet, &rules), Some(Message::HuntForFood));
        pet.food = 30.0;
        assert_eq!(derive_message(&pet, &rules), None);
        pet.health = 0.0;
        assert_eq!(derive_message(&pet, &rules), Some(Message::End));

        let moody = Rules {
            mood_warning_below: 20.0,
            ..Rules::default()
        };
        let pet = PetState {
            mood: 5.0,
            ..PetState::default()
        };
        assert_eq!(derive_message(&pet, &moody), Some(Message::SleepForMood));
    }

    #[test]
    fn bark_respects_its_cooldown() {
        let mut game = running();
        let raw = RawInputs {
            run: true,
            ..RawInputs::default()
        };
        let barks: usize = (0..10)
            .map(|_| game.tick(0.1, &raw).cues.iter().filter(|c| **c == SoundCue::Bark).count())
            .sum();
        assert_eq!(barks, 1);
    }

    #[test]
    fn hunger_whimper_plays_once_until_keys_are_released() {
        let mut game = running();
        game.pet.hunger = 25.0;
        let raw = RawInputs {
            walk: true,
            ..RawInputs::default()
        };
        assert_eq!(game.tick(0.01, &raw).cues, vec![SoundCue::Sad]);
        assert!(game.tick(0.01, &raw).cues.is_empty());
        // releasing every key re-arms the cue
        assert_eq!(game.tick(0.01, &RawInputs::default()).cues, vec![SoundCue::Sad]);
        assert!(game.tick(0.01, &RawInputs::default()).cues.is_empty());
    }

    #[test]
    fn petting_is_rate_limited() {
        let mut game = GameController::new(Rules::default());
        assert_eq!(game.apply(GameAction::Pet), Some(SoundCue::Happy));
        assert_eq!(game.apply(GameAction::Pet), None);
        game.tick(2.0, &RawInputs::default());
        assert_eq!(game.apply(GameAction::Pet), Some(SoundCue::Happy));
    }

    #[test]
    fn apples_only_count_while_running() {
        let mut game = GameController::new(Rules::default());
        game.pet.food = 50.0;
        game.collect_apples(2);
        assert_eq!(game.pet().food, 50.0);
        game.apply(GameAction::Start);
        game.collect_apples(2);
        assert_eq!(game.pet().food, 70.0);
    }

    fn any_pet() -> impl Strategy<Value = PetState> {
        (0.0f32..=100.0, 0.0f32..=100.0, 0.0f32..=100.0, 0.0f32..=100.0).prop_map(
            |(health, hunger, mood, food)| PetState {
                health,
                hunger,
                mood,
                food,
                ..PetState::default()
            },
        )
    }

    proptest! {
        #[test]
        fn needs_stay_in_bounds(pet in any_pet(), dt in 0.0f32..30.0, moving in any::<bool>(), eating in any::<bool>()) {
            let rules = Rules::default();
            let mut pet = pet;
            pet.advance(dt, ActivityInputs { is_moving: moving, is_eating: eating }, &rules);
            pet.erode_health_from_low_mood(dt, &rules);
            for v in [pet.health, pet.hunger, pet.mood] {
                prop_assert!((0.0..=100.0).contains(&v));
            }
            prop_assert!((0.0..=pet.max_food).contains(&pet.food));
        }

        #[test]
        fn zero_dt_changes_no_need(pet in any_pet(), moving in any::<bool>(), eating in any::<bool>()) {
            let rules = Rules::default();
            let mut after = pet.clone();
            after.advance(0.0, ActivityInputs { is_moving: moving, is_eating: eating }, &rules);
            prop_assert_eq!(after.health, pet.health);
            prop_assert_eq!(after.hunger, pet.hunger);
            prop_assert_eq!(after.mood, pet.mood);
            prop_assert_eq!(after.food, pet.food);
        }

        #[test]
        fn moving_never_restores_hunger_or_health(pet in any_pet(), dt in 0.0f32..30.0) {
            let rules = Rules::default();
            let mut after = pet.clone();
            after.advance(dt, MOVING, &rules);
            prop_assert!(after.hunger <= pet.hunger);
            prop_assert!(after.health <= pet.health);
        }

        #[test]
        fn eating_never_lowers_hunger_or_mood(pet in any_pet(), dt in 0.0f32..30.0, moving in any::<bool>()) {
            let rules = Rules::default();
            let mut after = pet.clone();
            after.advance(dt, ActivityInputs { is_moving: moving, is_eating: true }, &rules);
            prop_assert!(after.hunger >= pet.hunger);
            prop_assert!(after.mood >= pet.mood);
        }
    }
}
