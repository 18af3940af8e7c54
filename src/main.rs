//! Math Adventure entry point
//!
//! The browser build is driven from JS through `math_adventure::web`. Natively
//! this runs a headless session with a simple bot at the controls, which is
//! handy for checking balance changes from a tuning file.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    demo::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::env;
    use std::fs;

    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use math_adventure::persistence::{MemoryLeaderboard, MemoryStore};
    use math_adventure::platform;
    use math_adventure::sim::{Choice, Command, Direction, GamePhase};
    use math_adventure::{App, Tuning, TuningPreset};

    /// Simulated frame length
    const FRAME_MS: u64 = 50;
    /// Give up after ten minutes of game time
    const MAX_FRAMES: u32 = 12_000;
    /// Frames between bot moves
    const MOVE_EVERY: u32 = 2;
    /// Frames the bot "reads" a question before answering
    const THINK_FRAMES: u32 = 12;
    const ACCURACY: f64 = 0.8;

    type DemoApp = App<MemoryStore, MemoryLeaderboard>;

    pub fn run() {
        log::info!("Math Adventure (native) starting...");

        let seed = env_seed();
        let tuning = env_tuning();
        let name = env::var("MATH_ADVENTURE_PLAYER").unwrap_or_else(|_| "Bot".to_string());

        let mut app = App::with_tuning(MemoryStore::new(), MemoryLeaderboard::new(), seed, tuning);
        let mut bot = Pcg32::seed_from_u64(seed ^ 0x5eed);

        for round in 1..=3 {
            play_session(&mut app, &mut bot, &name);
            let snap = app.snapshot();
            println!(
                "Run {}: score {}, best combo {}, high score {}",
                round, snap.score, snap.max_combo, snap.high_score
            );
            app.command(Command::GoHome);
        }

        app.command(Command::ViewLeaderboard);
        println!("\nLeaderboard");
        for (rank, entry) in app.snapshot().leaderboard.iter().enumerate() {
            println!(
                "{:>2}. {:<12} {:>4}  (combo {})",
                rank + 1,
                entry.name,
                entry.score,
                entry.combo
            );
        }
    }

    fn play_session(app: &mut DemoApp, bot: &mut Pcg32, name: &str) {
        if !app.command(Command::Start(name.to_string())) {
            log::warn!("Could not start a session from {:?}", app.state().phase);
            return;
        }

        let mut thinking = 0;
        for frame in 0..MAX_FRAMES {
            let phase = app.state().phase;
            match phase {
                GamePhase::Playing if frame % MOVE_EVERY == 0 => step_towards_collectible(app),
                GamePhase::Quiz => {
                    thinking += 1;
                    if thinking >= THINK_FRAMES {
                        answer(app, bot);
                        thinking = 0;
                    }
                }
                GamePhase::GameOver => return,
                _ => {}
            }
            app.advance(FRAME_MS);
            app.drain_sounds();
        }
        log::warn!("Session still running after {} frames", MAX_FRAMES);
    }

    /// Head for the collectible along the longer axis, sidestepping when blocked
    fn step_towards_collectible(app: &mut DemoApp) {
        let state = app.state();
        let delta = state.collectible.pos - state.player.pos;
        let before = state.player.pos;

        for dir in preferred_directions(delta) {
            app.command(Command::Move(dir));
            if app.state().phase != GamePhase::Playing || app.state().player.pos != before {
                return;
            }
        }
    }

    fn preferred_directions(delta: Vec2) -> [Direction; 4] {
        let horizontal = if delta.x >= 0.0 {
            [Direction::Right, Direction::Left]
        } else {
            [Direction::Left, Direction::Right]
        };
        let vertical = if delta.y >= 0.0 {
            [Direction::Down, Direction::Up]
        } else {
            [Direction::Up, Direction::Down]
        };
        if delta.x.abs() > delta.y.abs() {
            [horizontal[0], vertical[0], vertical[1], horizontal[1]]
        } else {
            [vertical[0], horizontal[0], horizontal[1], vertical[1]]
        }
    }

    fn answer(app: &mut DemoApp, bot: &mut Pcg32) {
        let Some(quiz) = app.state().quiz.as_ref() else {
            return;
        };
        if quiz.result.is_some() {
            return;
        }
        let choice: Option<Choice> = if bot.random_bool(ACCURACY) {
            Some(quiz.question.correct.clone())
        } else {
            quiz.question
                .choices
                .iter()
                .find(|c| **c != quiz.question.correct)
                .cloned()
        };
        log::debug!("Bot answers {:?} to {}", choice, quiz.question.text);
        app.command(Command::SubmitAnswer(choice));
    }

    fn env_seed() -> u64 {
        match env::var("MATH_ADVENTURE_SEED") {
            Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
                log::warn!("Invalid MATH_ADVENTURE_SEED {:?}, using clock", raw);
                platform::fresh_seed()
            }),
            Err(_) => platform::fresh_seed(),
        }
    }

    fn env_tuning() -> Tuning {
        let preset = match env::var("MATH_ADVENTURE_PRESET") {
            Ok(name) => TuningPreset::from_str(&name).unwrap_or_else(|| {
                log::warn!("Unknown preset {:?}, using default", name);
                TuningPreset::default()
            }),
            Err(_) => TuningPreset::default(),
        };

        let Ok(path) = env::var("MATH_ADVENTURE_TUNING") else {
            log::info!("Using {} rules", preset.as_str());
            return preset.tuning();
        };

        let loaded = fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| Tuning::from_json(&json).map_err(|e| e.to_string()))
            .and_then(|tuning| tuning.validate().map(|()| tuning));
        match loaded {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path);
                tuning
            }
            Err(e) => {
                log::warn!("Ignoring tuning file {}: {}", path, e);
                preset.tuning()
            }
        }
    }
}
