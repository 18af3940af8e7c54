//! Browser bindings
//!
//! The page owns rendering, input and audio. It forwards commands here,
//! calls `advance` from its animation frame, and redraws from the JSON
//! snapshot. The shared leaderboard is reached through two JS callbacks so
//! any document store can sit behind it; their Promises are awaited off the
//! game loop and the results fed back into the session.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};

use crate::app::App;
use crate::highscores::LeaderboardEntry;
use crate::persistence::{DeferredLeaderboard, RemoteRequest, StoreError};
use crate::platform::{self, FrameClock, storage::WebStorage};
use crate::sim::{Choice, Command, Direction};
use crate::tuning::TuningPreset;

type WebApp = App<WebStorage, DeferredLeaderboard>;

#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("Logger already set: {}", e).into());
    }
    log::info!("Math Adventure starting...");
}

/// Page-provided leaderboard callbacks.
///
/// `append(json)` yields the new document ID; `query(limit)` yields the top
/// scores as a JSON string or an array of plain objects. Either may answer
/// directly or with a Promise, and either may throw or reject.
struct JsLeaderboard {
    append: js_sys::Function,
    query: js_sys::Function,
}

impl JsLeaderboard {
    async fn append_score(&self, entry: &LeaderboardEntry) -> Result<String, StoreError> {
        let json = serde_json::to_string(entry)?;
        let pending = self
            .append
            .call1(&JsValue::NULL, &JsValue::from_str(&json))
            .map_err(transport)?;
        settle(pending)
            .await?
            .as_string()
            .ok_or_else(|| StoreError::Transport("append did not yield a document ID".to_string()))
    }

    async fn query_top_scores(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let pending = self
            .query
            .call1(&JsValue::NULL, &JsValue::from_f64(limit as f64))
            .map_err(transport)?;
        let value = settle(pending).await?;
        if value.is_undefined() || value.is_null() {
            return Err(StoreError::Transport("query yielded nothing".to_string()));
        }
        let json = match value.as_string() {
            Some(json) => json,
            None => js_sys::JSON::stringify(&value)
                .map(String::from)
                .map_err(transport)?,
        };
        let mut entries: Vec<LeaderboardEntry> = serde_json::from_str(&json)?;
        entries.truncate(limit);
        Ok(entries)
    }
}

/// Await `value` when it is a Promise, otherwise pass it through
async fn settle(value: JsValue) -> Result<JsValue, StoreError> {
    match value.dyn_into::<js_sys::Promise>() {
        Ok(promise) => JsFuture::from(promise).await.map_err(transport),
        Err(value) => Ok(value),
    }
}

fn transport(e: JsValue) -> StoreError {
    StoreError::Transport(format!("{:?}", e))
}

#[wasm_bindgen]
pub struct WebGame {
    app: Rc<RefCell<WebApp>>,
    remote: Rc<JsLeaderboard>,
    clock: FrameClock,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new(append: js_sys::Function, query: js_sys::Function, seed: Option<f64>) -> WebGame {
        let seed = seed.map(|s| s as u64).unwrap_or_else(platform::fresh_seed);
        log::info!("Game initialized with seed: {}", seed);
        let app = App::new(WebStorage::open(), DeferredLeaderboard::new(), seed);
        WebGame {
            app: Rc::new(RefCell::new(app)),
            remote: Rc::new(JsLeaderboard { append, query }),
            clock: FrameClock::new(),
        }
    }

    pub fn start(&mut self, name: &str) -> bool {
        self.run(Command::Start(name.to_string()))
    }

    /// `dir` is one of up/down/left/right
    pub fn move_player(&mut self, dir: &str) -> bool {
        let dir = match dir {
            "up" => Direction::Up,
            "down" => Direction::Down,
            "left" => Direction::Left,
            "right" => Direction::Right,
            _ => return false,
        };
        self.run(Command::Move(dir))
    }

    pub fn pause(&mut self) -> bool {
        self.run(Command::Pause)
    }

    pub fn resume(&mut self) -> bool {
        self.run(Command::Resume)
    }

    /// Answer with the index of a displayed choice; `None` counts as no answer
    pub fn submit_choice(&mut self, index: Option<u32>) -> bool {
        let choice = index.and_then(|i| self.choice_at(i));
        self.run(Command::SubmitAnswer(choice))
    }

    pub fn restart(&mut self) -> bool {
        self.run(Command::Restart)
    }

    pub fn go_home(&mut self) -> bool {
        self.run(Command::GoHome)
    }

    pub fn view_leaderboard(&mut self) -> bool {
        self.run(Command::ViewLeaderboard)
    }

    pub fn refresh_leaderboard(&mut self) -> bool {
        self.run(Command::RefreshLeaderboard)
    }

    pub fn toggle_sound(&mut self) -> bool {
        self.run(Command::ToggleSound)
    }

    pub fn set_preset(&mut self, name: &str) -> bool {
        match TuningPreset::from_str(name) {
            Some(preset) => self.app.borrow_mut().set_preset(preset),
            None => {
                log::warn!("Unknown preset {:?}", name);
                false
            }
        }
    }

    /// Advance the game clock by the frame delta (ms)
    pub fn advance(&mut self, dt_ms: f64) {
        let dt = self.clock.tick(dt_ms);
        self.app.borrow_mut().advance(dt);
        self.dispatch_remote();
    }

    pub fn snapshot(&self) -> Result<String, JsValue> {
        self.app
            .borrow()
            .snapshot()
            .to_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Pending sound cues as a JSON array of names
    pub fn drain_sounds(&mut self) -> Result<String, JsValue> {
        let sounds = self.app.borrow_mut().drain_sounds();
        serde_json::to_string(&sounds).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl WebGame {
    fn run(&mut self, command: Command) -> bool {
        let accepted = self.app.borrow_mut().command(command);
        self.dispatch_remote();
        accepted
    }

    fn choice_at(&self, index: u32) -> Option<Choice> {
        let app = self.app.borrow();
        let quiz = app.state().quiz.as_ref()?;
        quiz.question.choices.get(index as usize).cloned()
    }

    /// Start every leaderboard call the session queued; each result is
    /// reported back to the session once its Promise settles
    fn dispatch_remote(&self) {
        let requests = self
            .app
            .borrow_mut()
            .persistence_mut()
            .remote_mut()
            .take_requests();
        for request in requests {
            let app = Rc::clone(&self.app);
            let remote = Rc::clone(&self.remote);
            spawn_local(async move {
                match request {
                    RemoteRequest::Submit(entry) => {
                        let result = remote.append_score(&entry).await;
                        app.borrow_mut().complete_submit(entry, result);
                    }
                    RemoteRequest::Fetch { limit } => {
                        let result = remote.query_top_scores(limit).await;
                        app.borrow_mut().complete_fetch(result);
                    }
                }
            });
        }
    }
}
