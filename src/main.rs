//! Poop Patrol entry point
//!
//! Runs the simulation headless: a short attract mode, then a run flown by a
//! simple autopilot through the same request API a player would use.
//!
//! Usage: `poop-patrol [tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use poop_patrol::consts::{MAX_SUBSTEPS, SIM_DT};
    use poop_patrol::sim::{ActorKind, GameEvent, GameLogic, GamePhase, LogDrawer};
    use poop_patrol::{Tuning, TuningError};

    /// Seconds of attract mode before the run starts
    const DEMO_SECONDS: f32 = 2.0;
    /// Stop runs the autopilot survives
    const TIME_LIMIT: f32 = 120.0;
    /// Length of one driver frame, not a multiple of SIM_DT
    const FRAME_DT: f32 = 1.0 / 45.0;

    /// Keeps the bird above the tallest obstacle and bombs passing NPCs
    struct Autopilot {
        cruise_height: f32,
    }

    impl Autopilot {
        fn new(tuning: &Tuning) -> Self {
            let cruise_height =
                tuning.ground_top() + tuning.obstacle_height_max + tuning.bird_radius + 0.5;
            Self {
                cruise_height: cruise_height.min(tuning.view_height - tuning.bird_radius),
            }
        }

        fn steer(&self, logic: &mut GameLogic) {
            let Some(bird) = logic.get_body(logic.bird_id()) else {
                return;
            };
            if bird.position.y < self.cruise_height && bird.linear_velocity.y < 1.0 {
                logic.request_bird_start_fly();
            } else {
                logic.request_bird_stop_fly();
            }

            if logic.num_poops_left() == 0 {
                return;
            }
            let tuning = logic.tuning();
            let gravity = tuning.gravity;
            let v0 = tuning.poop_downward_velocity;
            let scroll = logic.scroll_speed();
            let target = logic.get_visible_actors().into_values().find(|v| {
                if v.actor.kind != ActorKind::Npc {
                    return false;
                }
                let drop = bird.position.y - (v.body.position.y + v.actor.shape.half_height());
                if drop <= 0.0 {
                    return false;
                }
                // Time for the poop to fall `drop` meters, then where the NPC will be
                let fall = (-v0 + (v0 * v0 + 2.0 * gravity * drop).sqrt()) / gravity;
                let x_at_landing = v.body.position.x - scroll * fall;
                (x_at_landing - bird.position.x).abs() < v.actor.shape.half_width()
            });
            if let Some(npc) = target {
                log::debug!("Autopilot targeting {}", npc.actor.id);
                logic.request_bird_poop();
            }
        }
    }

    struct Game {
        logic: GameLogic,
        autopilot: Autopilot,
        accumulator: f32,
        elapsed: f32,
    }

    impl Game {
        fn new(tuning: Tuning) -> Self {
            let autopilot = Autopilot::new(&tuning);
            let debug_draw = tuning.debug_draw;
            let mut logic = GameLogic::new(tuning);
            logic.init();
            if debug_draw {
                logic.set_debug_drawer(Box::new(LogDrawer));
            }
            Self {
                logic,
                autopilot,
                accumulator: 0.0,
                elapsed: 0.0,
            }
        }

        /// Run simulation steps for one frame
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;
            self.elapsed += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                if self.logic.phase() == GamePhase::Playing {
                    self.autopilot.steer(&mut self.logic);
                }
                self.logic.update(SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;
            }

            self.logic.debug_draw();
            for event in self.logic.drain_events() {
                match event {
                    GameEvent::NpcHit { npc, score } => {
                        log::info!("[{:6.2}s] hit {npc}, score {score}", self.elapsed)
                    }
                    GameEvent::PoopDropped { poops_left } => {
                        log::debug!("[{:6.2}s] poop dropped, {poops_left} left", self.elapsed)
                    }
                    GameEvent::GameOver { score } => {
                        log::info!("[{:6.2}s] game over with score {score}", self.elapsed)
                    }
                    GameEvent::PhaseChanged(phase) => {
                        log::debug!("[{:6.2}s] phase {phase:?}", self.elapsed)
                    }
                }
            }
        }
    }

    pub fn run() -> Result<(), TuningError> {
        let tuning = match std::env::args().nth(1) {
            Some(path) => Tuning::load(path)?,
            None => Tuning::default(),
        };
        log::info!("Poop Patrol starting with seed {:#x}", tuning.seed);

        let mut game = Game::new(tuning);
        while game.elapsed < DEMO_SECONDS {
            game.update(FRAME_DT);
        }
        game.logic.to_playing();

        let start = game.elapsed;
        while game.logic.phase() == GamePhase::Playing && game.elapsed - start < TIME_LIMIT {
            game.update(FRAME_DT);
        }

        log::info!(
            "Run finished after {:.1}s: {:?}, score {}, {} poops left, scroll {:.2} m/s",
            game.elapsed - start,
            game.logic.phase(),
            game.logic.player_score(),
            game.logic.num_poops_left(),
            game.logic.scroll_speed()
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = headless::run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Headless driver is native only
}
