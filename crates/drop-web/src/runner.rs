use drop_engine::{
    Game, GameConfig, EngineContext, RenderContext,
    InputEvent, InputQueue, RenderBuffer,
    FixedTimestep, ProtocolLayout, build_render_buffer,
};
use drop_engine::bridge::protocol::HEADER_FLOATS;

/// Generic game runner that wires up the engine loop.
///
/// Each concrete game creates a `thread_local!` GameRunner and exports free
/// functions via `#[wasm_bindgen]` (see `export_game!`), because wasm-bindgen
/// cannot export generic structs directly.
pub struct GameRunner<G: Game> {
    game: G,
    ctx: EngineContext,
    input: InputQueue,
    /// Handed to every fixed step after the first one of a frame.
    no_input: InputQueue,
    render_buffer: RenderBuffer,
    timestep: FixedTimestep,
    config: GameConfig,
    layout: ProtocolLayout,
    header: [f32; HEADER_FLOATS],
    frame: u32,
    initialized: bool,
}

impl<G: Game> GameRunner<G> {
    pub fn new(game: G) -> Self {
        let config = game.config();
        let layout = ProtocolLayout::from_config(&config);

        Self {
            ctx: EngineContext::with_gravity(config.gravity),
            input: InputQueue::new(),
            no_input: InputQueue::new(),
            render_buffer: RenderBuffer::with_capacity(config.max_instances),
            timestep: FixedTimestep::new(config.fixed_dt),
            layout,
            config,
            header: [0.0; HEADER_FLOATS],
            frame: 0,
            initialized: false,
            game,
        }
    }

    /// Initialize the game. Call once after construction.
    pub fn init(&mut self) {
        self.rebuild_world();
        self.initialized = true;
    }

    /// Re-read the game's config and start it again in a fresh world.
    fn rebuild_world(&mut self) {
        self.config = self.game.config();
        self.layout = ProtocolLayout::from_config(&self.config);
        self.timestep = FixedTimestep::new(self.config.fixed_dt);
        self.render_buffer = RenderBuffer::with_capacity(self.config.max_instances);

        self.ctx = EngineContext::with_gravity(self.config.gravity);
        self.ctx.physics.set_dt(self.config.fixed_dt);
        self.game.init(&mut self.ctx);
        self.refresh_render_data();
    }

    /// Push an input event into the queue.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Hand a tuning document to the game. An accepted document restarts the
    /// game in a new world built from the new config.
    pub fn load_tuning(&mut self, json: &str) -> bool {
        if !self.game.load_tuning(json) {
            return false;
        }
        if self.initialized {
            self.rebuild_world();
        }
        log::info!("tuning reloaded");
        true
    }

    /// Run one frame tick: fixed steps of game update + physics, then render.
    pub fn tick(&mut self, dt: f32) {
        if !self.initialized {
            return;
        }

        self.ctx.clear_frame_data();

        let steps = self.timestep.accumulate(dt);
        for step in 0..steps {
            let input = if step == 0 { &self.input } else { &self.no_input };
            self.game.update(&mut self.ctx, input);
            self.ctx.step_physics();
        }

        // Input that arrived during a frame too short for a step waits for the next one
        if steps > 0 {
            self.input.drain();
        }

        self.frame = self.frame.wrapping_add(1);
        self.refresh_render_data();
    }

    fn refresh_render_data(&mut self) {
        build_render_buffer(self.ctx.scene.iter(), &mut self.render_buffer);

        // Allow game to add custom render commands
        {
            let mut render_ctx = RenderContext {
                render_buffer: &mut self.render_buffer,
            };
            self.game.render(&mut render_ctx);
        }

        self.header = self.layout.header(
            self.frame,
            self.render_buffer.instances.len(),
            self.ctx.events.len(),
            &self.config,
        );
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    // ---- Pointer accessors for zero-copy reads from JS ----

    pub fn header_ptr(&self) -> *const f32 {
        self.header.as_ptr()
    }

    pub fn instances_ptr(&self) -> *const f32 {
        self.render_buffer.instances_ptr()
    }

    pub fn instance_count(&self) -> u32 {
        self.render_buffer.instance_count()
    }

    pub fn game_events_ptr(&self) -> *const f32 {
        self.ctx.events.as_ptr() as *const f32
    }

    pub fn game_events_len(&self) -> u32 {
        self.ctx.events.len().min(self.layout.max_events) as u32
    }

    pub fn world_width(&self) -> f32 {
        self.config.world_width
    }

    pub fn world_height(&self) -> f32 {
        self.config.world_height
    }

    // ---- Capacity accessors ----

    pub fn max_instances(&self) -> u32 {
        self.layout.max_instances as u32
    }

    pub fn max_events(&self) -> u32 {
        self.layout.max_events as u32
    }

    pub fn buffer_total_floats(&self) -> u32 {
        self.layout.buffer_total_floats as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drop_engine::bridge::protocol::{HEADER_FRAME_COUNTER, HEADER_INSTANCE_COUNT};
    use drop_engine::{Entity, GameEvent, Sprite};

    /// Counts steps and pointer-downs, and shows one sprite.
    #[derive(Default)]
    struct Probe {
        steps: u32,
        pointer_downs: u32,
        accept_tuning: bool,
        inits: u32,
    }

    impl Game for Probe {
        fn init(&mut self, ctx: &mut EngineContext) {
            self.inits += 1;
            let id = ctx.next_id();
            ctx.scene.spawn(Entity::new(id).with_sprite(Sprite::frame(0)));
        }

        fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue) {
            self.steps += 1;
            for event in input.iter() {
                if let InputEvent::PointerDown { .. } = event {
                    self.pointer_downs += 1;
                    ctx.emit_event(GameEvent::new(1.0, 0.0, 0.0, 0.0));
                }
            }
        }

        fn load_tuning(&mut self, _json: &str) -> bool {
            self.accept_tuning
        }
    }

    fn runner() -> GameRunner<Probe> {
        let mut runner = GameRunner::new(Probe::default());
        runner.init();
        runner
    }

    #[test]
    fn tick_before_init_does_nothing() {
        let mut runner = GameRunner::new(Probe::default());
        runner.tick(1.0);
        assert_eq!(runner.game().steps, 0);
    }

    #[test]
    fn input_reaches_only_first_step_of_frame() {
        let mut runner = runner();
        runner.push_input(InputEvent::PointerDown { x: 1.0, y: 2.0 });
        runner.tick(3.0 / 60.0 + 0.001);

        assert_eq!(runner.game().steps, 3);
        assert_eq!(runner.game().pointer_downs, 1);
        assert_eq!(runner.game_events_len(), 1);
    }

    #[test]
    fn input_waits_for_a_frame_with_steps() {
        let mut runner = runner();
        runner.push_input(InputEvent::PointerDown { x: 1.0, y: 2.0 });
        runner.tick(0.001);
        assert_eq!(runner.game().pointer_downs, 0);

        runner.tick(1.0 / 60.0);
        assert_eq!(runner.game().pointer_downs, 1);

        // Events are per frame
        runner.tick(1.0 / 60.0);
        assert_eq!(runner.game_events_len(), 0);
    }

    #[test]
    fn header_tracks_frames_and_instances() {
        let mut runner = runner();
        runner.tick(1.0 / 60.0);
        runner.tick(1.0 / 60.0);
        let header = unsafe { std::slice::from_raw_parts(runner.header_ptr(), HEADER_FLOATS) };
        assert_eq!(header[HEADER_FRAME_COUNTER], 2.0);
        assert_eq!(header[HEADER_INSTANCE_COUNT], 1.0);
        assert_eq!(runner.instance_count(), 1);
    }

    #[test]
    fn rejected_tuning_keeps_world() {
        let mut runner = runner();
        assert!(!runner.load_tuning("{}"));
        assert_eq!(runner.game().inits, 1);
    }

    #[test]
    fn accepted_tuning_restarts_in_fresh_world() {
        let mut runner = GameRunner::new(Probe { accept_tuning: true, ..Probe::default() });
        runner.init();
        assert!(runner.load_tuning("{}"));
        assert_eq!(runner.game().inits, 2);
        assert_eq!(runner.context().scene.len(), 1);
    }
}
