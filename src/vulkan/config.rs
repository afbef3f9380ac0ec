/// Hardware engine a queue should be created on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Engine {
    /// Whatever the first graphics-capable family is.
    #[default]
    Unknown,
    /// Render engine.
    Rcs,
    /// Compute engine.
    Ccs,
    /// Copy engine.
    Bcs,
}

/// How the device context should be brought up. Built with chained by-value
/// options and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueConfiguration {
    create_queue: bool,
    require_creation_success: bool,
    profiling: bool,
    validation: bool,
    debug_layer: bool,
    engine: Engine,
    device_index: u32,
}

impl Default for QueueConfiguration {
    fn default() -> Self {
        Self {
            create_queue: true,
            require_creation_success: true,
            profiling: false,
            validation: false,
            debug_layer: false,
            engine: Engine::Unknown,
            device_index: 0,
        }
    }
}

impl QueueConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn allow_creation_fail(mut self) -> Self {
        self.require_creation_success = false;
        self
    }

    /// Pins the queue to the copy engine; `false` leaves the engine as is.
    #[must_use]
    pub fn force_blitter(self, enabled: bool) -> Self {
        if enabled { self.engine(Engine::Bcs) } else { self }
    }

    #[must_use]
    pub fn engine(mut self, engine: Engine) -> Self {
        self.engine = engine;
        self
    }

    #[must_use]
    pub fn profiling(mut self, enabled: bool) -> Self {
        self.profiling = enabled;
        self
    }

    #[must_use]
    pub fn validation(mut self, enabled: bool) -> Self {
        self.validation = enabled;
        self
    }

    #[must_use]
    pub fn debug_layer(mut self, enabled: bool) -> Self {
        self.debug_layer = enabled;
        self
    }

    #[must_use]
    pub fn device_index(mut self, index: u32) -> Self {
        self.device_index = index;
        self
    }

    /// No queue, no pool: only instance and physical device queries.
    #[must_use]
    pub fn disable(mut self) -> Self {
        self.create_queue = false;
        self
    }

    pub fn creates_queue(&self) -> bool {
        self.create_queue
    }

    pub fn requires_creation_success(&self) -> bool {
        self.require_creation_success
    }

    pub fn is_profiling(&self) -> bool {
        self.profiling
    }

    pub fn wants_validation(&self) -> bool {
        self.validation
    }

    pub fn wants_debug_layer(&self) -> bool {
        self.debug_layer
    }

    /// Debug utils are needed by either the validation or the debug request.
    pub fn wants_debug_utils(&self) -> bool {
        self.validation || self.debug_layer
    }

    pub fn selected_engine(&self) -> Engine {
        self.engine
    }

    pub fn selected_device_index(&self) -> u32 {
        self.device_index
    }
}
