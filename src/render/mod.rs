pub(crate) mod lifetime;
pub(crate) mod pool;
pub(crate) mod renderer;
pub(crate) mod scheduler;
