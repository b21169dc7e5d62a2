pub(crate) mod entry;
pub(crate) mod index;
pub(crate) mod point;
pub(crate) mod renderer;
pub(crate) mod timing;
