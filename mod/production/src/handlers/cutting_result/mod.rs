mod confirm;

pub use confirm::confirm;
