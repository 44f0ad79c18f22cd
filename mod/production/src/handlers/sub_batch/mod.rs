mod complete;
mod verify;

pub use complete::complete;
pub use verify::verify;
