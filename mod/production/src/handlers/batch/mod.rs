mod complete;

pub use complete::complete;
