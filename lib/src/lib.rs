mod codec;
mod error;
mod function;
mod iter;
mod point;
mod ring_buffer;
mod strategy;

pub use codec::*;
pub use error::*;
pub use function::*;
pub use iter::*;
pub use point::*;
pub use ring_buffer::*;
pub use strategy::*;
