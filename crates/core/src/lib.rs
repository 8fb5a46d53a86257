//! Deterministic bingo engine: seeded cards, win patterns, and the compact
//! codecs used in share links. Keep this crate free of IO and platform concerns.

pub mod cards;
pub mod codec;
pub mod codes;
pub mod config;
pub mod draw;
pub mod events;
pub mod game;
pub mod patterns;
pub mod rng;
pub mod sanitize;
pub mod share;
pub mod theme;
pub mod win;

pub use cards::*;
pub use codec::*;
pub use codes::*;
pub use config::*;
pub use draw::*;
pub use events::*;
pub use game::*;
pub use patterns::*;
pub use rng::*;
pub use sanitize::*;
pub use share::*;
pub use theme::*;
pub use win::*;
