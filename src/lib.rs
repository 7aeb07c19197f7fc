//! State core of a three-lane (Todo/Doing/Done) task board: a partial-update
//! state container, an ordered tag registry, the board itself, the
//! drag-and-drop transfer protocol, and a fire-and-forget persistence bridge.

pub mod board;
pub mod cli;
pub mod commands;
pub mod drag;
pub mod model;
pub mod popup;
pub mod state;
pub mod storage;
pub mod tags;
