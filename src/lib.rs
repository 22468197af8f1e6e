//! Fixed-grid Snake: a deterministic rule engine, a fixed-timestep frame
//! loop, and a terminal front-end.

pub mod config;
pub mod frame_loop;
pub mod fruit;
pub mod game;
pub mod input;
pub mod logging;
pub mod renderer;
pub mod snake;
pub mod terminal_runtime;

pub mod ui {
    pub mod hud;
    pub mod menu;
}
