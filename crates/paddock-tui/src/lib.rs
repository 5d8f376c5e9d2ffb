pub mod action;
pub mod animator;
pub mod app;
pub mod player;
pub mod theme;
pub mod tree;
