pub mod canvas;
pub mod graphics;
