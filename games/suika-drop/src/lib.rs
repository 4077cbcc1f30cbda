use wasm_bindgen::prelude::*;
use drop_engine::*;

pub mod arena;
pub mod config;
pub mod game;
pub mod loss;
pub mod merge;
pub mod score;
pub mod sizes;
pub mod spawn;

use game::SuikaGame;

drop_web::export_game!(SuikaGame, "suika-drop");
