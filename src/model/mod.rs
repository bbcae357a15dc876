pub mod denial;
pub mod game_state;
pub mod message;
