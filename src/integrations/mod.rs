pub mod dispatcher;
pub mod remote;
pub mod stream_player;
