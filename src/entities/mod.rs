pub mod actor;
pub mod director;
pub mod dressing_room;
pub mod movie;
pub mod movie_actor;
