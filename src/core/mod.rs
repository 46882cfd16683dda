pub mod clock;
pub mod constants;
pub mod encounter;
pub mod schedule;
pub mod view;
