// Queue interval statistics as the analytics API reports them and as the
// stats table stores them, plus the flattener between the two. Persistence
// goes through the repository contract.

pub mod entity;
pub mod flatten;
pub mod repository;
