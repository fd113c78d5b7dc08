pub mod controller;
pub mod intake;
pub mod model;
pub mod normalizer;
pub mod preview;
pub mod routes;
pub mod schema;
pub mod session;
pub mod stats;
pub mod unifier;
