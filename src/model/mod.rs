pub mod compile;
pub mod graph_model;
pub mod layer_connection;
pub mod stats;
pub mod weight_init;
