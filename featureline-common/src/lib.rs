pub mod algorithms;
pub mod configs;
pub mod features;
pub mod structures;
pub mod utils;
