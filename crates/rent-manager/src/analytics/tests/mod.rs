mod common;
mod compliance;
