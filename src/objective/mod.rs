mod calculator;

pub use calculator::{Argument, Calculator, Score, Scope};
