pub mod conf;
mod run;

pub use run::run;
