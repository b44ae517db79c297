pub mod infra;
pub mod run;
pub mod up;
