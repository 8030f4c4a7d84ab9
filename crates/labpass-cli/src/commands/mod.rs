pub mod get;
pub mod recipes;
pub mod run;
