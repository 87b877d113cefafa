pub mod output;
pub mod root;
pub mod router;
