pub mod assemble;
pub mod boundary;
pub mod classify;
pub mod config;
pub mod dom;
pub mod fetch;
pub mod finalize;
pub mod labels;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod record;
pub mod render;
