pub mod cli;
pub mod conf;
pub mod logging;
pub mod parser;
pub mod pubsub;
pub mod report;
pub mod stats;
pub mod supervisor;
pub mod tailer;
