pub mod agent;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod models;
pub mod repl;
pub mod retry;
pub mod server;
pub mod session;
pub mod skills;
pub mod translate;
pub mod transport;

pub use crate::dispatch::{Classifier, DispatchEntry, DispatchMode, Dispatcher, Specialist, Topic};
pub use crate::error::{Result, SkillHubError};
pub use crate::session::{Hub, MenuChoice, SessionMode, SessionState};
