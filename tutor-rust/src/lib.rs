mod client;
mod config;
pub mod errors;
pub mod export;
mod gate;
pub mod history;
mod instruction;
mod params;
pub mod session;
pub mod storage;
mod tutor;
mod tutorial;
mod variant;

pub use client::{tutorial_schema, TutorialClient, TutorialService};
pub use config::{TutorConfig, API_KEY_ENV, DEFAULT_MODEL_ID};
pub use errors::{ConfigError, ExportError, GenerationError, PersistenceError, ValidationError};
pub use gate::Gate;
pub use history::{History, HistoryItem, HistoryStore, NewHistoryItem};
pub use instruction::{default_instructions, InstructionParam};
pub use params::TutorialClientParams;
pub use session::{Effect, GenerationRequest, Session, SessionEvent, SessionState};
pub use tutor::Tutor;
pub use tutorial::{strip_step_prefix, InvalidTutorial, Tutorial};
pub use variant::{Rgb, Variant};
