//! 核心编排层：能力契约、错误、过程事件、主控循环

pub mod define;
pub mod error;
pub mod events;
pub mod orchestrator;

pub use define::{Entity, PromptInitializer, Prompter, RoundPrompt};
pub use error::{AgentError, BoxError, ErrorKind};
pub use events::AgentEvent;
pub use orchestrator::{Agent, RoundOutcome, Session, Termination, TerminationCause};
