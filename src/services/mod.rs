pub mod assistant;
pub mod chatbot;
pub mod completion;
pub mod dialogue;
pub mod extractor;
pub mod session_manager;
