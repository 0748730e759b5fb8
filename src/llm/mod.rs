//! Text generation backends and prompt templates.

pub mod generator;
pub mod prompts;

pub use generator::{
    GeneratorFactory, LlmBackend, MockGenerator, MockGeneratorFactory, TextGenerator,
    UnavailableGeneratorFactory,
};
pub use prompts::PromptSet;
