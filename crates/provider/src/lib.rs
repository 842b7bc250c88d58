pub mod gemini;

pub use gemini::GeminiForwarder;
