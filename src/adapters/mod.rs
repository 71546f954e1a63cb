//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Language model providers (Anthropic, OpenAI, failover, mock)
//! - `storage` - Session stores

pub mod ai;
pub mod storage;

pub use ai::{AnthropicProvider, FailoverAIProvider, MockAIProvider, OpenAIProvider};
pub use storage::InMemorySessionStore;
