// Walk-in Infrastructure - HTTP Adapters
// Implements: MessageTransport (Twilio), QueueStore (PostgREST / Supabase)

mod error;
pub mod postgrest;
pub mod twilio;

#[cfg(test)]
mod stub_server;

pub use postgrest::{PostgrestConfig, PostgrestQueueStore};
pub use twilio::{TwilioConfig, TwilioTransport};
