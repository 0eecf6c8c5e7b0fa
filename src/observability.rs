use biometrics::{Collector, Counter, Moments};

pub(crate) static RELAY_REQUESTS: Counter = Counter::new("colloquy.relay.requests");
pub(crate) static RELAY_REQUEST_ERRORS: Counter = Counter::new("colloquy.relay.request_errors");
pub(crate) static RELAY_REQUEST_DURATION: Moments =
    Moments::new("colloquy.relay.request_duration_seconds");
pub(crate) static RELAY_DELETE_BATCHES: Counter = Counter::new("colloquy.relay.delete_batches");

pub(crate) static CHAT_TURNS: Counter = Counter::new("colloquy.chat.turns");
pub(crate) static CHAT_TURN_ERRORS: Counter = Counter::new("colloquy.chat.turn_errors");
pub(crate) static CHAT_INTERRUPTS: Counter = Counter::new("colloquy.chat.interrupts");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&RELAY_REQUESTS);
    collector.register_counter(&RELAY_REQUEST_ERRORS);
    collector.register_moments(&RELAY_REQUEST_DURATION);
    collector.register_counter(&RELAY_DELETE_BATCHES);

    collector.register_counter(&CHAT_TURNS);
    collector.register_counter(&CHAT_TURN_ERRORS);
    collector.register_counter(&CHAT_INTERRUPTS);
}
