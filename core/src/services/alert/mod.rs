//! Human review of fraud alerts

mod service;

#[cfg(test)]
mod tests;

pub use service::FraudAlertService;
