//! Order notifications.
//!
//! Checkout talks to a [`Notifier`] chosen and constructed by the process
//! entry point — never a module-level global — so transports can be swapped
//! without touching the checkout flow, and tests can record calls. Delivery
//! is strictly best effort: implementations report failures through the
//! normal `Result`, and the caller logs and moves on.

use crate::{
    config::NotificationConfig,
    entities::{order, order_item},
    errors::Result,
};
use async_trait::async_trait;
use tracing::info;

/// Outbound side of checkout: told exactly once per placed order.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers the confirmation for a freshly placed order.
    async fn order_placed(
        &self,
        order: &order::Model,
        items: &[order_item::Model],
    ) -> Result<()>;
}

/// Default notifier: renders the customer confirmation, the admin alert,
/// and (when enabled and a phone number exists) the SMS text, and emits each
/// through `tracing`. Real email/SMS providers implement [`Notifier`] and
/// replace this at startup.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    config: NotificationConfig,
}

impl LogNotifier {
    /// Builds a notifier from the `[notifications]` config section.
    pub fn new(config: NotificationConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn order_placed(
        &self,
        order: &order::Model,
        items: &[order_item::Model],
    ) -> Result<()> {
        let confirmation = customer_confirmation(order);
        info!(
            order_number = %order.order_number,
            items = items.len(),
            message = %confirmation,
            "customer order confirmation"
        );

        info!(
            order_number = %order.order_number,
            admin_email = %self.config.admin_email,
            site = %self.config.site_name,
            total = %order.total_price,
            "admin order notification"
        );

        if self.config.sms_enabled && !order.phone_number.trim().is_empty() {
            let recipient =
                normalize_phone(&order.phone_number, &self.config.default_country_code);
            info!(
                order_number = %order.order_number,
                recipient = %recipient,
                message = %sms_text(order),
                "order confirmation sms"
            );
        }

        Ok(())
    }
}

/// Customer-facing confirmation line.
fn customer_confirmation(order: &order::Model) -> String {
    format!(
        "Thank you for your order #{}. Total amount: ${}",
        order.order_number, order.total_price
    )
}

/// SMS body: the confirmation plus the shipping follow-up promise.
fn sms_text(order: &order::Model) -> String {
    format!(
        "Thank you for your order #{}. Total amount: ${}. We'll notify you when it ships.",
        order.order_number, order.total_price
    )
}

/// Normalizes a phone number to international form.
///
/// Numbers already carrying a `+` pass through untouched; local numbers lose
/// their leading zeros and gain the configured country code.
pub fn normalize_phone(phone: &str, country_code: &str) -> String {
    let phone = phone.trim();
    if phone.starts_with('+') {
        return phone.to_string();
    }
    let stripped = phone.trim_start_matches('0');
    if stripped.starts_with(country_code) {
        format!("+{stripped}")
    } else {
        format!("+{country_code}{stripped}")
    }
}
