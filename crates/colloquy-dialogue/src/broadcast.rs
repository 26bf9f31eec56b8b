// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Broadcast dispatcher.
//!
//! Fans one message out to many contacts. Each recipient is sent to
//! independently; a failure is recorded and the loop moves on.

use std::sync::Arc;
use std::time::Duration;

use colloquy_core::types::{Contact, OutboundPayload};
use colloquy_core::{CallBounds, ColloquyError, TransportAdapter};
use serde::Serialize;
use tracing::{info, warn};

use crate::ledger::ContactLedger;
use crate::recording;

/// Placeholder substituted by personalized broadcasts.
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Overall result of a fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BroadcastStatus {
    Success,
    PartialSuccess,
    Error,
}

/// One recipient that could not be reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryFailure {
    pub contact: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BroadcastReport {
    pub status: BroadcastStatus,
    pub sent_count: usize,
    pub total: usize,
    pub errors: Vec<DeliveryFailure>,
}

impl BroadcastReport {
    fn new(total: usize, sent_count: usize, errors: Vec<DeliveryFailure>) -> Self {
        let status = if errors.is_empty() {
            BroadcastStatus::Success
        } else if sent_count > 0 {
            BroadcastStatus::PartialSuccess
        } else {
            BroadcastStatus::Error
        };
        Self {
            status,
            sent_count,
            total,
            errors,
        }
    }
}

/// Sends administrative messages to contacts.
pub struct BroadcastDispatcher {
    transport: Arc<dyn TransportAdapter>,
    ledger: ContactLedger,
    pacing: Duration,
    bounds: CallBounds,
}

impl BroadcastDispatcher {
    pub fn new(
        transport: Arc<dyn TransportAdapter>,
        ledger: ContactLedger,
        pacing: Duration,
        bounds: CallBounds,
    ) -> Self {
        Self {
            transport,
            ledger,
            pacing,
            bounds,
        }
    }

    /// Sends `message` to an explicit recipient list.
    pub async fn send_to(
        &self,
        numbers: &[String],
        message: &str,
    ) -> Result<BroadcastReport, ColloquyError> {
        if numbers.is_empty() {
            return Err(ColloquyError::InvalidInput(
                "'numbers' must list at least one recipient".into(),
            ));
        }
        require_text(message, "message")?;

        let messages = numbers
            .iter()
            .map(|n| (n.clone(), message.to_string()))
            .collect();
        Ok(self.dispatch(messages).await)
    }

    /// Sends `message` to every known contact.
    pub async fn broadcast(&self, message: &str) -> Result<BroadcastReport, ColloquyError> {
        require_text(message, "message")?;
        let messages = self
            .ledger
            .directory()
            .into_keys()
            .map(|address| (address, message.to_string()))
            .collect();
        Ok(self.dispatch(messages).await)
    }

    /// Sends `template` to every known contact with `{name}` replaced by the
    /// display name, or the address local part when the name is unknown.
    pub async fn personalized(&self, template: &str) -> Result<BroadcastReport, ColloquyError> {
        if !template.contains(NAME_PLACEHOLDER) {
            return Err(ColloquyError::InvalidInput(format!(
                "'template' is required and must contain {NAME_PLACEHOLDER}"
            )));
        }
        let messages = self
            .ledger
            .directory()
            .into_iter()
            .map(|(address, name)| {
                let name = name.unwrap_or_else(|| Contact::address_local_part(&address).to_string());
                let text = template.replace(NAME_PLACEHOLDER, &name);
                (address, text)
            })
            .collect();
        Ok(self.dispatch(messages).await)
    }

    async fn dispatch(&self, messages: Vec<(String, String)>) -> BroadcastReport {
        let total = messages.len();
        let mut sent = 0;
        let mut errors = Vec::new();

        for (i, (contact, text)) in messages.into_iter().enumerate() {
            if i > 0 && !self.pacing.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(self.pacing) => {}
                    _ = self.bounds.token().cancelled() => {}
                }
            }

            let result = self
                .bounds
                .run(self.transport.send(&contact, OutboundPayload::Text(text)))
                .await;
            match result {
                Ok(()) => sent += 1,
                Err(e) => {
                    warn!(contact = %contact, error = %e, "broadcast delivery failed");
                    recording::record_delivery_failure("broadcast");
                    errors.push(DeliveryFailure {
                        contact,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(total, sent, failed = errors.len(), "broadcast finished");
        BroadcastReport::new(total, sent, errors)
    }
}

fn require_text(value: &str, field: &str) -> Result<(), ColloquyError> {
    if value.trim().is_empty() {
        return Err(ColloquyError::InvalidInput(format!("'{field}' is required")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use colloquy_core::StorageAdapter;
    use colloquy_core::types::ContactStatus;
    use colloquy_test_utils::TestHarness;

    async fn dispatcher(harness: &TestHarness) -> BroadcastDispatcher {
        let ledger = ContactLedger::new(harness.storage_dyn());
        ledger.load().await.unwrap();
        BroadcastDispatcher::new(
            Arc::new(harness.transport.clone()),
            ledger,
            Duration::ZERO,
            CallBounds::default(),
        )
    }

    async fn seed(harness: &TestHarness) {
        let store = harness.storage.as_ref();
        store
            .insert_contact("111@s.whatsapp.net", Some("Ana"), ContactStatus::Active)
            .await
            .unwrap();
        store
            .insert_contact("222@s.whatsapp.net", None, ContactStatus::PendingName)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn explicit_list_all_delivered() {
        let harness = TestHarness::new().await.unwrap();
        let report = dispatcher(&harness)
            .await
            .send_to(&["a@x".into(), "b@x".into()], "Promoção!")
            .await
            .unwrap();
        assert_eq!(report.status, BroadcastStatus::Success);
        assert_eq!((report.sent_count, report.total), (2, 2));
        assert_eq!(harness.transport.texts_to("b@x").await, vec!["Promoção!"]);
    }

    #[tokio::test]
    async fn one_failure_is_partial_success() {
        let harness = TestHarness::new().await.unwrap();
        harness.transport.fail_for("b@x").await;
        let report = dispatcher(&harness)
            .await
            .send_to(&["a@x".into(), "b@x".into(), "c@x".into()], "oi")
            .await
            .unwrap();
        assert_eq!(report.status, BroadcastStatus::PartialSuccess);
        assert_eq!(report.sent_count, 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].contact, "b@x");
        assert_eq!(harness.transport.texts_to("c@x").await.len(), 1);
    }

    #[tokio::test]
    async fn all_failures_is_error() {
        let harness = TestHarness::new().await.unwrap();
        harness.transport.fail_for("a@x").await;
        let report = dispatcher(&harness)
            .await
            .send_to(&["a@x".into()], "oi")
            .await
            .unwrap();
        assert_eq!(report.status, BroadcastStatus::Error);
    }

    #[tokio::test]
    async fn empty_inputs_are_rejected() {
        let harness = TestHarness::new().await.unwrap();
        let d = dispatcher(&harness).await;
        assert!(d.send_to(&[], "oi").await.unwrap_err().is_client_error());
        assert!(d.send_to(&["a@x".into()], "  ").await.unwrap_err().is_client_error());
        assert!(d.broadcast("").await.unwrap_err().is_client_error());
    }

    #[tokio::test]
    async fn broadcast_reaches_every_known_contact() {
        let harness = TestHarness::new().await.unwrap();
        seed(&harness).await;
        let report = dispatcher(&harness).await.broadcast("Aviso").await.unwrap();
        assert_eq!(report.total, 2);
        assert_eq!(harness.transport.sent().await.len(), 2);
    }

    #[tokio::test]
    async fn personalized_uses_name_or_local_part() {
        let harness = TestHarness::new().await.unwrap();
        seed(&harness).await;
        let report = dispatcher(&harness)
            .await
            .personalized("Olá {name}, tudo bem?")
            .await
            .unwrap();
        assert_eq!(report.status, BroadcastStatus::Success);
        assert_eq!(
            harness.transport.texts_to("111@s.whatsapp.net").await,
            vec!["Olá Ana, tudo bem?"]
        );
        assert_eq!(
            harness.transport.texts_to("222@s.whatsapp.net").await,
            vec!["Olá 222, tudo bem?"]
        );
    }

    #[tokio::test]
    async fn template_without_placeholder_is_rejected() {
        let harness = TestHarness::new().await.unwrap();
        seed(&harness).await;
        let err = dispatcher(&harness)
            .await
            .personalized("Olá, tudo bem?")
            .await
            .unwrap_err();
        assert!(err.is_client_error());
        assert!(harness.transport.sent().await.is_empty());
    }

    #[test]
    fn report_status_serializes_snake_case() {
        let report = BroadcastReport::new(2, 1, vec![DeliveryFailure {
            contact: "x".into(),
            reason: "down".into(),
        }]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "partial_success");
        assert_eq!(json["sent_count"], 1);
    }
}
