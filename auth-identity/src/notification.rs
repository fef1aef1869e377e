use crate::context::RequestContext;
use crate::error::AdapterError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Outbound SMS and email delivery
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_sms(
        &self,
        ctx: &RequestContext,
        recipients: &[String],
        body: &str,
    ) -> Result<(), AdapterError>;

    async fn send_email(
        &self,
        ctx: &RequestContext,
        address: &str,
        body: &str,
        subject: &str,
    ) -> Result<(), AdapterError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMessage {
    Sms { recipients: Vec<String>, body: String },
    Email { address: String, subject: String, body: String },
}

/// Notifier that keeps every message in memory
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentMessage>>,
    fail_sms: AtomicBool,
    fail_email: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_sms(&self, fail: bool) {
        self.fail_sms.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_email(&self, fail: bool) {
        self.fail_email.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().clone()
    }

    pub fn sms_to(&self, phone: &str) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter_map(|m| match m {
                SentMessage::Sms { recipients, body } if recipients.iter().any(|r| r == phone) => {
                    Some(body.clone())
                }
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_sms(
        &self,
        _ctx: &RequestContext,
        recipients: &[String],
        body: &str,
    ) -> Result<(), AdapterError> {
        if self.fail_sms.load(Ordering::SeqCst) {
            return Err(AdapterError::Unavailable("sms gateway offline".to_string()));
        }
        if recipients.is_empty() {
            return Err(AdapterError::Rejected("no recipients".to_string()));
        }
        self.sent.lock().push(SentMessage::Sms {
            recipients: recipients.to_vec(),
            body: body.to_string(),
        });
        Ok(())
    }

    async fn send_email(
        &self,
        _ctx: &RequestContext,
        address: &str,
        body: &str,
        subject: &str,
    ) -> Result<(), AdapterError> {
        if self.fail_email.load(Ordering::SeqCst) {
            return Err(AdapterError::Unavailable("mail relay offline".to_string()));
        }
        self.sent.lock().push(SentMessage::Email {
            address: address.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_and_filters_sms() {
        let notifier = RecordingNotifier::new();
        let ctx = RequestContext::background();

        notifier
            .send_sms(&ctx, &["+254700000000".to_string()], "hello")
            .await
            .unwrap();
        notifier.send_email(&ctx, "a@example.com", "body", "subject").await.unwrap();

        assert_eq!(notifier.sent().len(), 2);
        assert_eq!(notifier.sms_to("+254700000000"), vec!["hello".to_string()]);
        assert!(notifier.sms_to("+254711111111").is_empty());
    }

    #[tokio::test]
    async fn test_empty_recipients_rejected() {
        let notifier = RecordingNotifier::new();
        let err = notifier
            .send_sms(&RequestContext::background(), &[], "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::Rejected(_)));
        assert!(notifier.sent().is_empty());
    }
}
