use std::{collections::BTreeMap, thread, time::Duration};

use kafka::client::RequiredAcks;
use kafka::producer::{Producer, Record};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

pub const SIGN_IN_MAGIC_LINK_TEMPLATE: &str = "sign-in-magic-link";

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("kafka: {0}")]
    Kafka(#[from] kafka::Error),
    #[error("cannot start relay thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// A request for the mailer to render `template` with `params` and send it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EmailTask {
    pub template: String,
    pub subject: String,
    pub to: Vec<String>,
    pub params: BTreeMap<String, String>,
}

impl EmailTask {
    pub fn sign_in_magic_link(email: &str, name: &str, magic_link: &str) -> Self {
        let params = BTreeMap::from([
            ("magic_link".to_string(), magic_link.to_string()),
            ("name".to_string(), name.to_string()),
        ]);

        Self {
            template: SIGN_IN_MAGIC_LINK_TEMPLATE.to_string(),
            subject: "Sign in to Food Shop".to_string(),
            to: vec![email.to_string()],
            params,
        }
    }
}

/// Accepts email tasks without waiting for them to be delivered.
#[cfg_attr(test, mockall::automock)]
pub trait EmailDispatcher: Send + Sync {
    fn submit(&self, task: EmailTask);
}

/// Hands tasks to a relay thread that publishes them to Kafka.
pub struct KafkaEmailQueue {
    sender: mpsc::UnboundedSender<EmailTask>,
}

impl KafkaEmailQueue {
    pub fn start(hosts: Vec<String>, topic: String) -> Result<Self, QueueError> {
        let producer = Producer::from_hosts(hosts)
            .with_ack_timeout(Duration::from_secs(1))
            .with_required_acks(RequiredAcks::One)
            .create()?;

        let (sender, receiver) = mpsc::unbounded_channel();
        thread::Builder::new()
            .name("email-relay".to_string())
            .spawn(move || relay(producer, topic, receiver))?;

        Ok(Self { sender })
    }
}

impl EmailDispatcher for KafkaEmailQueue {
    fn submit(&self, task: EmailTask) {
        if let Err(err) = self.sender.send(task) {
            error!(template = %err.0.template, "email relay is not running, task dropped");
        }
    }
}

fn relay(mut producer: Producer, topic: String, mut receiver: mpsc::UnboundedReceiver<EmailTask>) {
    info!(%topic, "email relay started");

    while let Some(task) = receiver.blocking_recv() {
        let payload = match serde_json::to_vec(&task) {
            Ok(payload) => payload,
            Err(err) => {
                error!(error = %err, template = %task.template, "cannot encode email task");
                continue;
            }
        };

        let record = Record::from_key_value(&topic, task.template.clone(), payload);
        match producer.send(&record) {
            Ok(()) => debug!(template = %task.template, "email task published"),
            Err(err) => error!(error = %err, template = %task.template, "failed to publish email task"),
        }
    }

    info!("email relay stopped");
}
