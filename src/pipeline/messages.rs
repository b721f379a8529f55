use crate::app::ports::HandoffPort;
use crate::constants::HANDOFF_KEY;
use crate::error::{EtlError, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extract,
    Transform,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Extract => f.write_str("extract"),
            Stage::Transform => f.write_str("transform"),
        }
    }
}

/// Typed payload one stage hands to the next in scheduled-task mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageMessage<T> {
    pub run_id: Uuid,
    pub stage: Stage,
    pub produced_at: DateTime<Utc>,
    pub payload: T,
}

impl<T> StageMessage<T> {
    pub fn new(run_id: Uuid, stage: Stage, payload: T) -> Self {
        Self {
            run_id,
            stage,
            produced_at: Utc::now(),
            payload,
        }
    }
}

fn key_for(stage: Stage) -> String {
    format!("{}/{}", stage, HANDOFF_KEY)
}

pub async fn publish<T: Serialize>(handoff: &dyn HandoffPort, message: &StageMessage<T>) -> Result<()> {
    let json = serde_json::to_string(message)?;
    handoff
        .push(&key_for(message.stage), json)
        .await
        .map_err(EtlError::Handoff)
}

/// Drops every stage's message so no payload outlives its run.
pub async fn clear(handoff: &dyn HandoffPort) -> Result<()> {
    for stage in [Stage::Extract, Stage::Transform] {
        handoff.remove(&key_for(stage)).await.map_err(EtlError::Handoff)?;
    }
    Ok(())
}

pub async fn receive<T: DeserializeOwned>(
    handoff: &dyn HandoffPort,
    stage: Stage,
) -> Result<StageMessage<T>> {
    let json = handoff.pull(&key_for(stage)).await.map_err(EtlError::Handoff)?;
    let message: StageMessage<T> = serde_json::from_str(&json)?;
    if message.stage != stage {
        return Err(EtlError::Handoff(format!(
            "expected a {} message, got {}",
            stage, message.stage
        )));
    }
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::handoff::InMemoryHandoff;

    #[tokio::test]
    async fn receive_returns_published_payload() {
        let handoff = InMemoryHandoff::new();
        let run_id = Uuid::new_v4();
        publish(&handoff, &StageMessage::new(run_id, Stage::Extract, vec![1u32, 2, 3]))
            .await
            .unwrap();

        let message: StageMessage<Vec<u32>> = receive(&handoff, Stage::Extract).await.unwrap();
        assert_eq!(message.run_id, run_id);
        assert_eq!(message.payload, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn mislabelled_message_is_rejected() {
        let handoff = InMemoryHandoff::new();
        let forged = StageMessage::new(Uuid::new_v4(), Stage::Transform, 0u8);
        handoff
            .push("extract/rows", serde_json::to_string(&forged).unwrap())
            .await
            .unwrap();

        let err = receive::<u8>(&handoff, Stage::Extract).await.unwrap_err();
        assert!(matches!(err, EtlError::Handoff(_)));
    }

    #[tokio::test]
    async fn clear_drops_all_stage_messages() {
        let handoff = InMemoryHandoff::new();
        let run_id = Uuid::new_v4();
        publish(&handoff, &StageMessage::new(run_id, Stage::Extract, 1u8)).await.unwrap();
        publish(&handoff, &StageMessage::new(run_id, Stage::Transform, 2u8)).await.unwrap();

        clear(&handoff).await.unwrap();
        assert!(receive::<u8>(&handoff, Stage::Extract).await.is_err());
        assert!(receive::<u8>(&handoff, Stage::Transform).await.is_err());
    }

    #[tokio::test]
    async fn missing_message_is_handoff_error() {
        let handoff = InMemoryHandoff::new();
        let err = receive::<u8>(&handoff, Stage::Transform).await.unwrap_err();
        assert!(matches!(err, EtlError::Handoff(_)));
    }
}
