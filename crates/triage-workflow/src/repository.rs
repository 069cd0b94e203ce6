//! 分诊队列仓库
//!
//! 每个分诊等级对应一个先进先出队列。叫号时严格按等级优先级
//! 从红色到蓝色扫描，同一等级内先到先服务，不做等待时长补偿。

use crate::queue::PatientQueue;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use triage_core::{Classification, Patient, Result, TriageError};

/// 队列仓库接口
#[async_trait]
pub trait QueueRepository: Send + Sync + std::fmt::Debug {
    /// 将患者加入对应等级的队列
    async fn add_patient(&self, patient: Patient, classification: Classification) -> Result<()>;

    /// 取出下一位患者，所有队列为空时返回 `None`
    async fn get_next_patient(&self) -> Result<Option<Patient>>;

    /// 各等级队列的当前人数
    async fn get_status(&self) -> Result<QueueStatus>;
}

/// 队列状态快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStatus {
    counts: BTreeMap<Classification, usize>,
}

impl QueueStatus {
    pub fn new(counts: BTreeMap<Classification, usize>) -> Self {
        Self { counts }
    }

    /// 指定等级的人数，未记录的等级视为 0
    pub fn count(&self, classification: Classification) -> usize {
        self.counts.get(&classification).copied().unwrap_or(0)
    }

    /// 等待中的患者总数
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// 按优先级排序的 (等级, 人数)
    pub fn entries(&self) -> Vec<(Classification, usize)> {
        Classification::ALL
            .iter()
            .map(|c| (*c, self.count(*c)))
            .collect()
    }

    pub fn as_map(&self) -> &BTreeMap<Classification, usize> {
        &self.counts
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.counts)?)
    }
}

/// 内存队列仓库
#[derive(Debug)]
pub struct InMemoryQueueRepository {
    queues: RwLock<HashMap<Classification, PatientQueue>>,
}

impl InMemoryQueueRepository {
    /// 创建仓库，为每个分诊等级建立一个空队列
    pub fn new() -> Self {
        let queues = Classification::ALL
            .iter()
            .map(|c| (*c, PatientQueue::new()))
            .collect();
        tracing::info!(
            "In-memory queue repository initialized with {} queues",
            Classification::ALL.len()
        );

        Self {
            queues: RwLock::new(queues),
        }
    }

    /// 仅包含部分等级队列的仓库，用于验证缺失队列的错误路径
    #[cfg(test)]
    pub(crate) fn with_classifications(classifications: &[Classification]) -> Self {
        let queues = classifications
            .iter()
            .map(|c| (*c, PatientQueue::new()))
            .collect();
        Self {
            queues: RwLock::new(queues),
        }
    }
}

impl Default for InMemoryQueueRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn queue_for(
    queues: &mut HashMap<Classification, PatientQueue>,
    classification: Classification,
) -> Result<&mut PatientQueue> {
    queues.get_mut(&classification).ok_or_else(|| {
        TriageError::InvalidArgument(format!(
            "classification {} has no queue",
            classification.name()
        ))
    })
}

#[async_trait]
impl QueueRepository for InMemoryQueueRepository {
    async fn add_patient(&self, patient: Patient, classification: Classification) -> Result<()> {
        let mut queues = self.queues.write().await;
        let queue = queue_for(&mut queues, classification)?;

        tracing::info!("Patient '{}' added to {} queue", patient.name(), classification.name());
        queue.enqueue(patient);
        Ok(())
    }

    async fn get_next_patient(&self) -> Result<Option<Patient>> {
        let mut queues = self.queues.write().await;

        for classification in Classification::ALL {
            let queue = queue_for(&mut queues, classification)?;
            if queue.is_empty() {
                continue;
            }

            let patient = queue.dequeue()?;
            tracing::info!(
                "Calling patient '{}' from {} queue",
                patient.name(),
                classification.name()
            );
            return Ok(Some(patient));
        }

        tracing::debug!("All queues are empty");
        Ok(None)
    }

    async fn get_status(&self) -> Result<QueueStatus> {
        let queues = self.queues.read().await;
        let counts = queues
            .iter()
            .map(|(classification, queue)| (*classification, queue.len()))
            .collect();
        Ok(QueueStatus::new(counts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn patient(name: &str) -> Patient {
        Patient::new(name).unwrap()
    }

    #[tokio::test]
    async fn test_priority_order() {
        let repo = InMemoryQueueRepository::new();
        repo.add_patient(patient("blue"), Classification::Blue).await.unwrap();
        repo.add_patient(patient("yellow"), Classification::Yellow).await.unwrap();
        repo.add_patient(patient("red"), Classification::Red).await.unwrap();

        let first = repo.get_next_patient().await.unwrap().unwrap();
        let second = repo.get_next_patient().await.unwrap().unwrap();
        let third = repo.get_next_patient().await.unwrap().unwrap();
        assert_eq!(first.name(), "red");
        assert_eq!(second.name(), "yellow");
        assert_eq!(third.name(), "blue");
        assert!(repo.get_next_patient().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fifo_within_classification() {
        let repo = InMemoryQueueRepository::new();
        repo.add_patient(patient("A"), Classification::Orange).await.unwrap();
        repo.add_patient(patient("B"), Classification::Orange).await.unwrap();

        assert_eq!(repo.get_next_patient().await.unwrap().unwrap().name(), "A");
        assert_eq!(repo.get_next_patient().await.unwrap().unwrap().name(), "B");
    }

    #[tokio::test]
    async fn test_low_priority_waits_for_all_higher() {
        let repo = InMemoryQueueRepository::new();
        repo.add_patient(patient("blue"), Classification::Blue).await.unwrap();
        for classification in &Classification::ALL[..4] {
            repo.add_patient(patient(classification.name()), *classification).await.unwrap();
        }

        let mut served = Vec::new();
        while let Some(p) = repo.get_next_patient().await.unwrap() {
            served.push(p.name().to_string());
        }
        assert_eq!(served, vec!["RED", "ORANGE", "YELLOW", "GREEN", "blue"]);
    }

    #[tokio::test]
    async fn test_status_counts() {
        let repo = InMemoryQueueRepository::new();
        repo.add_patient(patient("r1"), Classification::Red).await.unwrap();
        repo.add_patient(patient("r2"), Classification::Red).await.unwrap();
        repo.add_patient(patient("g1"), Classification::Green).await.unwrap();

        let status = repo.get_status().await.unwrap();
        let expected: BTreeMap<Classification, usize> = [
            (Classification::Red, 2),
            (Classification::Orange, 0),
            (Classification::Yellow, 0),
            (Classification::Green, 1),
            (Classification::Blue, 0),
        ]
        .into_iter()
        .collect();
        assert_eq!(status.as_map(), &expected);
        assert_eq!(status.total(), 3);
    }

    #[tokio::test]
    async fn test_status_is_idempotent() {
        let repo = InMemoryQueueRepository::new();
        repo.add_patient(patient("y"), Classification::Yellow).await.unwrap();

        let first = repo.get_status().await.unwrap();
        let second = repo.get_status().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.count(Classification::Yellow), 1);
    }

    #[tokio::test]
    async fn test_status_entries_sorted_by_priority() {
        let repo = InMemoryQueueRepository::new();
        repo.add_patient(patient("b"), Classification::Blue).await.unwrap();

        let entries = repo.get_status().await.unwrap().entries();
        let order: Vec<u8> = entries.iter().map(|(c, _)| c.priority()).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
        assert_eq!(entries[4], (Classification::Blue, 1));
    }

    #[tokio::test]
    async fn test_status_json_uses_symbolic_names() {
        let repo = InMemoryQueueRepository::new();
        repo.add_patient(patient("o"), Classification::Orange).await.unwrap();

        let json = repo.get_status().await.unwrap().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["ORANGE"], 1);
        assert_eq!(value["RED"], 0);
    }

    #[tokio::test]
    async fn test_missing_queue_is_invalid_argument() {
        let repo = InMemoryQueueRepository::with_classifications(&[Classification::Red]);
        let result = repo.add_patient(patient("x"), Classification::Blue).await;
        assert!(matches!(result, Err(TriageError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_concurrent_adds_and_calls() {
        let repo = Arc::new(InMemoryQueueRepository::new());
        let mut handles = Vec::new();
        for i in 0..50 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                let classification = Classification::ALL[i % 5];
                repo.add_patient(Patient::new(&format!("p{}", i)).unwrap(), classification)
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(repo.get_status().await.unwrap().total(), 50);

        let mut callers = Vec::new();
        for _ in 0..60 {
            let repo = Arc::clone(&repo);
            callers.push(tokio::spawn(async move { repo.get_next_patient().await }));
        }
        let mut seen = std::collections::HashSet::new();
        for caller in callers {
            if let Some(p) = caller.await.unwrap().unwrap() {
                assert!(seen.insert(p.id()), "patient dequeued twice");
            }
        }
        assert_eq!(seen.len(), 50);
        assert!(repo.get_status().await.unwrap().is_empty());
    }
}
