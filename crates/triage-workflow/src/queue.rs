//! 分诊桶队列
//!
//! 单个分诊等级的先进先出患者队列。

use std::collections::VecDeque;
use triage_core::{Patient, Result, TriageError};

/// 患者先进先出队列
#[derive(Debug, Default)]
pub struct PatientQueue {
    items: VecDeque<Patient>,
}

impl PatientQueue {
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    /// 入队到队尾
    pub fn enqueue(&mut self, patient: Patient) {
        tracing::trace!("Enqueued {}", patient);
        self.items.push_back(patient);
    }

    /// 从队头出队，队列为空时返回 `EmptyQueue`
    pub fn dequeue(&mut self) -> Result<Patient> {
        let patient = self.items.pop_front().ok_or(TriageError::EmptyQueue)?;
        tracing::trace!("Dequeued {}", patient);
        Ok(patient)
    }

    /// 查看队头但不出队
    pub fn peek(&self) -> Option<&Patient> {
        self.items.front()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}
