//! 核心数据模型定义

use crate::error::{Result, TriageError};
use crate::utils::normalize_name;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// 曼彻斯特分诊等级
///
/// 声明顺序即优先级顺序：`Red` 最紧急（0），`Blue` 最不紧急（4）。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    Red,    // 紧急
    Orange, // 非常紧急
    Yellow, // 较紧急
    Green,  // 不太紧急
    Blue,   // 不紧急
}

impl Classification {
    /// 按优先级升序排列的全部等级
    pub const ALL: [Classification; 5] = [
        Classification::Red,
        Classification::Orange,
        Classification::Yellow,
        Classification::Green,
        Classification::Blue,
    ];

    /// 符号名称
    pub fn name(&self) -> &'static str {
        match self {
            Classification::Red => "RED",
            Classification::Orange => "ORANGE",
            Classification::Yellow => "YELLOW",
            Classification::Green => "GREEN",
            Classification::Blue => "BLUE",
        }
    }

    /// 显示用颜色 emoji
    pub fn color(&self) -> &'static str {
        match self {
            Classification::Red => "🟥",
            Classification::Orange => "🟧",
            Classification::Yellow => "🟨",
            Classification::Green => "🟩",
            Classification::Blue => "🟦",
        }
    }

    /// 等级说明
    pub fn description(&self) -> &'static str {
        match self {
            Classification::Red => "Emergência (atendimento imediato!)",
            Classification::Orange => "Muito urgente",
            Classification::Yellow => "Urgente",
            Classification::Green => "Pouco urgente",
            Classification::Blue => "Não urgente",
        }
    }

    /// 优先级，0 最紧急
    pub fn priority(&self) -> u8 {
        *self as u8
    }

    /// 界面显示用的十六进制颜色
    pub fn hex_color(&self) -> &'static str {
        match self {
            Classification::Red => "#E53E3E",
            Classification::Orange => "#DD6B20",
            Classification::Yellow => "#D69E2E",
            Classification::Green => "#38A169",
            Classification::Blue => "#3182CE",
        }
    }

    /// 根据优先级查找分诊等级
    pub fn by_priority(rank: u8) -> Result<Classification> {
        Self::ALL
            .get(rank as usize)
            .copied()
            .ok_or_else(|| {
                TriageError::NotFound(format!("no classification with priority {}", rank))
            })
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.color(), self.name())
    }
}

/// 患者
///
/// 名称在创建时去除首尾空白；身份由生成的 `id` 决定，与名称无关。
#[derive(Debug, Clone, Serialize)]
pub struct Patient {
    id: Uuid,
    name: String,
    registered_at: DateTime<Utc>,
}

impl Patient {
    /// 创建患者，名称为空或仅含空白时返回校验错误
    pub fn new(name: &str) -> Result<Self> {
        let name = normalize_name(name).ok_or_else(|| {
            TriageError::Validation("patient name must be a non-empty string".to_string())
        })?;

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            registered_at: Utc::now(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }
}

impl PartialEq for Patient {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Patient {}

impl Hash for Patient {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Patient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Patient({})", self.name)
    }
}
