//! 分诊引擎演示程序
//!
//! 展示决策树问答、按等级入队和严格优先级叫号

use std::sync::Arc;
use manchester_triage::{Classification, InMemoryQueueRepository, ScriptedAnswers, TriageEngine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt::init();

    let engine = TriageEngine::new(Arc::new(InMemoryQueueRepository::new()))?;

    println!("🏥 曼彻斯特分诊引擎演示\n");

    // 1. 打印决策树问题
    let mut node = Arc::clone(engine.tree());
    while let Some(question) = node.question_text() {
        println!("❓ {}", question);
        let next = node.no_child().map(Arc::clone);
        match next {
            Some(next) => node = next,
            None => break,
        }
    }

    // 2. 按不同回答登记患者
    let patients: Vec<(&str, Vec<bool>)> = vec![
        ("Maria", vec![false, false, false, false]),
        ("João", vec![false, false, true]),
        ("Ana", vec![true]),
        ("Pedro", vec![false, false, false, true]),
        ("Lucas", vec![false, true]),
    ];

    for (name, answers) in patients {
        let mut answers = ScriptedAnswers::new(answers);
        let registration = engine.register_patient(name, &mut answers).await?;
        println!("📋 {} -> {}", registration.patient_name, registration.classification);
    }

    // 3. 队列状态
    let status = engine.queue_status().await?;
    println!("\n📊 队列状态:");
    for (classification, size) in status.entries() {
        println!("   {} {:<7} {}", classification.color(), classification.name(), size);
    }
    println!("   总计: {}", status.total());

    // 4. 按优先级叫号
    println!("\n📢 叫号顺序:");
    while let Some(patient) = engine.call_next_patient().await? {
        println!("   ==> {}", patient.name());
    }

    println!(
        "\n✅ 演示完成 (等级数: {}, 最低优先级: {})",
        Classification::ALL.len(),
        Classification::by_priority(4)?
    );
    Ok(())
}
