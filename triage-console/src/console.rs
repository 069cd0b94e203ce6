//! 交互式控制台
//!
//! 只负责输入输出，所有分诊逻辑都交给 `TriageEngine`。

use anyhow::Result;
use async_trait::async_trait;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use triage_admin::{ConsoleConfig, StatusFormat};
use triage_core::TriageError;
use triage_workflow::{AnswerProvider, QueueStatus, TriageEngine};

const SEPARATOR: &str = "-----------------------------------";

/// 解析是/否回答，无法识别时返回 `None`
pub fn parse_answer(input: &str) -> Option<bool> {
    match input.trim().to_uppercase().as_str() {
        "S" | "SIM" | "Y" | "YES" => Some(true),
        "N" | "NAO" | "NÃO" | "NO" => Some(false),
        _ => None,
    }
}

/// 解析菜单选项，只接受纯 ASCII 数字，数值过大时按无效选项处理
fn parse_menu_choice(input: &str) -> Option<u32> {
    let input = input.trim();
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(input.parse().unwrap_or(u32::MAX))
}

/// 菜单操作后的走向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// 控制台会话
pub struct Console<R, W> {
    engine: TriageEngine,
    settings: ConsoleConfig,
    lines: Lines<R>,
    out: W,
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    pub fn new(engine: TriageEngine, settings: ConsoleConfig, input: R, out: W) -> Self {
        Self {
            engine,
            settings,
            lines: input.lines(),
            out,
        }
    }

    /// 运行菜单循环，直到选择退出或输入结束
    pub async fn run(&mut self) -> Result<()> {
        if self.settings.show_banner {
            writeln!(self.out, "Inicializando o Manchester Protocol Simulator...")?;
        }

        loop {
            self.show_menu()?;
            let choice = match self.read_line("\nEscolha uma opção (1, 2, 3 ou 0): ").await? {
                Some(choice) => choice,
                None => break,
            };
            writeln!(self.out, "{}", SEPARATOR)?;

            let choice = choice.trim();
            let flow = match parse_menu_choice(choice) {
                None => {
                    writeln!(self.out, "\nERRO: Por favor, digite apenas números.")?;
                    Flow::Continue
                }
                Some(1) => self.handle_register().await?,
                Some(2) => self.handle_call_next().await?,
                Some(3) => self.handle_status().await?,
                Some(0) => {
                    writeln!(self.out, "\nEncerrando o sistema. Até logo!")?;
                    Flow::Exit
                }
                Some(_) => {
                    writeln!(self.out, "\nOpção '{}' inválida. Tente novamente.", choice)?;
                    Flow::Continue
                }
            };

            if flow == Flow::Exit {
                break;
            }

            if self.settings.pause_after_action
                && self.read_line("\nPressione ENTER para continuar...").await?.is_none()
            {
                break;
            }
        }

        self.out.flush()?;
        Ok(())
    }

    fn show_menu(&mut self) -> Result<()> {
        writeln!(self.out, "\n========================================")?;
        writeln!(self.out, " 🏥 SIMULADOR DE PROTOCOLO MANCHESTER 🏥")?;
        writeln!(self.out, "========================================")?;
        writeln!(self.out, "1 - Cadastrar novo paciente (iniciar triagem)")?;
        writeln!(self.out, "2 - Chamar próximo paciente (por prioridade)")?;
        writeln!(self.out, "3 - Mostrar status das filas")?;
        writeln!(self.out, "0 - Sair")?;
        Ok(())
    }

    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.out, "{}", prompt)?;
        self.out.flush()?;
        Ok(self.lines.next_line().await?)
    }

    async fn handle_register(&mut self) -> Result<Flow> {
        writeln!(self.out, "\n[Opção 1: Cadastrar Paciente]")?;
        let name = match self.read_line("Digite o nome completo do paciente: ").await? {
            Some(name) => name,
            None => return Ok(Flow::Exit),
        };

        let mut session = match self.engine.start_registration(&name) {
            Ok(session) => session,
            Err(e) => {
                writeln!(self.out, "\nERRO DE VALIDAÇÃO: {}", e)?;
                return Ok(Flow::Continue);
            }
        };

        let mut prompt = ConsolePrompt {
            lines: &mut self.lines,
            out: &mut self.out,
        };
        match session.run(&mut prompt).await {
            Ok(_) => {}
            Err(TriageError::Io(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                writeln!(self.out, "\nCadastro interrompido pelo usuário.")?;
                return Ok(Flow::Exit);
            }
            Err(e) => {
                writeln!(self.out, "\nERRO NO SISTEMA: {}", e)?;
                return Ok(Flow::Continue);
            }
        }

        match self.engine.complete_registration(session).await {
            Ok(registration) => {
                let classification = registration.classification;
                writeln!(self.out, "\n[CADASTRO CONCLUÍDO]")?;
                writeln!(self.out, "Paciente: {}", registration.patient_name)?;
                writeln!(
                    self.out,
                    "Classificação: {} {}",
                    classification.color(),
                    classification.description()
                )?;
            }
            Err(e) if e.is_validation() => writeln!(self.out, "\nERRO DE VALIDAÇÃO: {}", e)?,
            Err(e) => writeln!(self.out, "\nERRO NO SISTEMA: {}", e)?,
        }
        Ok(Flow::Continue)
    }

    async fn handle_call_next(&mut self) -> Result<Flow> {
        writeln!(self.out, "\n[Opção 2: Chamar Próximo Paciente]")?;
        match self.engine.call_next_patient().await {
            Ok(Some(patient)) => {
                writeln!(self.out, "\nPróximo paciente a ser atendido:")?;
                writeln!(self.out, "==> {} <==", patient.name().to_uppercase())?;
            }
            Ok(None) => {
                writeln!(self.out, "\nTodas as filas estão vazias. Nenhum paciente para chamar.")?;
            }
            Err(e) => writeln!(self.out, "\nERRO NO SISTEMA: {}", e)?,
        }
        Ok(Flow::Continue)
    }

    async fn handle_status(&mut self) -> Result<Flow> {
        writeln!(self.out, "\n[Opção 3: Status das Filas]")?;
        match self.engine.queue_status().await {
            Ok(status) => match self.settings.status_format {
                StatusFormat::Table => self.write_status_table(&status)?,
                StatusFormat::Json => writeln!(self.out, "{}", status.to_json()?)?,
            },
            Err(e) => writeln!(self.out, "\nERRO NO SISTEMA: {}", e)?,
        }
        Ok(Flow::Continue)
    }

    fn write_status_table(&mut self, status: &QueueStatus) -> Result<()> {
        writeln!(self.out, "{}", SEPARATOR)?;
        writeln!(self.out, " FILA              | PACIENTES")?;
        writeln!(self.out, "{}", SEPARATOR)?;
        for (classification, size) in status.entries() {
            writeln!(
                self.out,
                " {} {:<15} | {}",
                classification.color(),
                classification.name(),
                size
            )?;
        }
        writeln!(self.out, "{}", SEPARATOR)?;
        writeln!(self.out, " TOTAL DE PACIENTES: {}", status.total())?;
        Ok(())
    }
}

/// 从控制台逐题读取回答，无法识别的输入会重新提问
struct ConsolePrompt<'a, R, W> {
    lines: &'a mut Lines<R>,
    out: &'a mut W,
}

#[async_trait]
impl<'a, R, W> AnswerProvider for ConsolePrompt<'a, R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    async fn answer(&mut self, question: &str) -> triage_core::Result<bool> {
        loop {
            write!(self.out, "\n[PERGUNTA] {} (S/N): ", question)?;
            self.out.flush()?;

            let line = self.lines.next_line().await?.ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "input closed during triage")
            })?;

            match parse_answer(&line) {
                Some(answer) => return Ok(answer),
                None => writeln!(
                    self.out,
                    "ERRO: Resposta '{}' inválida. {}",
                    line.trim(),
                    "Por favor, digite 'S' para Sim ou 'N' para Não."
                )?,
            }
        }
    }
}
